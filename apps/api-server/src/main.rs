//! api-server: HTTP API for the Phonebook workspace.
//!
//! Exposes create/list/search/find/update/delete for contacts under `/api/v1`
//! and serves an OpenAPI document at `/swagger/doc.json`.
//! - Storage: SQLite (default, `sqlite` feature) or in-memory.
//! - CORS: permissive by default, or a single origin via CORS_ALLOW_ORIGIN.
//!
//! Run:
//! ```bash
//! # pretty logs (default); PORT optional
//! cargo run -p api-server
//!
//! # throwaway in-memory store with JSON logs
//! STORAGE_PROVIDER=memory LOG_FORMAT=json cargo run -p api-server
//! ```
//!
//! Configuration: See `config.rs` for all environment variables.
//!
#![recursion_limit = "256"]

mod config;
mod openapi;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::HeaderValue;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use domain::adapters::memory_repo::InMemoryContactRepo;
use domain::service::ContactService;
use domain::{
    Contact, ContactId, ContactPatch, ContactRepository, CoreError, ErrorKind, NewContact,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const API_BASE: &str = "/api/v1";

// Storage backend chosen at startup; sqlite is feature-gated.
enum AnyRepo {
    Memory(InMemoryContactRepo),
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite_adapter::SqliteContactRepo),
}

impl ContactRepository for AnyRepo {
    fn list(&self, phone_filter: Option<&str>) -> Result<Vec<Contact>, CoreError> {
        match self {
            AnyRepo::Memory(r) => r.list(phone_filter),
            #[cfg(feature = "sqlite")]
            AnyRepo::Sqlite(r) => r.list(phone_filter),
        }
    }

    fn get(&self, id: ContactId) -> Result<Option<Contact>, CoreError> {
        match self {
            AnyRepo::Memory(r) => r.get(id),
            #[cfg(feature = "sqlite")]
            AnyRepo::Sqlite(r) => r.get(id),
        }
    }

    fn create(&self, input: NewContact) -> Result<Contact, CoreError> {
        match self {
            AnyRepo::Memory(r) => r.create(input),
            #[cfg(feature = "sqlite")]
            AnyRepo::Sqlite(r) => r.create(input),
        }
    }

    fn update(&self, target: &Contact, patch: &ContactPatch) -> Result<Contact, CoreError> {
        match self {
            AnyRepo::Memory(r) => r.update(target, patch),
            #[cfg(feature = "sqlite")]
            AnyRepo::Sqlite(r) => r.update(target, patch),
        }
    }

    fn delete(&self, target: &Contact) -> Result<(), CoreError> {
        match self {
            AnyRepo::Memory(r) => r.delete(target),
            #[cfg(feature = "sqlite")]
            AnyRepo::Sqlite(r) => r.delete(target),
        }
    }
}

#[derive(Clone)]
struct AppState {
    contacts: Arc<ContactService<AnyRepo>>,
}

impl AppState {
    fn new(repo: AnyRepo) -> Self {
        Self {
            contacts: Arc::new(ContactService::new(repo)),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load and validate config first (fail fast on misconfiguration)
    let cfg = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&cfg);
    cfg.warn_if_volatile();

    // An unusable store at startup is fatal
    let repo = match build_repo(&cfg) {
        Ok(r) => r,
        Err(e) => {
            error!(err = %e, "failed to open contact store");
            std::process::exit(1);
        }
    };
    let state = AppState::new(repo);

    // Request ID header name
    let x_request_id = axum::http::HeaderName::from_static("x-request-id");

    let mut app = routes(state)
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid));

    // CORS - already validated in Config::from_env()
    let cors = if cfg.cors_allow_origin == HeaderValue::from_static("*") {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list([cfg.cors_allow_origin.clone()]))
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    };
    app = app.layer(cors);

    let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    info!(%addr, "api-server listening");
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(%addr, err = %e, "bind failed");
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        error!(err = %e, "server error");
        std::process::exit(1);
    }
}

fn init_tracing(cfg: &config::Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match cfg.log_format {
        config::LogFormat::Json => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(fmt::time::SystemTime)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
        config::LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
    }
}

fn build_repo(cfg: &config::Config) -> Result<AnyRepo, CoreError> {
    match cfg.storage_provider {
        #[cfg(feature = "sqlite")]
        config::StorageProvider::Sqlite => {
            let repo = sqlite_adapter::SqliteContactRepo::open(&cfg.db_path)?;
            info!(path = %cfg.db_path.display(), "using sqlite store");
            Ok(AnyRepo::Sqlite(repo))
        }
        #[cfg(not(feature = "sqlite"))]
        config::StorageProvider::Sqlite => Err(CoreError::Repository(
            "built without the `sqlite` feature; set STORAGE_PROVIDER=memory".into(),
        )),
        config::StorageProvider::Memory => Ok(AnyRepo::Memory(InMemoryContactRepo::new())),
    }
}

fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            &format!("{API_BASE}/contacts"),
            get(list_contacts).post(create_contact),
        )
        .route(
            &format!("{API_BASE}/contacts/:id"),
            get(find_contact).put(update_contact).delete(delete_contact),
        )
        .route("/swagger/doc.json", get(openapi_doc))
        .with_state(state)
}

/// Body accepted by create and update. Missing or null fields decode as `None`.
#[derive(Deserialize, Default)]
struct ContactBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    phone_number: Option<String>,
}

impl ContactBody {
    fn into_new_contact(self) -> NewContact {
        NewContact {
            name: self.name.unwrap_or_default(),
            phone_number: self.phone_number.unwrap_or_default(),
        }
    }

    fn into_patch(self) -> ContactPatch {
        ContactPatch {
            name: self.name,
            phone_number: self.phone_number,
        }
    }
}

#[derive(Serialize)]
struct ContactOut {
    id: i64,
    name: String,
    phone_number: String,
}

impl From<Contact> for ContactOut {
    fn from(c: Contact) -> Self {
        Self {
            id: c.id.get(),
            name: c.name,
            phone_number: c.phone_number,
        }
    }
}

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default)]
    q: Option<String>,
}

// Bodies that do not decode are treated as `{}`; validation then decides.
fn decode_body<T: DeserializeOwned + Default>(bytes: &[u8]) -> T {
    match serde_json::from_slice(bytes) {
        Ok(v) => v,
        Err(e) => {
            warn!(err = %e, "undecodable request body, treating as empty");
            T::default()
        }
    }
}

fn error_response(op: &'static str, err: CoreError) -> Response {
    match err.kind() {
        ErrorKind::Store => error!(op, err = %err, "store error"),
        _ => warn!(op, err = %err, "request rejected"),
    }
    let status = StatusCode::from_u16(http_common::status_for(&err))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(http_common::error_body(&err))).into_response()
}

async fn list_contacts(State(state): State<AppState>, Query(q): Query<ListQuery>) -> Response {
    let query = q.q.unwrap_or_default();
    match state.contacts.list(&query) {
        Ok(items) => {
            info!(q = %query, count = items.len(), "list ok");
            let out: Vec<ContactOut> = items.into_iter().map(ContactOut::from).collect();
            (StatusCode::OK, Json(out)).into_response()
        }
        Err(e) => error_response("list", e),
    }
}

async fn create_contact(State(state): State<AppState>, body: Bytes) -> Response {
    let input = decode_body::<ContactBody>(&body).into_new_contact();
    match state.contacts.create(input) {
        Ok(contact) => {
            info!(id = %contact.id, "create ok");
            (StatusCode::CREATED, Json(ContactOut::from(contact))).into_response()
        }
        Err(e) => error_response("create", e),
    }
}

async fn find_contact(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.contacts.find_by_id(&id) {
        Ok(contact) => (StatusCode::OK, Json(ContactOut::from(contact))).into_response(),
        Err(e) => error_response("find", e),
    }
}

async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let patch = decode_body::<ContactBody>(&body).into_patch();
    match state.contacts.update_by_id(&id, &patch) {
        Ok(contact) => {
            info!(id = %contact.id, "update ok");
            (StatusCode::OK, Json(ContactOut::from(contact))).into_response()
        }
        Err(e) => error_response("update", e),
    }
}

async fn delete_contact(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.contacts.delete_by_id(&id) {
        Ok(contact) => {
            info!(id = %contact.id, "delete ok");
            (StatusCode::OK, Json(ContactOut::from(contact))).into_response()
        }
        Err(e) => error_response("delete", e),
    }
}

async fn openapi_doc() -> impl IntoResponse {
    Json(openapi::document(API_BASE))
}

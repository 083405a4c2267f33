//! sqlite-adapter: SQLite implementation of the ContactRepository port.
//!
//! Purpose
//! - Provide a file-based store so the phonebook survives restarts without an
//!   external database server.
//! - Implements the `ContactRepository` trait from the `domain` crate.
//!
//! Notes
//! - Uses `rusqlite` with the `bundled` feature for portability.
//! - `id` is `AUTOINCREMENT` so identifiers of deleted rows are never handed out
//!   again.
//! - Name uniqueness is the table's `UNIQUE` constraint (BINARY collation, so
//!   case-sensitive); violations surface as `CoreError::AlreadyExists`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use domain::{Contact, ContactId, ContactPatch, ContactRepository, CoreError, NewContact};
use rusqlite::{params, Connection};

const SELECT_COLUMNS: &str = "SELECT id, name, phone_number FROM contacts";

/// SQLite-backed contact repository.
pub struct SqliteContactRepo {
    conn: Mutex<Connection>,
}

impl SqliteContactRepo {
    /// Open (or create) a SQLite database at the given path and ensure schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(map_sqerr)?;
        Self::with_connection(conn)
    }

    /// Open a database file, creating its parent directory first.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        if let Some(dir) = path.as_ref().parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)
                    .map_err(|e| CoreError::Repository(format!("create db dir: {e}")))?;
            }
        }
        Self::new(path)
    }

    /// Private in-memory database; gone when the repo is dropped.
    pub fn in_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(map_sqerr)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, CoreError> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.conn
            .lock()
            .map_err(|_| CoreError::Repository("mutex poisoned".into()))
    }
}

fn init_schema(conn: &Connection) -> Result<(), CoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            phone_number TEXT NOT NULL
        );
        "#,
    )
    .map_err(map_sqerr)
}

fn map_sqerr<E: std::fmt::Display>(e: E) -> CoreError {
    CoreError::Repository(format!("sqlite error: {e}"))
}

// Unique-constraint failures become AlreadyExists; everything else is a store error.
fn map_write_err(e: rusqlite::Error) -> CoreError {
    if let rusqlite::Error::SqliteFailure(err, _) = &e {
        if err.code == rusqlite::ErrorCode::ConstraintViolation {
            return CoreError::AlreadyExists;
        }
    }
    map_sqerr(e)
}

fn row_to_contact(row: &rusqlite::Row) -> Result<Contact, CoreError> {
    let id: i64 = row.get(0).map_err(map_sqerr)?;
    let name: String = row.get(1).map_err(map_sqerr)?;
    let phone_number: String = row.get(2).map_err(map_sqerr)?;
    let id = ContactId::new(id).map_err(|e| CoreError::Repository(format!("bad id in db: {e}")))?;
    Ok(Contact {
        id,
        name,
        phone_number,
    })
}

fn fetch_one(conn: &Connection, id: ContactId) -> Result<Option<Contact>, CoreError> {
    let mut stmt = conn
        .prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
        .map_err(map_sqerr)?;
    let mut rows = stmt.query(params![id.get()]).map_err(map_sqerr)?;
    match rows.next().map_err(map_sqerr)? {
        Some(row) => Ok(Some(row_to_contact(row)?)),
        None => Ok(None),
    }
}

impl ContactRepository for SqliteContactRepo {
    fn list(&self, phone_filter: Option<&str>) -> Result<Vec<Contact>, CoreError> {
        let conn = self.lock()?;
        let mut out = Vec::new();
        match phone_filter.filter(|q| !q.is_empty()) {
            Some(q) => {
                // instr() rather than LIKE: LIKE is case-insensitive and treats % and _ as wildcards
                let mut stmt = conn
                    .prepare(&format!(
                        "{SELECT_COLUMNS} WHERE instr(phone_number, ?1) > 0 ORDER BY name ASC"
                    ))
                    .map_err(map_sqerr)?;
                let mut rows = stmt.query(params![q]).map_err(map_sqerr)?;
                while let Some(row) = rows.next().map_err(map_sqerr)? {
                    out.push(row_to_contact(row)?);
                }
            }
            None => {
                let mut stmt = conn
                    .prepare(&format!("{SELECT_COLUMNS} ORDER BY name ASC"))
                    .map_err(map_sqerr)?;
                let mut rows = stmt.query([]).map_err(map_sqerr)?;
                while let Some(row) = rows.next().map_err(map_sqerr)? {
                    out.push(row_to_contact(row)?);
                }
            }
        }
        Ok(out)
    }

    fn get(&self, id: ContactId) -> Result<Option<Contact>, CoreError> {
        let conn = self.lock()?;
        fetch_one(&conn, id)
    }

    fn create(&self, input: NewContact) -> Result<Contact, CoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO contacts(name, phone_number) VALUES (?1, ?2)",
            params![input.name, input.phone_number],
        )
        .map_err(map_write_err)?;
        let id = ContactId::new(conn.last_insert_rowid())?;
        Ok(Contact {
            id,
            name: input.name,
            phone_number: input.phone_number,
        })
    }

    fn update(&self, target: &Contact, patch: &ContactPatch) -> Result<Contact, CoreError> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction().map_err(map_sqerr)?;
        let changed = tx
            .execute(
                "UPDATE contacts SET name = COALESCE(?1, name), phone_number = COALESCE(?2, phone_number) WHERE id = ?3",
                params![patch.name(), patch.phone_number(), target.id.get()],
            )
            .map_err(map_write_err)?;
        if changed == 0 {
            return Err(CoreError::NotFound);
        }
        let merged = fetch_one(&tx, target.id)?.ok_or(CoreError::NotFound)?;
        tx.commit().map_err(map_sqerr)?;
        Ok(merged)
    }

    fn delete(&self, target: &Contact) -> Result<(), CoreError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM contacts WHERE id = ?1", params![target.id.get()])
            .map_err(map_sqerr)?;
        Ok(())
    }
}

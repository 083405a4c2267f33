//! Shared HTTP utilities for the Phonebook workspace.
//!
//! Framework-agnostic JSON error bodies and the mapping from domain error
//! kinds to HTTP status codes.

use domain::{CoreError, ErrorKind};

// ============================================================================
// JSON Response Helpers (framework-agnostic)
// ============================================================================

/// Create a structured error JSON with a default message based on the code.
///
/// Returns: `{"error": {"code": "<code>", "message": "<default message>"}}`
pub fn json_err(code: &str) -> serde_json::Value {
    let message = match code {
        "not_found" => "record not found",
        "bad_request" => "bad request",
        "conflict" => "records with that name already exists",
        "error" | "internal" => "Internal server error",
        _ => code, // Fallback to code as message for unknown codes
    };
    serde_json::json!({"error": {"code": code, "message": message}})
}

/// Create a structured error JSON with a custom message.
///
/// Returns: `{"error": {"code": "<code>", "message": "<message>"}}`
pub fn json_error_with_message(code: &str, message: &str) -> serde_json::Value {
    serde_json::json!({"error": {"code": code, "message": message}})
}

// ============================================================================
// Domain Error Mapping
// ============================================================================

/// HTTP status code for a domain error.
pub fn status_for(err: &CoreError) -> u16 {
    match err.kind() {
        ErrorKind::Validation => 400,
        ErrorKind::Conflict => 409,
        ErrorKind::NotFound => 404,
        ErrorKind::Store => 500,
    }
}

/// JSON body for a domain error. Store failures never leak their details.
pub fn error_body(err: &CoreError) -> serde_json::Value {
    match err.kind() {
        ErrorKind::Validation => json_error_with_message("bad_request", &err.to_string()),
        ErrorKind::Conflict => json_err("conflict"),
        ErrorKind::NotFound => json_err("not_found"),
        ErrorKind::Store => json_err("internal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_err() {
        let err = json_err("not_found");
        assert_eq!(
            err,
            serde_json::json!({"error": {"code": "not_found", "message": "record not found"}})
        );

        // Unknown code falls back to code as message
        let err = json_err("custom_error");
        assert_eq!(
            err,
            serde_json::json!({"error": {"code": "custom_error", "message": "custom_error"}})
        );
    }

    #[test]
    fn test_json_error_with_message() {
        let err = json_error_with_message("bad_request", "Invalid input");
        assert_eq!(
            err,
            serde_json::json!({"error": {"code": "bad_request", "message": "Invalid input"}})
        );
    }

    #[test]
    fn test_status_for() {
        assert_eq!(status_for(&CoreError::EmptyName), 400);
        assert_eq!(status_for(&CoreError::InvalidId("x".into())), 400);
        assert_eq!(status_for(&CoreError::AlreadyExists), 409);
        assert_eq!(status_for(&CoreError::NotFound), 404);
        assert_eq!(status_for(&CoreError::Repository("disk".into())), 500);
    }

    #[test]
    fn test_error_body_hides_store_details() {
        let body = error_body(&CoreError::Repository("disk on fire".into()));
        assert_eq!(body["error"]["code"], "internal");
        assert!(!body.to_string().contains("disk on fire"));

        let body = error_body(&CoreError::EmptyPhoneNumber);
        assert_eq!(body["error"]["message"], "number cannot be empty");
    }
}

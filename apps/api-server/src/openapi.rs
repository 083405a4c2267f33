//! OpenAPI 3 description of the contacts API, served at `/swagger/doc.json`.

use serde_json::{json, Value};

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Error"}}}
    })
}

fn contact_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Contact"}}}
    })
}

fn id_param() -> Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "description": "Contact Id",
        "schema": {"type": "integer", "minimum": 1}
    })
}

fn contact_body() -> Value {
    json!({
        "required": true,
        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ContactInput"}}}
    })
}

/// Build the document. `base_path` is the mount point of the contacts routes.
pub fn document(base_path: &str) -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Phonebook API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "This is a phonebook server.",
            "license": {
                "name": "Apache 2.0",
                "url": "http://www.apache.org/licenses/LICENSE-2.0.html"
            }
        },
        "servers": [{"url": base_path}],
        "paths": {
            "/contacts": {
                "get": {
                    "tags": ["contacts"],
                    "summary": "Show list of contacts",
                    "description": "List contacts ordered by name, optionally filtered by phone number substring",
                    "parameters": [{
                        "name": "q",
                        "in": "query",
                        "required": false,
                        "description": "Phone number search",
                        "schema": {"type": "string"}
                    }],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": {"application/json": {"schema": {
                                "type": "array",
                                "items": {"$ref": "#/components/schemas/Contact"}
                            }}}
                        },
                        "500": error_response("Internal Server Error")
                    }
                },
                "post": {
                    "tags": ["contacts"],
                    "summary": "Create new contact",
                    "description": "Create new contact in database, fails if a record with the same name exists",
                    "requestBody": contact_body(),
                    "responses": {
                        "201": contact_response("Created"),
                        "400": error_response("Bad Request"),
                        "409": error_response("Conflict"),
                        "500": error_response("Internal Server Error")
                    }
                }
            },
            "/contacts/{id}": {
                "get": {
                    "tags": ["contacts"],
                    "summary": "Find a contact",
                    "parameters": [id_param()],
                    "responses": {
                        "200": contact_response("OK"),
                        "400": error_response("Bad Request"),
                        "404": error_response("Not Found"),
                        "500": error_response("Internal Server Error")
                    }
                },
                "put": {
                    "tags": ["contacts"],
                    "summary": "Update contact records",
                    "description": "Merge the non-empty fields of the body into the contact",
                    "parameters": [id_param()],
                    "requestBody": contact_body(),
                    "responses": {
                        "200": contact_response("OK"),
                        "400": error_response("Bad Request"),
                        "404": error_response("Not Found"),
                        "409": error_response("Conflict"),
                        "500": error_response("Internal Server Error")
                    }
                },
                "delete": {
                    "tags": ["contacts"],
                    "summary": "Delete contact records",
                    "description": "Delete the contact and return its last known values",
                    "parameters": [id_param()],
                    "responses": {
                        "200": contact_response("OK"),
                        "400": error_response("Bad Request"),
                        "404": error_response("Not Found"),
                        "500": error_response("Internal Server Error")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Contact": {
                    "type": "object",
                    "required": ["id", "name", "phone_number"],
                    "properties": {
                        "id": {"type": "integer"},
                        "name": {"type": "string"},
                        "phone_number": {"type": "string"}
                    }
                },
                "ContactInput": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "phone_number": {"type": "string"}
                    }
                },
                "Error": {
                    "type": "object",
                    "properties": {
                        "error": {
                            "type": "object",
                            "properties": {
                                "code": {"type": "string"},
                                "message": {"type": "string"}
                            }
                        }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_contact_operation() {
        let doc = document("/api/v1");
        assert_eq!(doc["servers"][0]["url"], "/api/v1");
        let paths = &doc["paths"];
        for method in ["get", "post"] {
            assert!(paths["/contacts"][method].is_object(), "{method}");
        }
        for method in ["get", "put", "delete"] {
            assert!(paths["/contacts/{id}"][method].is_object(), "{method}");
        }
        assert!(paths["/contacts"]["post"]["responses"]["409"].is_object());
    }
}

//! Domain library for the Phonebook service.
//!
//! This crate is dependency-free (inherits workspace metadata only) and holds
//! the contact types, the repository port, and error definitions. Keep adapters
//! and IO concerns out of this crate.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Surrogate identifier of a persisted contact. Always positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContactId(i64);

impl ContactId {
    pub fn new(raw: i64) -> Result<Self, CoreError> {
        if raw <= 0 {
            return Err(CoreError::InvalidId(raw.to_string()));
        }
        Ok(Self(raw))
    }

    /// Parse an identifier as it arrives from a path parameter.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let val: i64 = raw
            .parse()
            .map_err(|_| CoreError::InvalidId(raw.to_string()))?;
        Self::new(val)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl Display for ContactId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted phonebook entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub phone_number: String,
}

/// Input data for creating a new contact. Not validated until it reaches the
/// service.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub phone_number: String,
}

/// Partial update for a contact.
///
/// A field that is `None` or empty means "leave unchanged". There is no way to
/// clear a field through a patch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub phone_number: Option<String>,
}

impl ContactPatch {
    /// Name to write, if the patch carries a non-empty one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|s| !s.is_empty())
    }

    /// Phone number to write, if the patch carries a non-empty one.
    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref().filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.name().is_none() && self.phone_number().is_none()
    }

    /// Apply the patch on top of `base`, keeping the id.
    pub fn merge_into(&self, base: &Contact) -> Contact {
        Contact {
            id: base.id,
            name: self.name().unwrap_or(&base.name).to_string(),
            phone_number: self
                .phone_number()
                .unwrap_or(&base.phone_number)
                .to_string(),
        }
    }
}

/// Repository port for persisting and loading contacts.
///
/// Implementations own the uniqueness constraint on `name`; the service never
/// checks it itself.
pub trait ContactRepository: Send + Sync {
    /// All contacts ordered by name, optionally restricted to those whose
    /// phone number contains `phone_filter` (case-sensitive). An empty filter
    /// behaves like `None`.
    fn list(&self, phone_filter: Option<&str>) -> Result<Vec<Contact>, CoreError>;
    fn get(&self, id: ContactId) -> Result<Option<Contact>, CoreError>;
    /// Insert and assign a fresh id. Returns `AlreadyExists` on a duplicate name.
    fn create(&self, input: NewContact) -> Result<Contact, CoreError>;
    /// Merge `patch` into the stored record for `target.id` and return the
    /// stored result.
    fn update(&self, target: &Contact, patch: &ContactPatch) -> Result<Contact, CoreError>;
    /// Permanently remove `target`. Missing records are ignored.
    fn delete(&self, target: &Contact) -> Result<(), CoreError>;
}

/// Coarse classification of a `CoreError`, used by adapters to pick a status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Store,
}

/// Core domain errors (no external error crates to keep deps at zero).
#[derive(Debug)]
pub enum CoreError {
    EmptyName,
    EmptyPhoneNumber,
    InvalidId(String),
    AlreadyExists,
    NotFound,
    Repository(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::EmptyName | CoreError::EmptyPhoneNumber | CoreError::InvalidId(_) => {
                ErrorKind::Validation
            }
            CoreError::AlreadyExists => ErrorKind::Conflict,
            CoreError::NotFound => ErrorKind::NotFound,
            CoreError::Repository(_) => ErrorKind::Store,
        }
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::EmptyName => write!(f, "name cannot be empty"),
            CoreError::EmptyPhoneNumber => write!(f, "number cannot be empty"),
            CoreError::InvalidId(raw) => write!(f, "invalid contact id: {:?}", raw),
            CoreError::AlreadyExists => write!(f, "records with that name already exists"),
            CoreError::NotFound => write!(f, "record not found"),
            CoreError::Repository(msg) => write!(f, "repository error: {}", msg),
        }
    }
}

impl Error for CoreError {}

pub mod adapters;
pub mod service;
pub mod validate;

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Contact {
        Contact {
            id: ContactId::new(1).unwrap(),
            name: "Alice".into(),
            phone_number: "555-1111".into(),
        }
    }

    #[test]
    fn contact_id_parse_accepts_positive() {
        assert_eq!(ContactId::parse("42").unwrap().get(), 42);
    }

    #[test]
    fn contact_id_parse_rejects_garbage() {
        for raw in ["", "abc", " 7", "0", "-3", "1.5", "99999999999999999999"] {
            let err = ContactId::parse(raw).unwrap_err();
            assert!(matches!(err, CoreError::InvalidId(_)), "{raw}");
        }
    }

    #[test]
    fn patch_ignores_empty_fields() {
        let patch = ContactPatch {
            name: Some(String::new()),
            phone_number: Some("555-9999".into()),
        };
        let merged = patch.merge_into(&alice());
        assert_eq!(merged.name, "Alice");
        assert_eq!(merged.phone_number, "555-9999");
        assert!(ContactPatch::default().is_empty());
    }

    #[test]
    fn error_kinds_are_disjoint() {
        assert_eq!(CoreError::EmptyName.kind(), ErrorKind::Validation);
        assert_eq!(CoreError::InvalidId("x".into()).kind(), ErrorKind::Validation);
        assert_eq!(CoreError::AlreadyExists.kind(), ErrorKind::Conflict);
        assert_eq!(CoreError::NotFound.kind(), ErrorKind::NotFound);
        assert_eq!(CoreError::Repository("down".into()).kind(), ErrorKind::Store);
    }
}

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::{Contact, ContactId, ContactPatch, ContactRepository, CoreError, NewContact};

/// In-memory contact repository. A single mutex guards both the rows and the
/// id counter, so uniqueness checks and writes are atomic.
pub struct InMemoryContactRepo {
    inner: Mutex<State>,
}

#[derive(Default)]
struct State {
    rows: BTreeMap<ContactId, Contact>,
    last_id: i64,
}

impl State {
    fn name_taken(&self, name: &str, except: Option<ContactId>) -> bool {
        self.rows
            .values()
            .any(|c| c.name == name && Some(c.id) != except)
    }
}

impl InMemoryContactRepo {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(State::default()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>, CoreError> {
        self.inner
            .lock()
            .map_err(|_| CoreError::Repository("mutex poisoned".into()))
    }
}

impl Default for InMemoryContactRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactRepository for InMemoryContactRepo {
    fn list(&self, phone_filter: Option<&str>) -> Result<Vec<Contact>, CoreError> {
        let state = self.lock()?;
        let filter = phone_filter.filter(|q| !q.is_empty());
        let mut items: Vec<Contact> = state
            .rows
            .values()
            .filter(|c| filter.map_or(true, |q| c.phone_number.contains(q)))
            .cloned()
            .collect();
        // Byte-wise, same as SQLite's BINARY collation
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    fn get(&self, id: ContactId) -> Result<Option<Contact>, CoreError> {
        let state = self.lock()?;
        Ok(state.rows.get(&id).cloned())
    }

    fn create(&self, input: NewContact) -> Result<Contact, CoreError> {
        let mut state = self.lock()?;
        if state.name_taken(&input.name, None) {
            return Err(CoreError::AlreadyExists);
        }
        let id = ContactId::new(state.last_id + 1)?;
        state.last_id = id.get();
        let contact = Contact {
            id,
            name: input.name,
            phone_number: input.phone_number,
        };
        state.rows.insert(id, contact.clone());
        Ok(contact)
    }

    fn update(&self, target: &Contact, patch: &ContactPatch) -> Result<Contact, CoreError> {
        let mut state = self.lock()?;
        let current = state.rows.get(&target.id).ok_or(CoreError::NotFound)?;
        let merged = patch.merge_into(current);
        if state.name_taken(&merged.name, Some(merged.id)) {
            return Err(CoreError::AlreadyExists);
        }
        state.rows.insert(merged.id, merged.clone());
        Ok(merged)
    }

    fn delete(&self, target: &Contact) -> Result<(), CoreError> {
        let mut state = self.lock()?;
        state.rows.remove(&target.id);
        Ok(())
    }
}

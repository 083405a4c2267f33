use crate::validate::validate_new_contact;
use crate::{Contact, ContactId, ContactPatch, ContactRepository, CoreError, NewContact};

/// Application service orchestrating the contact operations.
///
/// Generic over the repository so the same rules apply to every storage
/// backend. It holds no state of its own: uniqueness and any locking are the
/// repository's business.
pub struct ContactService<R: ContactRepository> {
    repo: R,
}

impl<R: ContactRepository> ContactService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// List contacts by name. A non-empty `query` restricts the result to
    /// phone numbers containing it.
    pub fn list(&self, query: &str) -> Result<Vec<Contact>, CoreError> {
        if query.is_empty() {
            self.repo.list(None)
        } else {
            self.repo.list(Some(query))
        }
    }

    /// Create a new contact. Fails with `AlreadyExists` when the name is taken.
    pub fn create(&self, input: NewContact) -> Result<Contact, CoreError> {
        validate_new_contact(&input)?;
        self.repo.create(input)
    }

    pub fn find_by_id(&self, raw_id: &str) -> Result<Contact, CoreError> {
        let id = ContactId::parse(raw_id)?;
        self.fetch(id)
    }

    /// Merge `patch` into an existing contact. The patch is never applied to a
    /// missing record, and its fields are not re-validated.
    pub fn update_by_id(&self, raw_id: &str, patch: &ContactPatch) -> Result<Contact, CoreError> {
        let id = ContactId::parse(raw_id)?;
        let current = self.fetch(id)?;
        if patch.is_empty() {
            return Ok(current);
        }
        self.repo.update(&current, patch)
    }

    /// Delete a contact and hand back its last known values.
    pub fn delete_by_id(&self, raw_id: &str) -> Result<Contact, CoreError> {
        let id = ContactId::parse(raw_id)?;
        let current = self.fetch(id)?;
        self.repo.delete(&current)?;
        Ok(current)
    }

    fn fetch(&self, id: ContactId) -> Result<Contact, CoreError> {
        self.repo.get(id)?.ok_or(CoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_repo::InMemoryContactRepo;

    fn svc() -> ContactService<InMemoryContactRepo> {
        ContactService::new(InMemoryContactRepo::new())
    }

    fn new_contact(name: &str, phone: &str) -> NewContact {
        NewContact {
            name: name.into(),
            phone_number: phone.into(),
        }
    }

    fn phone_patch(phone: &str) -> ContactPatch {
        ContactPatch {
            name: None,
            phone_number: Some(phone.into()),
        }
    }

    #[test]
    fn full_lifecycle() {
        let svc = svc();

        let alice = svc.create(new_contact("Alice", "555-1111")).unwrap();
        assert_eq!(alice.id.get(), 1);

        let err = svc.create(new_contact("Alice", "555-2222")).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyExists));

        let all = svc.list("").unwrap();
        assert_eq!(all, vec![alice.clone()]);

        let updated = svc.update_by_id("1", &phone_patch("555-9999")).unwrap();
        assert_eq!(updated.id, alice.id);
        assert_eq!(updated.name, "Alice");
        assert_eq!(updated.phone_number, "555-9999");

        let removed = svc.delete_by_id("1").unwrap();
        assert_eq!(removed, updated);
        assert!(matches!(svc.find_by_id("1"), Err(CoreError::NotFound)));
    }

    #[test]
    fn create_validates_before_touching_store() {
        let svc = svc();
        assert!(matches!(
            svc.create(new_contact("", "555")),
            Err(CoreError::EmptyName)
        ));
        assert!(matches!(
            svc.create(new_contact("zupper", "")),
            Err(CoreError::EmptyPhoneNumber)
        ));
        assert!(svc.list("").unwrap().is_empty());
    }

    #[test]
    fn list_search_filters_by_phone_and_orders_by_name() {
        let svc = svc();
        svc.create(new_contact("Presscy", "987654321")).unwrap();
        svc.create(new_contact("Cypress", "123456789")).unwrap();
        svc.create(new_contact("Bob", "555-0000")).unwrap();

        let names = |v: Vec<Contact>| v.into_iter().map(|c| c.name).collect::<Vec<_>>();

        assert_eq!(names(svc.list("").unwrap()), ["Bob", "Cypress", "Presscy"]);
        assert_eq!(names(svc.list("4").unwrap()), ["Cypress", "Presscy"]);
        assert_eq!(names(svc.list("654").unwrap()), ["Presscy"]);
        assert_eq!(names(svc.list("555").unwrap()), ["Bob"]);
        assert!(svc.list("nope").unwrap().is_empty());
    }

    #[test]
    fn malformed_ids_are_validation_errors() {
        let svc = svc();
        for raw in ["abc", "0", "-1", ""] {
            assert!(matches!(svc.find_by_id(raw), Err(CoreError::InvalidId(_))));
            assert!(matches!(
                svc.update_by_id(raw, &phone_patch("1")),
                Err(CoreError::InvalidId(_))
            ));
            assert!(matches!(svc.delete_by_id(raw), Err(CoreError::InvalidId(_))));
        }
    }

    #[test]
    fn missing_ids_are_not_found_and_do_not_mutate() {
        let svc = svc();
        let bob = svc.create(new_contact("Bob", "555-0000")).unwrap();

        assert!(matches!(svc.find_by_id("999"), Err(CoreError::NotFound)));
        assert!(matches!(
            svc.update_by_id("999", &phone_patch("1")),
            Err(CoreError::NotFound)
        ));
        assert!(matches!(svc.delete_by_id("999"), Err(CoreError::NotFound)));

        assert_eq!(svc.list("").unwrap(), vec![bob]);
    }

    #[test]
    fn empty_patch_leaves_record_unchanged() {
        let svc = svc();
        let bob = svc.create(new_contact("Bob", "555-0000")).unwrap();
        let patch = ContactPatch {
            name: Some(String::new()),
            phone_number: None,
        };
        let same = svc.update_by_id("1", &patch).unwrap();
        assert_eq!(same, bob);
    }

    // Rejects every update so a skipped write is observable.
    struct ReadOnlyUpdates(InMemoryContactRepo);

    impl ContactRepository for ReadOnlyUpdates {
        fn list(&self, phone_filter: Option<&str>) -> Result<Vec<Contact>, CoreError> {
            self.0.list(phone_filter)
        }
        fn get(&self, id: ContactId) -> Result<Option<Contact>, CoreError> {
            self.0.get(id)
        }
        fn create(&self, input: NewContact) -> Result<Contact, CoreError> {
            self.0.create(input)
        }
        fn update(&self, _: &Contact, _: &ContactPatch) -> Result<Contact, CoreError> {
            Err(CoreError::Repository("update not expected".into()))
        }
        fn delete(&self, target: &Contact) -> Result<(), CoreError> {
            self.0.delete(target)
        }
    }

    #[test]
    fn empty_patch_skips_store_write() {
        let svc = ContactService::new(ReadOnlyUpdates(InMemoryContactRepo::new()));
        let bob = svc.create(new_contact("Bob", "555-0000")).unwrap();
        let patch = ContactPatch {
            name: Some(String::new()),
            phone_number: None,
        };
        assert_eq!(svc.update_by_id("1", &patch).unwrap(), bob);
        assert!(matches!(
            svc.update_by_id("1", &phone_patch("1")),
            Err(CoreError::Repository(_))
        ));
    }

    #[test]
    fn renaming_onto_existing_name_conflicts() {
        let svc = svc();
        svc.create(new_contact("Alice", "1")).unwrap();
        svc.create(new_contact("Bob", "2")).unwrap();
        let patch = ContactPatch {
            name: Some("Alice".into()),
            phone_number: Some("3".into()),
        };
        assert!(matches!(
            svc.update_by_id("2", &patch),
            Err(CoreError::AlreadyExists)
        ));
        let bob = svc.find_by_id("2").unwrap();
        assert_eq!(bob.name, "Bob");
        assert_eq!(bob.phone_number, "2");
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let svc = svc();
        svc.create(new_contact("Alice", "1")).unwrap();
        svc.delete_by_id("1").unwrap();
        let again = svc.create(new_contact("Alice", "1")).unwrap();
        assert_eq!(again.id.get(), 2);
    }
}

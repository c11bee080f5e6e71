//! User repository.

use ddf_core::{Email, User, UserId};

use super::{RepositoryError, Store};

/// Repository for user records.
pub struct UserRepository<'a> {
    store: &'a Store,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Get a user by email address.
    pub async fn get_by_email(&self, email: &Email) -> Option<User> {
        self.store
            .read()
            .await
            .users
            .into_iter()
            .find(|u| &u.email == email)
    }

    /// Get a user by id.
    pub async fn get_by_id(&self, id: &UserId) -> Option<User> {
        self.store
            .read()
            .await
            .users
            .into_iter()
            .find(|u| &u.id == id)
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    /// Returns `RepositoryError::Store` if the data file cannot be written.
    pub async fn create(&self, user: User) -> Result<User, RepositoryError> {
        self.store
            .mutate(|ds| {
                if ds.users.iter().any(|u| u.email == user.email) {
                    return Err(RepositoryError::Conflict("email already exists".to_owned()));
                }
                ds.users.push(user.clone());
                Ok(user)
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use ddf_core::Role;

    use super::*;

    fn user(email: &str) -> User {
        User {
            id: UserId::generate(),
            email: Email::parse(email).unwrap(),
            password_hash: "$argon2id$stub".to_string(),
            name: "Asha".to_string(),
            role: Role::Customer,
            phone: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("db.json"));
        let repo = UserRepository::new(&store);

        let created = repo.create(user("asha@example.com")).await.unwrap();

        let by_email = repo
            .get_by_email(&Email::parse("ASHA@example.com").unwrap())
            .await
            .unwrap();
        assert_eq!(by_email.id, created.id);
        assert!(repo.get_by_id(&created.id).await.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("db.json"));
        let repo = UserRepository::new(&store);

        repo.create(user("asha@example.com")).await.unwrap();
        let err = repo.create(user("Asha@Example.com")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.read().await.users.len(), 1);
    }

    #[tokio::test]
    async fn test_mixed_case_email_in_file_still_matches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let mut seeded = serde_json::to_value(user("priya@example.com")).unwrap();
        seeded["email"] = "Priya@Example.com".into();
        std::fs::write(&path, serde_json::json!({ "users": [seeded] }).to_string()).unwrap();

        let store = Store::new(&path);
        let repo = UserRepository::new(&store);

        assert!(
            repo.get_by_email(&Email::parse("priya@example.com").unwrap())
                .await
                .is_some()
        );
        let err = repo.create(user("priya@example.com")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.read().await.users.len(), 1);
    }
}

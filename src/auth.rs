use thiserror::Error;

use crate::user_store::{StoreError, UserRecord, UserStore};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("All fields are required.")]
    MissingField,
    #[error("This email is already registered.")]
    DuplicateEmail,
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Could not save the account: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct AuthService {
    store: UserStore,
}

impl AuthService {
    pub fn new(store: UserStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &UserStore {
        &self.store
    }

    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<UserRecord, AuthError> {
        let (name, email, password) = (name.trim(), email.trim(), password.trim());
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingField);
        }

        let mut users = self.store.load();
        if users.iter().any(|u| u.email == email) {
            return Err(AuthError::DuplicateEmail);
        }

        let record = UserRecord {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        users.push(record.clone());
        self.store.save(&users)?;

        tracing::info!(email = %record.email, "registered new user");
        Ok(record)
    }

    /// Checks credentials against the store. The first exact match on both fields wins.
    pub fn login(&self, email: &str, password: &str) -> Result<UserRecord, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingField);
        }

        match self
            .store
            .load()
            .into_iter()
            .find(|u| u.email == email && u.password == password)
        {
            Some(user) => {
                tracing::info!(email = %user.email, "login succeeded");
                Ok(user)
            }
            None => {
                tracing::info!("login rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> AuthService {
        AuthService::new(UserStore::new(dir.path().join("usuarios.json")))
    }

    #[test]
    fn register_then_login() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir);
        auth.register("Ana", "ana@x.com", "pw1").unwrap();

        let user = auth.login("ana@x.com", "pw1").unwrap();
        assert_eq!(user.name, "Ana");

        assert!(matches!(
            auth.login("ana@x.com", "wrong"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("bob@x.com", "pw1"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn register_trims_inputs() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir);
        let record = auth.register("  Ana ", " ana@x.com ", " pw1 ").unwrap();
        assert_eq!(record.email, "ana@x.com");
        assert!(auth.login("ana@x.com", "pw1").is_ok());
    }

    #[test]
    fn duplicate_email_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir);
        auth.register("Ana", "ana@x.com", "pw1").unwrap();
        let before = fs::read(auth.store().path()).unwrap();

        let err = auth.register("Other", "ana@x.com", "pw2").unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
        assert_eq!(fs::read(auth.store().path()).unwrap(), before);
    }

    #[test]
    fn email_match_is_case_sensitive() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir);
        auth.register("Ana", "ana@x.com", "pw1").unwrap();
        auth.register("Ana Upper", "ANA@x.com", "pw1").unwrap();
        assert_eq!(auth.store().load().len(), 2);
    }

    #[test]
    fn missing_field_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir);

        for (name, email, password) in [
            ("", "a@x.com", "pw"),
            ("Ana", "   ", "pw"),
            ("Ana", "a@x.com", "\t"),
        ] {
            let err = auth.register(name, email, password).unwrap_err();
            assert!(matches!(err, AuthError::MissingField));
        }
        assert!(!auth.store().path().exists());
    }

    #[test]
    fn first_match_wins_on_duplicate_records() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir);
        let dup = |name: &str| UserRecord {
            name: name.to_string(),
            email: "dup@x.com".to_string(),
            password: "pw".to_string(),
        };
        auth.store().save(&[dup("First"), dup("Second")]).unwrap();

        assert_eq!(auth.login("dup@x.com", "pw").unwrap().name, "First");
    }

    #[test]
    fn login_with_empty_fields_is_rejected() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir);
        assert!(matches!(auth.login("", "pw"), Err(AuthError::MissingField)));
        assert!(matches!(auth.login("a@x.com", ""), Err(AuthError::MissingField)));
    }

    #[test]
    fn write_failure_surfaces_as_store_error() {
        let dir = TempDir::new().unwrap();
        let auth = AuthService::new(UserStore::new(dir.path().join("missing").join("u.json")));
        let err = auth.register("Ana", "ana@x.com", "pw1").unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));
    }
}

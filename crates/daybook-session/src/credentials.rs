use daybook_db::{Database, StoreError, StoreResult};
use daybook_types::models::User;
use tracing::warn;

use crate::password;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("username or email already taken")]
    Taken,
    #[error("could not hash password: {0}")]
    Hash(String),
    #[error(transparent)]
    Store(StoreError),
}

/// Create an account. Only the argon2 hash of the password is stored; the
/// store's uniqueness constraints decide conflicts, so two racing registers
/// cannot both win.
pub fn register(
    db: &Database,
    username: &str,
    email: &str,
    password: &str,
) -> Result<i64, CredentialError> {
    let hash = password::hash_password(password).map_err(|e| CredentialError::Hash(e.to_string()))?;

    match db.create_user(username, email, &hash) {
        Ok(user_id) => Ok(user_id),
        Err(StoreError::Conflict) => Err(CredentialError::Taken),
        Err(e) => Err(CredentialError::Store(e)),
    }
}

/// Check a username/password pair. Unknown usernames and wrong passwords both
/// come back as None so callers cannot tell the two apart.
pub fn authenticate(db: &Database, username: &str, password: &str) -> StoreResult<Option<User>> {
    let Some(row) = db.get_user_by_username(username)? else {
        return Ok(None);
    };

    match password::verify_password(password, &row.password_hash) {
        Ok(true) => Ok(Some(row.into_model())),
        Ok(false) => Ok(None),
        Err(e) => {
            warn!("Unreadable password hash for user {}: {}", row.id, e);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn register_then_authenticate() {
        let db = test_db();
        let id = register(&db, "alice", "alice@example.com", "password123").unwrap();

        let user = authenticate(&db, "alice", "password123").unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
    }

    #[test]
    fn register_rejects_taken_username_and_email() {
        let db = test_db();
        register(&db, "alice", "alice@example.com", "password123").unwrap();

        let err = register(&db, "alice", "fresh@example.com", "password123").unwrap_err();
        assert!(matches!(err, CredentialError::Taken));

        let err = register(&db, "bob", "alice@example.com", "password123").unwrap_err();
        assert!(matches!(err, CredentialError::Taken));
    }

    #[test]
    fn authenticate_is_opaque_about_the_reason() {
        let db = test_db();
        register(&db, "alice", "alice@example.com", "password123").unwrap();

        assert!(authenticate(&db, "alice", "wrong-password").unwrap().is_none());
        assert!(authenticate(&db, "nobody", "password123").unwrap().is_none());
    }

    #[test]
    fn stored_hash_is_not_the_password() {
        let db = test_db();
        register(&db, "alice", "alice@example.com", "password123").unwrap();

        let row = db.get_user_by_username("alice").unwrap().unwrap();
        assert_ne!(row.password_hash, "password123");
        assert!(row.password_hash.starts_with("$argon2"));
    }
}

//! Port abstraction for user persistence adapters and their errors.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{User, UserDraft, UserId};

/// Persistence errors raised by user repository adapters.
///
/// Handlers do not distinguish the variants when reporting to clients; both
/// collapse to a generic server failure. The split exists so adapters and
/// logs retain the underlying cause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserPersistenceError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution, including unique-email
    /// constraint violations.
    #[error("user repository query failed: {message}")]
    Query { message: String },
}

impl UserPersistenceError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Persistence Gateway for users.
///
/// All handler state lives behind this port. Every operation is attempted
/// exactly once; retries are the caller's concern and none are performed.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch all users ordered by id.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch a user by identifier; absent rows are `Ok(None)`, not errors.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Insert a new user, returning it with its store-assigned id.
    ///
    /// A duplicate email trips the store's unique constraint and surfaces as
    /// [`UserPersistenceError::Query`].
    async fn insert(&self, draft: &UserDraft) -> Result<User, UserPersistenceError>;

    /// Persist new field values for an existing user, returning the stored
    /// record. The id is never changed.
    async fn update(&self, user: &User) -> Result<User, UserPersistenceError>;

    /// Delete a user by identifier. Deleting an already-absent row is not an
    /// error, mirroring SQL `DELETE` semantics.
    async fn delete_by_id(&self, id: UserId) -> Result<(), UserPersistenceError>;
}

#[derive(Debug, Default)]
struct InMemoryState {
    next_id: i32,
    users: BTreeMap<i32, User>,
}

/// Deterministic in-process gateway mirroring the store contract.
///
/// Assigns sequential ids starting at 1 and enforces email uniqueness the
/// way the database constraint would. Used by tests and as the fallback
/// adapter when no database is configured.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    state: Mutex<InMemoryState>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, UserPersistenceError> {
        self.state
            .lock()
            .map_err(|_| UserPersistenceError::connection("repository state poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.lock()?;
        Ok(state.users.values().cloned().collect())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock()?;
        Ok(state.users.get(&id.as_i32()).cloned())
    }

    async fn insert(&self, draft: &UserDraft) -> Result<User, UserPersistenceError> {
        let mut state = self.lock()?;
        if state
            .users
            .values()
            .any(|existing| existing.email() == draft.email())
        {
            return Err(UserPersistenceError::query(
                "duplicate key value violates unique constraint \"users_email_key\"",
            ));
        }

        state.next_id += 1;
        let id = UserId::new(state.next_id);
        let user = User::new(id, draft.name().clone(), draft.email().clone());
        state.users.insert(id.as_i32(), user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, UserPersistenceError> {
        let mut state = self.lock()?;
        if state
            .users
            .values()
            .any(|existing| existing.id() != user.id() && existing.email() == user.email())
        {
            return Err(UserPersistenceError::query(
                "duplicate key value violates unique constraint \"users_email_key\"",
            ));
        }
        if !state.users.contains_key(&user.id().as_i32()) {
            // The row vanished between the handler's read and this write;
            // report it the way a zero-row UPDATE .. RETURNING would.
            return Err(UserPersistenceError::query("record to update not found"));
        }

        state.users.insert(user.id().as_i32(), user.clone());
        Ok(user.clone())
    }

    async fn delete_by_id(&self, id: UserId) -> Result<(), UserPersistenceError> {
        let mut state = self.lock()?;
        state.users.remove(&id.as_i32());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the in-memory gateway contract.
    use super::*;
    use rstest::rstest;

    fn draft(name: &str, email: &str) -> UserDraft {
        UserDraft::try_from_parts(name, email).expect("draft")
    }

    #[rstest]
    #[actix_web::test]
    async fn insert_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();

        let first = repo.insert(&draft("Ada", "ada@example.com")).await.expect("insert");
        let second = repo
            .insert(&draft("Grace", "grace@example.com"))
            .await
            .expect("insert");

        assert_eq!(first.id().as_i32(), 1);
        assert_eq!(second.id().as_i32(), 2);
    }

    #[rstest]
    #[actix_web::test]
    async fn insert_rejects_duplicate_email() {
        let repo = InMemoryUserRepository::new();
        repo.insert(&draft("Ada", "ada@example.com")).await.expect("insert");

        let err = repo
            .insert(&draft("Imposter", "ada@example.com"))
            .await
            .expect_err("duplicate email must fail");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }

    #[rstest]
    #[actix_web::test]
    async fn update_of_missing_row_fails() {
        let repo = InMemoryUserRepository::new();
        let phantom = User::new(
            UserId::new(99),
            crate::domain::UserName::new("Ghost").expect("name"),
            crate::domain::EmailAddress::new("ghost@example.com").expect("email"),
        );

        let err = repo.update(&phantom).await.expect_err("missing row");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }

    #[rstest]
    #[actix_web::test]
    async fn delete_of_missing_row_is_not_an_error() {
        let repo = InMemoryUserRepository::new();
        repo.delete_by_id(UserId::new(42)).await.expect("delete");
    }

    #[rstest]
    #[actix_web::test]
    async fn list_returns_users_ordered_by_id() {
        let repo = InMemoryUserRepository::new();
        repo.insert(&draft("Ada", "ada@example.com")).await.expect("insert");
        repo.insert(&draft("Grace", "grace@example.com")).await.expect("insert");

        let users = repo.list().await.expect("list");
        let ids: Vec<i32> = users.iter().map(|u| u.id().as_i32()).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}

//! Diesel-backed `UserRepository` adapter.
//!
//! A thin translation layer between Diesel rows and domain types. No
//! business logic lives here; uniqueness of emails is the database's job
//! and surfaces as a query error when violated.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, User, UserDraft, UserId, UserName};

use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// PostgreSQL implementation of the user Persistence Gateway.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository backed by the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserPersistenceError::connection(message)
        }
    }
}

fn map_query_error(error: diesel::result::Error) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(kind, info) = &error {
        debug!(?kind, message = info.message(), "diesel operation failed");
    }

    match error {
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::connection("database connection error")
        }
        // Unique violations land here too: the handler layer reports all
        // write failures the same way.
        other => UserPersistenceError::query(other.to_string()),
    }
}

fn into_domain(row: UserRow) -> Result<User, UserPersistenceError> {
    // The NOT NULL columns make blank values impossible in practice; a
    // failure here means the row predates the boundary validation.
    let name = UserName::new(row.name)
        .map_err(|err| UserPersistenceError::query(format!("corrupt user row: {err}")))?;
    let email = EmailAddress::new(row.email)
        .map_err(|err| UserPersistenceError::query(format!("corrupt user row: {err}")))?;
    Ok(User::new(UserId::new(row.id), name, email))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order(users::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        rows.into_iter().map(into_domain).collect()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.as_i32())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;

        row.map(into_domain).transpose()
    }

    async fn insert(&self, draft: &UserDraft) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: UserRow = diesel::insert_into(users::table)
            .values(NewUserRow {
                name: draft.name().as_str(),
                email: draft.email().as_str(),
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_query_error)?;

        into_domain(row)
    }

    async fn update(&self, user: &User) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Zero matched rows means the record vanished after the handler's
        // read; Diesel reports that as `NotFound`, mapped to a query error.
        let row: UserRow = diesel::update(users::table.find(user.id().as_i32()))
            .set(UserChangeset {
                name: user.name().as_str(),
                email: user.email().as_str(),
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_query_error)?;

        into_domain(row)
    }

    async fn delete_by_id(&self, id: UserId) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(users::table.find(id.as_i32()))
            .execute(&mut conn)
            .await
            .map_err(map_query_error)?;

        Ok(())
    }
}

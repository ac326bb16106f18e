//! Users API handlers.
//!
//! ```text
//! GET    /api/v1/users
//! GET    /api/v1/users/{id}
//! POST   /api/v1/users        {"name":"Ada","email":"ada@example.com"}
//! PUT    /api/v1/users/{id}   {"name":"Ada","email":"ada@example.com"}
//! DELETE /api/v1/users/{id}
//! ```
//!
//! Each handler is stateless: it parses input, makes a single pass through
//! the Persistence Gateway, and renders the outcome. Nothing is retried.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::ports::{UserPersistenceError, UserRepository as _};
use crate::domain::{Error, ErrorBody, User, UserDraft, UserId, UserValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Acknowledgement message returned by a successful delete.
pub const DELETED_MESSAGE: &str = "User deleted";

/// Request body for `POST /api/v1/users` and `PUT /api/v1/users/{id}`.
///
/// Example JSON:
/// `{"name":"Ada Lovelace","email":"ada@example.com"}`
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UserPayload {
    /// Display name, required and non-empty.
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    /// Contact address, required and unique across users.
    #[schema(example = "ada@example.com")]
    pub email: String,
}

impl TryFrom<UserPayload> for UserDraft {
    type Error = UserValidationError;

    fn try_from(value: UserPayload) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.name, &value.email)
    }
}

fn map_validation_error(err: UserValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

fn map_persistence_error(err: UserPersistenceError) -> Error {
    // Constraint violations and transport failures collapse to the same
    // client-facing outcome; keep the cause in the logs.
    error!(error = %err, "user persistence operation failed");
    Error::internal(err.to_string())
}

fn user_not_found() -> Error {
    Error::not_found("User not found")
}

/// Parse the `{id}` path segment.
///
/// Invalid and unknown ids are indistinguishable to clients: a non-integer
/// id reads as zero rows from the gateway's perspective, so both surface as
/// not-found.
fn parse_user_id(segment: &str) -> ApiResult<UserId> {
    UserId::parse(segment).ok_or_else(user_not_found)
}

/// List all users.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "All users, ordered by id", body = [User]),
        (status = 500, description = "Persistence failure", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<User>>> {
    let users = state.users.list().await.map_err(map_persistence_error)?;
    Ok(web::Json(users))
}

/// Fetch a single user by id.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = i32, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "No user with this id", body = ErrorBody),
        (status = 500, description = "Persistence failure", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    let user = state
        .users
        .find_by_id(id)
        .await
        .map_err(map_persistence_error)?
        .ok_or_else(user_not_found)?;
    Ok(web::Json(user))
}

/// Create a user.
///
/// Uniqueness of the email is left to the store's constraint; a violation is
/// reported as a generic server failure rather than a dedicated conflict.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = UserPayload,
    responses(
        (status = 201, description = "Created user with its assigned id", body = User),
        (status = 400, description = "Malformed or incomplete body", body = ErrorBody),
        (status = 500, description = "Persistence failure, including duplicate email", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<UserPayload>,
) -> ApiResult<HttpResponse> {
    let draft = UserDraft::try_from(payload.into_inner()).map_err(map_validation_error)?;
    let created = state
        .users
        .insert(&draft)
        .await
        .map_err(map_persistence_error)?;
    Ok(HttpResponse::Created().json(created))
}

/// Update a user's name and email in place.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = i32, Path, description = "User identifier")),
    request_body = UserPayload,
    responses(
        (status = 200, description = "Updated user, id unchanged", body = User),
        (status = 400, description = "Malformed or incomplete body", body = ErrorBody),
        (status = 404, description = "No user with this id", body = ErrorBody),
        (status = 500, description = "Persistence failure", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;

    // Lookup precedes body parsing: an unknown id wins over a malformed
    // body. The read-then-write pair is not transactional; a concurrent
    // delete between the two steps is an accepted race.
    let existing = state
        .users
        .find_by_id(id)
        .await
        .map_err(map_persistence_error)?
        .ok_or_else(user_not_found)?;

    let payload: UserPayload = serde_json::from_slice(&body)
        .map_err(|err| Error::invalid_request(format!("invalid request body: {err}")))?;
    let draft = UserDraft::try_from(payload).map_err(map_validation_error)?;

    let updated = state
        .users
        .update(&existing.with_fields(draft))
        .await
        .map_err(map_persistence_error)?;
    Ok(web::Json(updated))
}

/// Delete a user permanently.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = i32, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Deletion acknowledgement", body = ErrorBody),
        (status = 404, description = "No user with this id", body = ErrorBody),
        (status = 500, description = "Persistence failure", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ErrorBody>> {
    let id = parse_user_id(&path)?;

    state
        .users
        .find_by_id(id)
        .await
        .map_err(map_persistence_error)?
        .ok_or_else(user_not_found)?;

    state
        .users
        .delete_by_id(id)
        .await
        .map_err(map_persistence_error)?;
    Ok(web::Json(ErrorBody {
        message: DELETED_MESSAGE.to_owned(),
    }))
}

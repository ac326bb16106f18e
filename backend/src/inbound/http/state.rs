//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the domain port and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::UserRepository;

/// Dependency bundle for HTTP handlers.
///
/// The repository is the single injected Persistence Gateway instance with
/// process-scoped lifetime; handlers never reach for ambient globals.
#[derive(Clone)]
pub struct HttpState {
    /// Persistence Gateway for users.
    pub users: Arc<dyn UserRepository>,
}

impl HttpState {
    /// Construct state around a user repository.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use backend::domain::ports::InMemoryUserRepository;
    /// use backend::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(Arc::new(InMemoryUserRepository::new()));
    /// let _users = state.users.clone();
    /// ```
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

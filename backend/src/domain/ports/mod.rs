//! Domain ports and supporting types for the hexagonal boundary.

mod user_repository;

pub use user_repository::{InMemoryUserRepository, UserPersistenceError, UserRepository};

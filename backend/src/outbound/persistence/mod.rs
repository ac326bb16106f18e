//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementation of the user Persistence Gateway backed by
//! PostgreSQL via the Diesel ORM with async support through `diesel-async`
//! and `bb8` connection pooling.
//!
//! The adapter stays thin: row structs (`models.rs`) and the table
//! definition (`schema.rs`) are internal details, and every database error
//! is mapped to the domain persistence error type.

mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

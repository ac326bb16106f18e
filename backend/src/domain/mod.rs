//! Domain data models and ports.
//!
//! Purpose: define strongly typed entities used by the HTTP and persistence
//! layers, the transport-agnostic error type, and the Persistence Gateway
//! port that all handler state flows through. Keep types immutable and
//! document invariants and serialisation contracts in each type's Rustdoc.

pub mod error;
pub mod ports;
pub mod user;

pub use self::error::{Error, ErrorBody, ErrorCode};
pub use self::user::{EmailAddress, User, UserDraft, UserId, UserName, UserValidationError};

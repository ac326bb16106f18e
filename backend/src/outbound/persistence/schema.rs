//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation. Regenerate with `diesel print-schema` after a migration
//! changes the schema.

diesel::table! {
    /// Registered users.
    ///
    /// `id` is a SERIAL primary key assigned on insert; `email` carries a
    /// UNIQUE constraint enforced by the database, not by handlers.
    users (id) {
        /// Surrogate primary key.
        id -> Int4,
        /// Display name; non-empty by boundary validation.
        name -> Varchar,
        /// Unique contact address.
        email -> Varchar,
    }
}

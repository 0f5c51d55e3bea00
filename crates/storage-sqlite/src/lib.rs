//! SQLite storage implementation for the PromoCode Factory partner service.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `promocode-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for partners and their limits
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies exist.
//! The `core` crate is database-agnostic and works with traits.
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```
//!
//! All writes go through a single writer actor ([`WriteHandle`]) so every
//! repository write is one immediate transaction on one connection.

pub mod db;
pub mod errors;
pub mod partners;
pub mod schema;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from promocode-core for convenience
pub use promocode_core::errors::{DatabaseError, Error, Result};

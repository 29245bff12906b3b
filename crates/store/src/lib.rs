//! Token storage backends for persisting the access/refresh token pair.
//!
//! Provides an in-memory store for testing and a SQLite-backed store for
//! durable installations.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryTokenStore;
pub use sqlite::SqliteTokenStore;

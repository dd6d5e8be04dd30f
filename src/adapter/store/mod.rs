//! Event store adapters.
//!
//! - [`MemoryEventStore`] - process-local, used when no database is set
//! - [`SqliteEventStore`] - Diesel over SQLite with embedded migrations

mod memory;
pub mod sqlite;

pub use memory::MemoryEventStore;
pub use sqlite::SqliteEventStore;

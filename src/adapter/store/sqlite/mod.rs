//! SQLite persistence for corridor events.

pub mod connection;
mod model;
mod schema;
mod store;

pub use connection::{create_pool, run_migrations, DbPool, MEMORY_URL};
pub use store::SqliteEventStore;

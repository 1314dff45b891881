//! Data layer module
//!
//! Handles all data persistence:
//! - Store traits consumed by the handlers
//! - In-memory store (volatile)
//! - SQLite database operations

mod database;
mod memory;
mod models;
mod store;

pub use database::Database;
pub use memory::MemoryStore;
pub use models::*;
pub use store::{AcceptListStore, ActivityStore};

#[cfg(test)]
pub use store::{MockAcceptListStore, MockActivityStore};

#[cfg(test)]
mod database_test;

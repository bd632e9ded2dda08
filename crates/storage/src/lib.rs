//! Storage layer for quietfeed
//!
//! The durable store is a key-value surface scoped to the feed origin:
//! one key per apply mode, each holding a JSON array of post ids. SQLite
//! backs the production store; an in-memory map backs tests and
//! ephemeral sessions.

mod cache;
mod error;
mod kv;
mod migrations;
mod sqlite;

pub use cache::{DecisionCache, COLLAPSED_IDS_KEY, REMOVED_IDS_KEY};
pub use error::{Result, StoreError};
pub use kv::{KvStore, MemoryKv};
pub use sqlite::SqliteKv;

//! SQLite persistence: schema, row mapping, and store implementations.

pub mod schema;
pub mod stores;

pub use schema::{AuditRow, LogoRow, RecordRow, SnapshotRow, SCHEMA_SQL};
pub use stores::SqliteStore;

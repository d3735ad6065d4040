//! Per-user memory storage for memdesk.
//!
//! A [`MemoryStore`] persists short text facts scoped by [`UserId`] and answers
//! similarity searches over them. Two stores ship here: a JSONL file store for
//! local use and tests, and an HTTP client for a hosted memory service.

pub mod error;
pub mod file;
pub mod http;
pub mod model;
pub mod policy;
pub mod search;
pub mod store;

/// Memory error type.
pub use error::MemoryError;
/// File-backed store.
pub use file::FileMemoryStore;
/// Remote store client.
pub use http::{HttpMemoryStore, HttpMemoryStoreOptions};
/// Record and identity model.
pub use model::{MemoryHit, MemoryMetadata, MemoryRecord, MemoryRole, NewMemory, UserId};
/// Capture policy applied before persistence.
pub use policy::MemoryCapturePolicy;
/// Search options.
pub use search::SearchOptions;
/// Store interface.
pub use store::MemoryStore;

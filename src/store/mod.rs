//! Store Client Module
//!
//! This module defines the interface the shell uses to talk to a key-value
//! store, plus two implementations of it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │    Session      │  (commands module)
//! └────────┬────────┘
//!          │ StoreClient
//!          ▼
//! ┌─────────────────┐      ┌─────────────────┐
//! │   HttpClient    │  or  │  MemoryStore    │
//! │ (reqwest, JSON) │      │ (in-process)    │
//! └─────────────────┘      └─────────────────┘
//! ```
//!
//! The store is organised in *instances* (named namespaces, like a selected
//! database). Every key operation runs against the currently selected
//! instance; the client owns that selection.
//!
//! ## Modules
//!
//! - `http`: talks JSON over HTTP to a remote store
//! - `memory`: keeps everything in process, used by tests and benchmarks

pub mod http;
pub mod memory;

use std::collections::BTreeMap;
use thiserror::Error;

pub use http::HttpClient;
pub use memory::MemoryStore;

/// A string-keyed hash as stored under a single key.
pub type Hash = BTreeMap<String, String>;

/// Errors reported by a store client.
///
/// The command layer never looks inside these; it only displays them.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A key operation was attempted before `SELECT`
    #[error("no instance selected")]
    NoInstanceSelected,

    #[error("instance '{0}' not found")]
    InstanceNotFound(String),

    #[error("instance '{0}' already exists")]
    InstanceExists(String),

    #[error("key '{0}' not found")]
    KeyNotFound(String),

    /// The key holds a different kind of value than the operation expects
    #[error("key '{key}' holds a {actual}, expected {expected}")]
    WrongType {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("index {index} out of range for '{key}'")]
    IndexOutOfRange { key: String, index: i64 },

    #[error("field '{field}' not found in '{key}'")]
    FieldNotFound { key: String, field: String },

    /// The configured store address cannot be used as a base URL
    #[error("invalid store address '{0}'")]
    InvalidAddress(String),

    /// Network failure talking to the store
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with a non-success status
    #[error("store returned {status}: {message}")]
    Server { status: u16, message: String },

    /// The store answered with a body we could not understand
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Operations a key-value store must offer to the shell.
///
/// Indices are 0-based. A `ttl` of zero (or less) means "no expiry".
#[allow(async_fn_in_trait)]
pub trait StoreClient {
    /// Name of the selected instance, or `""` when none is selected.
    fn current_instance_name(&self) -> &str;

    async fn list_instances(&self) -> StoreResult<Vec<String>>;
    async fn create_instance(&self, name: &str) -> StoreResult<()>;
    async fn select_instance(&mut self, name: &str) -> StoreResult<()>;
    /// Removes an instance. Destroying the selected instance clears the selection.
    async fn destroy(&mut self, name: &str) -> StoreResult<()>;

    async fn keys(&self) -> StoreResult<Vec<String>>;

    async fn set(&self, name: &str, value: &str, ttl: i64) -> StoreResult<()>;
    async fn get(&self, name: &str) -> StoreResult<String>;
    async fn del(&self, name: &str) -> StoreResult<()>;

    async fn set_ttl(&self, name: &str, seconds: i64) -> StoreResult<()>;
    async fn del_ttl(&self, name: &str) -> StoreResult<()>;

    async fn set_array(&self, name: &str, elements: &[String], ttl: i64) -> StoreResult<()>;
    async fn get_array(&self, name: &str) -> StoreResult<Vec<String>>;
    async fn get_array_element(&self, name: &str, index: i64) -> StoreResult<String>;
    async fn add_array_element(&self, name: &str, value: &str) -> StoreResult<()>;
    async fn set_array_element(&self, name: &str, index: i64, value: &str) -> StoreResult<()>;
    async fn del_array_element(&self, name: &str, index: i64) -> StoreResult<()>;

    async fn set_hash(&self, name: &str, hash: &Hash, ttl: i64) -> StoreResult<()>;
    async fn get_hash(&self, name: &str) -> StoreResult<Hash>;
    async fn get_hash_element(&self, name: &str, key: &str) -> StoreResult<String>;
    async fn set_hash_element(&self, name: &str, key: &str, value: &str) -> StoreResult<()>;
    async fn del_hash_element(&self, name: &str, key: &str) -> StoreResult<()>;
}

//! # kvshell - An Interactive Shell for a Key-Value Store
//!
//! kvshell is a line-oriented client for a remote key-value store that keeps
//! strings, arrays and hashes in named instances. It reads commands such as
//! `SET name "value" 60` or `ARR/EL/GET list 1`, runs them against the store
//! and prints the result.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                              kvshell                                │
//! │                                                                     │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐              │
//! │  │    REPL     │───>│  Tokenizer  │───>│   Session   │              │
//! │  │ (stdin/out) │    │             │    │  dispatch   │              │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘              │
//! │                                               │                     │
//! │                     ┌─────────────┐           │                     │
//! │                     │  Registry   │<──────────┤                     │
//! │                     │  Decoders   │<──────────┤                     │
//! │                     └─────────────┘           ▼                     │
//! │                                    ┌──────────────────────┐         │
//! │                                    │     StoreClient      │         │
//! │                                    │ HttpClient | Memory  │         │
//! │                                    └──────────────────────┘         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use kvshell::commands::Session;
//! use kvshell::store::MemoryStore;
//!
//! # tokio_test::block_on(async {
//! let mut session = Session::with_builtins(MemoryStore::with_instance("local"));
//!
//! session.run_to_text(r#"SET greeting "Hello World!""#).await.unwrap();
//! assert_eq!(session.run_to_text("GET greeting").await.unwrap(), "Hello World!");
//! # });
//! ```
//!
//! ## Supported Commands
//!
//! ### Shell
//! - `HELP [keyword]`, `ECHO "text"`, `EXIT`
//!
//! ### Instances
//! - `CREATE name`, `LIST`, `SELECT name`, `DESTROY name`
//!
//! ### Keys
//! - `KEYS`, `SET name "value" [ttl]`, `GET name`, `DEL name`
//! - `TTL/SET name seconds`, `TTL/DEL name`
//!
//! ### Arrays
//! - `ARR/SET name ["a","b"] [ttl]`, `ARR/GET name`
//! - `ARR/EL/GET name index`, `ARR/EL/ADD name "value"`
//! - `ARR/EL/SET name index "value"`, `ARR/EL/DEL name index`
//!
//! ### Hashes
//! - `HASH/SET name {"k":"v"} [ttl]`, `HASH/GET name`
//! - `HASH/EL/GET name key`, `HASH/EL/SET name key "value"`, `HASH/EL/DEL name key`
//!
//! ## Module Overview
//!
//! - [`protocol`]: line tokenizer, `Invocation` and `Reply`
//! - [`commands`]: registry, argument decoders and the command session
//! - [`store`]: the `StoreClient` trait with HTTP and in-memory backends
//! - [`repl`]: the interactive loop
//! - [`config`]: command-line flags

pub mod commands;
pub mod config;
pub mod protocol;
pub mod repl;
pub mod store;

// Re-export commonly used types for convenience
pub use commands::{CommandError, Registry, Session};
pub use config::{Config, DEFAULT_HTTP_ADDR};
pub use protocol::{tokenize, Invocation, Reply};
pub use repl::{ReplHandler, ReplStats};
pub use store::{HttpClient, MemoryStore, StoreClient, StoreError};

/// Version of kvshell
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

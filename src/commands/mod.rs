//! Command Handler Module
//!
//! This module implements the command processing layer of the shell.
//! It receives a raw input line, resolves the keyword in the registry,
//! decodes the arguments and runs the command against the store client.
//!
//! ## Architecture
//!
//! ```text
//! Input line
//!       │
//!       ▼
//! ┌─────────────────┐
//! │   Tokenizer     │  (protocol module)
//! └────────┬────────┘
//!          │ Invocation
//!          ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │    Session      │────>│    Registry     │
//! │                 │     └─────────────────┘
//! │  - Dispatch     │
//! │  - Validate     │     ┌─────────────────┐
//! │  - Execute      │────>│    Decoders     │
//! └────────┬────────┘     └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  StoreClient    │  (store module)
//! └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `decode`: typed argument decoders
//! - `registry`: keyword to command descriptor mapping
//! - `handler`: the session, the dispatcher and every command

pub mod decode;
pub mod handler;
pub mod registry;

// Re-export the main command types
pub use decode::DecodeError;
pub use handler::{builtin_commands, CommandError, Session};
pub use registry::{CommandDescriptor, Handler, Registry};

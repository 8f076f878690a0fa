//! REPL Module
//!
//! The interactive front of the shell: print a prompt, read a line, hand it
//! to the [`Session`](crate::commands::Session), print what comes back.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   line   ┌─────────────────┐  Reply   ┌──────────┐
//! │  stdin   │─────────>│   ReplHandler   │─────────>│  stdout  │
//! └──────────┘          │                 │          └──────────┘
//!                       │  Session::run   │
//!                       └────────┬────────┘
//!                                │
//!                                ▼
//!                       ┌─────────────────┐
//!                       │   StoreClient   │
//!                       └─────────────────┘
//! ```
//!
//! The handler is generic over its input ([`LineSource`]) and output streams,
//! so tests drive it with byte slices and `Vec<u8>` instead of a terminal.
//! The terminal itself is read through [`BlockingLines`], which keeps the
//! loop cancellable while it waits for the user.
//!
//! ## Example
//!
//! ```no_run
//! use kvshell::commands::Session;
//! use kvshell::repl::{BlockingLines, ReplHandler};
//! use kvshell::store::MemoryStore;
//! use tokio::io::stdout;
//!
//! # async fn demo() -> Result<(), kvshell::repl::ReplError> {
//! let session = Session::with_builtins(MemoryStore::with_instance("local"));
//! let mut repl = ReplHandler::new(session, BlockingLines::stdin()?, stdout());
//! repl.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod handler;
pub mod input;

pub use handler::{
    ReplError, ReplHandler, ReplOutcome, ReplStats, FAREWELL, GREETING, HELP_INFORMATION,
};
pub use input::{BlockingLines, LineSource};

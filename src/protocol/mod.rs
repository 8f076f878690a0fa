//! Line Protocol
//!
//! The shell speaks a simple line-oriented grammar:
//!
//! ```text
//! KEYWORD [arg1] [arg2] [arg3] [arg4]
//! ```
//!
//! Keywords are matched case-insensitively against the registry (which
//! stores them upper-case). Strings may be double-quoted, arrays and hashes
//! are JSON literals.
//!
//! ## Modules
//!
//! - `tokenizer`: splits a line into tokens
//! - `types`: defines `Invocation` (a parsed line) and `Reply`
//!
//! ## Example
//!
//! ```
//! use kvshell::protocol::Invocation;
//!
//! let inv = Invocation::parse(r#"set name "Ariz" 60"#).unwrap();
//! assert_eq!(inv.keyword(), "SET");
//! assert_eq!(inv.arg(2), Some(r#""Ariz""#));
//! ```

pub mod tokenizer;
pub mod types;

// Re-export commonly used types for convenience
pub use tokenizer::tokenize;
pub use types::{Invocation, Reply};

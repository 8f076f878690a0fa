//! Shell Data Types
//!
//! This module defines what flows through one turn of the shell:
//!
//! - [`Invocation`]: a tokenized input line, built once per line and dropped
//!   after its handler returns
//! - [`Reply`]: what a handler hands back to the loop

use super::tokenizer::tokenize;
use std::fmt;

/// One parsed line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// The line exactly as typed
    raw_line: String,
    /// Tokens, keyword first, as the user typed them
    tokens: Vec<String>,
    /// The keyword, upper-cased for registry lookup
    keyword: String,
}

impl Invocation {
    /// Tokenizes a line. Returns `None` for a blank line.
    pub fn parse(raw_line: &str) -> Option<Self> {
        let tokens = tokenize(raw_line);
        let keyword = tokens.first()?.to_uppercase();
        Some(Self {
            raw_line: raw_line.to_string(),
            tokens,
            keyword,
        })
    }

    pub fn raw_line(&self) -> &str {
        &self.raw_line
    }

    /// All tokens; index 0 is the keyword as typed.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Token at `index`, counting the keyword as 0.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }
}

/// The outcome of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Text to print
    Text(String),
    /// Nothing to print (blank input line)
    Nothing,
    /// The user asked to leave the shell
    Exit,
}

impl Reply {
    /// The reply of every mutating command.
    pub fn ok() -> Self {
        Reply::Text("OK".to_string())
    }

    pub fn text(s: impl Into<String>) -> Self {
        Reply::Text(s.into())
    }

    /// Renders items as `1) a`, `2) b`, ... one per line, without a
    /// trailing newline.
    ///
    /// # Example
    ///
    /// ```
    /// use kvshell::protocol::Reply;
    ///
    /// let reply = Reply::numbered(&["a".to_string(), "b".to_string()]);
    /// assert_eq!(reply, Reply::text("1) a\n2) b"));
    /// ```
    pub fn numbered(items: &[String]) -> Self {
        let mut out = String::new();
        for (i, item) in items.iter().enumerate() {
            out.push_str(&format!("{}) {}\n", i + 1, item));
        }
        if out.ends_with('\n') {
            out.pop();
        }
        Reply::Text(out)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Text(s) => write!(f, "{}", s),
            Reply::Nothing | Reply::Exit => Ok(()),
        }
    }
}

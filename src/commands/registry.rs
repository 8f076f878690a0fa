//! Command Registry
//!
//! Maps a keyword (`SET`, `ARR/EL/GET`, ...) to a [`CommandDescriptor`]:
//! a title, a help description and the [`Handler`] that runs it.
//!
//! The registry is filled once at startup and only read afterwards. Keywords
//! are stored exactly as registered; the built-in table uses upper case and
//! the dispatcher upper-cases what the user typed before looking it up.

use std::collections::BTreeMap;

/// Identifies the session routine that executes a command.
///
/// Several keywords may share a handler; `Session::dispatch` maps each
/// variant to its implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    // Shell
    Help,
    Echo,
    Exit,

    // Instances
    Create,
    List,
    Select,
    Destroy,

    // Scalars and keys
    Keys,
    Set,
    Get,
    Del,
    TtlSet,
    TtlDel,

    // Arrays
    ArrSet,
    ArrGet,
    ArrElGet,
    ArrElAdd,
    ArrElSet,
    ArrElDel,

    // Hashes
    HashSet,
    HashGet,
    HashElGet,
    HashElSet,
    HashElDel,
}

/// Everything the shell knows about one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    /// One-line summary shown in the HELP listing
    pub title: String,
    /// Usage text shown by `HELP <keyword>`
    pub description: String,
    pub handler: Handler,
}

impl CommandDescriptor {
    pub fn new(title: impl Into<String>, description: impl Into<String>, handler: Handler) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            handler,
        }
    }
}

/// Keyword to descriptor mapping.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    commands: BTreeMap<String, CommandDescriptor>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `descriptor` under `keyword`.
    ///
    /// A later registration for the same keyword replaces the earlier one;
    /// the replaced descriptor is returned.
    pub fn register(
        &mut self,
        keyword: impl Into<String>,
        descriptor: CommandDescriptor,
    ) -> Option<CommandDescriptor> {
        self.commands.insert(keyword.into(), descriptor)
    }

    /// Looks up a keyword (exact match).
    pub fn lookup(&self, keyword: &str) -> Option<&CommandDescriptor> {
        self.commands.get(keyword)
    }

    /// Iterates over all commands. Callers must not depend on the order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandDescriptor)> {
        self.commands.iter().map(|(k, d)| (k.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        let get = CommandDescriptor::new("Get value", "Example: GET name", Handler::Get);
        assert!(registry.register("GET", get.clone()).is_none());

        assert_eq!(registry.lookup("GET"), Some(&get));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = Registry::new();
        let first = CommandDescriptor::new("First", "", Handler::Get);
        let second = CommandDescriptor::new("Second", "", Handler::Del);

        registry.register("X", first.clone());
        assert_eq!(registry.register("X", second.clone()), Some(first));

        assert_eq!(registry.lookup("X"), Some(&second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_is_exact() {
        let mut registry = Registry::new();
        registry.register("SET", CommandDescriptor::new("Set value", "", Handler::Set));

        assert!(registry.lookup("set").is_none());
        assert!(registry.lookup("NOPE").is_none());
    }

    #[test]
    fn test_iter_lists_every_command() {
        let mut registry = Registry::new();
        registry.register("B", CommandDescriptor::new("b", "", Handler::Get));
        registry.register("A", CommandDescriptor::new("a", "", Handler::Set));

        let mut keywords: Vec<&str> = registry.iter().map(|(k, _)| k).collect();
        keywords.sort();
        assert_eq!(keywords, vec!["A", "B"]);
    }
}

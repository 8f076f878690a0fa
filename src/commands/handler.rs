//! Command Handler Module
//!
//! This module implements every shell command. A [`Session`] owns the
//! command registry and the store client; it tokenizes a line, looks the
//! keyword up and runs the bound handler.
//!
//! ## Supported Commands
//!
//! ### Shell
//! - `HELP [keyword]` - List commands or describe one
//! - `ECHO "text"` - Print a string
//! - `EXIT` - Leave the shell
//!
//! ### Instances
//! - `CREATE name` / `SELECT name` / `DESTROY name`
//! - `LIST` - Show all instances
//!
//! ### Scalars and keys
//! - `SET name "value" [ttl]` / `GET name` / `DEL name`
//! - `KEYS` - Show all keys of the selected instance
//! - `TTL/SET name seconds` / `TTL/DEL name`
//!
//! ### Arrays
//! - `ARR/SET name ["a","b"] [ttl]` / `ARR/GET name`
//! - `ARR/EL/GET name index` / `ARR/EL/ADD name "value"`
//! - `ARR/EL/SET name index "value"` / `ARR/EL/DEL name index`
//!
//! ### Hashes
//! - `HASH/SET name {"k":"v"} [ttl]` / `HASH/GET name`
//! - `HASH/EL/GET name key` / `HASH/EL/SET name key "value"` / `HASH/EL/DEL name key`
//!
//! ## Handler contract
//!
//! Every handler checks the token count first (the keyword counts as one
//! token), then decodes its arguments in order, then makes exactly one
//! store call. The first failure is returned unchanged.

use super::decode::{self, DecodeError};
use super::registry::{CommandDescriptor, Handler, Registry};
use crate::protocol::{Invocation, Reply};
use crate::store::{StoreClient, StoreError};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Errors a command can fail with.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Fewer tokens than the command needs
    #[error("Not enough arguments")]
    NotEnoughArguments,

    /// The keyword is not registered
    #[error("Command does not exist")]
    CommandNotExist,

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// An `EXIT` reached a caller that has no way to stop the shell
    #[error("Something really went wrong: cannot exit from here")]
    CannotExit,
}

/// The built-in command table.
pub fn builtin_commands() -> Registry {
    let table = [
        (
            "HELP",
            "Function show information about other functions",
            "Example: HELP <FUNCTION_NAME>",
            Handler::Help,
        ),
        ("ECHO", "Prints string", "Example: ECHO \"Hello World!\"", Handler::Echo),
        ("EXIT", "Exit from the program", "", Handler::Exit),
        ("CREATE", "Create an instance", "Example: CREATE dbname", Handler::Create),
        ("LIST", "Show list of instances", "Example: LIST", Handler::List),
        ("SELECT", "Select an instance", "Example: SELECT instance_name", Handler::Select),
        ("DESTROY", "Remove an instance", "Example: DESTROY instance_name", Handler::Destroy),
        ("KEYS", "Show all keys", "Example: KEYS", Handler::Keys),
        ("SET", "Set value", "Example: SET name \"value\" ttl", Handler::Set),
        ("GET", "Get value", "Example: GET name", Handler::Get),
        ("DEL", "Delete value", "Example: DEL name", Handler::Del),
        ("TTL/SET", "Set time to live", "Example: TTL/SET mayfly 86400", Handler::TtlSet),
        ("TTL/DEL", "Remove time to live", "Example: TTL/DEL mayfly", Handler::TtlDel),
        ("ARR/SET", "Set array", "Example: ARR/SET name [\"a\",\"b\"] ttl", Handler::ArrSet),
        ("ARR/GET", "Get array", "Example: ARR/GET name", Handler::ArrGet),
        (
            "ARR/EL/GET",
            "Returns the element associated with index",
            "Example: ARR/EL/GET name index",
            Handler::ArrElGet,
        ),
        (
            "ARR/EL/ADD",
            "Add the element to an array",
            "Example: ARR/EL/ADD name \"value\"",
            Handler::ArrElAdd,
        ),
        (
            "ARR/EL/SET",
            "Set the element of an array",
            "Example: ARR/EL/SET name index \"value\"",
            Handler::ArrElSet,
        ),
        (
            "ARR/EL/DEL",
            "Delete the element of an array",
            "Example: ARR/EL/DEL name index",
            Handler::ArrElDel,
        ),
        (
            "HASH/SET",
            "Set a hash",
            "Example: HASH/SET name {\"key\":\"value\"} ttl",
            Handler::HashSet,
        ),
        ("HASH/GET", "Get a hash", "Example: HASH/GET name", Handler::HashGet),
        (
            "HASH/EL/GET",
            "Get the element of a hash",
            "Example: HASH/EL/GET name key",
            Handler::HashElGet,
        ),
        (
            "HASH/EL/SET",
            "Set the element of a hash",
            "Example: HASH/EL/SET name key \"value\"",
            Handler::HashElSet,
        ),
        (
            "HASH/EL/DEL",
            "Delete the element of a hash",
            "Example: HASH/EL/DEL name key",
            Handler::HashElDel,
        ),
    ];

    let mut registry = Registry::new();
    for (keyword, title, description, handler) in table {
        registry.register(keyword, CommandDescriptor::new(title, description, handler));
    }
    registry
}

/// Checks the token count and hands back the tokens.
fn require(inv: &Invocation, min: usize) -> Result<&[String], CommandError> {
    let args = inv.tokens();
    if args.len() < min {
        return Err(CommandError::NotEnoughArguments);
    }
    Ok(args)
}

/// Reads an optional TTL. A malformed value is ignored and means "no TTL".
fn optional_ttl(args: &[String], index: usize) -> i64 {
    match args.get(index) {
        Some(token) => decode::integer(token).unwrap_or_else(|e| {
            debug!(token = %token, error = %e, "Ignoring malformed TTL");
            0
        }),
        None => 0,
    }
}

/// One shell session: the command table plus the store it talks to.
pub struct Session<C> {
    registry: Registry,
    client: C,
}

impl<C: StoreClient> Session<C> {
    pub fn new(registry: Registry, client: C) -> Self {
        Self { registry, client }
    }

    /// Creates a session with the built-in command table.
    pub fn with_builtins(client: C) -> Self {
        Self::new(builtin_commands(), client)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// The prompt for the next line: `<instance>> `.
    pub fn prompt(&self) -> String {
        format!("{}> ", self.client.current_instance_name())
    }

    /// Runs one line of input.
    ///
    /// A blank line is a no-op and yields [`Reply::Nothing`].
    pub async fn run(&mut self, line: &str) -> Result<Reply, CommandError> {
        match Invocation::parse(line) {
            Some(inv) => self.execute(&inv).await,
            None => Ok(Reply::Nothing),
        }
    }

    /// Runs one line where only text output makes sense (scripts, tests).
    ///
    /// `EXIT` cannot be honoured here and fails with [`CommandError::CannotExit`].
    pub async fn run_to_text(&mut self, line: &str) -> Result<String, CommandError> {
        match self.run(line).await? {
            Reply::Text(text) => Ok(text),
            Reply::Nothing => Ok(String::new()),
            Reply::Exit => Err(CommandError::CannotExit),
        }
    }

    /// Looks up the invocation's keyword and runs its handler.
    pub async fn execute(&mut self, inv: &Invocation) -> Result<Reply, CommandError> {
        let handler = match self.registry.lookup(inv.keyword()) {
            Some(command) => command.handler,
            None => {
                debug!(keyword = inv.keyword(), "Unknown command");
                return Err(CommandError::CommandNotExist);
            }
        };

        debug!(keyword = inv.keyword(), args = inv.tokens().len() - 1, "Executing command");
        self.dispatch(handler, inv).await
    }

    /// Dispatches a command to its handler.
    async fn dispatch(
        &mut self,
        handler: Handler,
        inv: &Invocation,
    ) -> Result<Reply, CommandError> {
        match handler {
            // Shell
            Handler::Help => self.cmd_help(inv),
            Handler::Echo => self.cmd_echo(inv),
            Handler::Exit => Ok(Reply::Exit),

            // Instances
            Handler::Create => self.cmd_create(inv).await,
            Handler::List => self.cmd_list().await,
            Handler::Select => self.cmd_select(inv).await,
            Handler::Destroy => self.cmd_destroy(inv).await,

            // Scalars and keys
            Handler::Keys => self.cmd_keys().await,
            Handler::Set => self.cmd_set(inv).await,
            Handler::Get => self.cmd_get(inv).await,
            Handler::Del => self.cmd_del(inv).await,
            Handler::TtlSet => self.cmd_ttl_set(inv).await,
            Handler::TtlDel => self.cmd_ttl_del(inv).await,

            // Arrays
            Handler::ArrSet => self.cmd_arr_set(inv).await,
            Handler::ArrGet => self.cmd_arr_get(inv).await,
            Handler::ArrElGet => self.cmd_arr_el_get(inv).await,
            Handler::ArrElAdd => self.cmd_arr_el_add(inv).await,
            Handler::ArrElSet => self.cmd_arr_el_set(inv).await,
            Handler::ArrElDel => self.cmd_arr_el_del(inv).await,

            // Hashes
            Handler::HashSet => self.cmd_hash_set(inv).await,
            Handler::HashGet => self.cmd_hash_get(inv).await,
            Handler::HashElGet => self.cmd_hash_el_get(inv).await,
            Handler::HashElSet => self.cmd_hash_el_set(inv).await,
            Handler::HashElDel => self.cmd_hash_el_del(inv).await,
        }
    }

    // ========================================================================
    // Shell Commands
    // ========================================================================

    /// HELP [keyword]
    fn cmd_help(&self, inv: &Invocation) -> Result<Reply, CommandError> {
        if let Some(topic) = inv.arg(1) {
            let command = self
                .registry
                .lookup(&topic.to_uppercase())
                .ok_or(CommandError::CommandNotExist)?;
            return Ok(Reply::text(format!("{}\n{}", command.title, command.description)));
        }

        let mut out = String::new();
        if let Some(own) = self.registry.lookup(inv.keyword()) {
            out.push_str(&format!("{}\n{}\n\n", own.title, own.description));
        }
        out.push_str("List of commands:");
        for (keyword, command) in self.registry.iter() {
            out.push_str(&format!("\n{} - {}", keyword, command.title));
        }
        Ok(Reply::Text(out))
    }

    /// ECHO "text"
    fn cmd_echo(&self, inv: &Invocation) -> Result<Reply, CommandError> {
        let args = require(inv, 2)?;
        Ok(Reply::text(decode::string(&args[1])))
    }

    // ========================================================================
    // Instance Commands
    // ========================================================================

    /// CREATE name
    async fn cmd_create(&mut self, inv: &Invocation) -> Result<Reply, CommandError> {
        let args = require(inv, 2)?;
        let name = decode::name(&args[1])?;

        self.client.create_instance(name).await?;
        Ok(Reply::ok())
    }

    /// LIST
    async fn cmd_list(&mut self) -> Result<Reply, CommandError> {
        let instances = self.client.list_instances().await?;
        Ok(Reply::numbered(&instances))
    }

    /// SELECT name
    async fn cmd_select(&mut self, inv: &Invocation) -> Result<Reply, CommandError> {
        let args = require(inv, 2)?;
        let name = decode::name(&args[1])?;

        self.client.select_instance(name).await?;
        Ok(Reply::ok())
    }

    /// DESTROY name
    async fn cmd_destroy(&mut self, inv: &Invocation) -> Result<Reply, CommandError> {
        let args = require(inv, 2)?;
        let name = decode::name(&args[1])?;

        self.client.destroy(name).await?;
        Ok(Reply::ok())
    }

    // ========================================================================
    // Scalar and Key Commands
    // ========================================================================

    /// KEYS
    async fn cmd_keys(&mut self) -> Result<Reply, CommandError> {
        let keys = self.client.keys().await?;
        Ok(Reply::numbered(&keys))
    }

    /// SET name "value" [ttl]
    async fn cmd_set(&mut self, inv: &Invocation) -> Result<Reply, CommandError> {
        let args = require(inv, 3)?;
        let name = decode::name(&args[1])?;
        let value = decode::string(&args[2]);
        let ttl = optional_ttl(args, 3);

        self.client.set(name, value, ttl).await?;
        Ok(Reply::ok())
    }

    /// GET name
    async fn cmd_get(&mut self, inv: &Invocation) -> Result<Reply, CommandError> {
        let args = require(inv, 2)?;
        let name = decode::name(&args[1])?;

        Ok(Reply::Text(self.client.get(name).await?))
    }

    /// DEL name
    async fn cmd_del(&mut self, inv: &Invocation) -> Result<Reply, CommandError> {
        let args = require(inv, 2)?;
        let name = decode::name(&args[1])?;

        self.client.del(name).await?;
        Ok(Reply::ok())
    }

    /// TTL/SET name seconds
    async fn cmd_ttl_set(&mut self, inv: &Invocation) -> Result<Reply, CommandError> {
        let args = require(inv, 3)?;
        let name = decode::name(&args[1])?;
        let seconds = decode::integer(&args[2])?;

        self.client.set_ttl(name, seconds).await?;
        Ok(Reply::ok())
    }

    /// TTL/DEL name
    async fn cmd_ttl_del(&mut self, inv: &Invocation) -> Result<Reply, CommandError> {
        let args = require(inv, 2)?;
        let name = decode::name(&args[1])?;

        self.client.del_ttl(name).await?;
        Ok(Reply::ok())
    }

    // ========================================================================
    // Array Commands
    // ========================================================================

    /// ARR/SET name ["a","b"] [ttl]
    async fn cmd_arr_set(&mut self, inv: &Invocation) -> Result<Reply, CommandError> {
        let args = require(inv, 3)?;
        let name = decode::name(&args[1])?;
        let elements = decode::sequence(&args[2])?;
        let ttl = optional_ttl(args, 3);

        self.client.set_array(name, &elements, ttl).await?;
        Ok(Reply::ok())
    }

    /// ARR/GET name
    async fn cmd_arr_get(&mut self, inv: &Invocation) -> Result<Reply, CommandError> {
        let args = require(inv, 2)?;
        let name = decode::name(&args[1])?;

        let elements = self.client.get_array(name).await?;
        Ok(Reply::Text(Value::from(elements).to_string()))
    }

    /// ARR/EL/GET name index
    async fn cmd_arr_el_get(&mut self, inv: &Invocation) -> Result<Reply, CommandError> {
        let args = require(inv, 3)?;
        let name = decode::name(&args[1])?;
        let index = decode::integer(&args[2])?;

        Ok(Reply::Text(self.client.get_array_element(name, index).await?))
    }

    /// ARR/EL/ADD name "value"
    async fn cmd_arr_el_add(&mut self, inv: &Invocation) -> Result<Reply, CommandError> {
        let args = require(inv, 3)?;
        let name = decode::name(&args[1])?;
        let value = decode::string(&args[2]);

        self.client.add_array_element(name, value).await?;
        Ok(Reply::ok())
    }

    /// ARR/EL/SET name index "value"
    async fn cmd_arr_el_set(&mut self, inv: &Invocation) -> Result<Reply, CommandError> {
        let args = require(inv, 4)?;
        let name = decode::name(&args[1])?;
        let index = decode::integer(&args[2])?;
        let value = decode::string(&args[3]);

        self.client.set_array_element(name, index, value).await?;
        Ok(Reply::ok())
    }

    /// ARR/EL/DEL name index
    async fn cmd_arr_el_del(&mut self, inv: &Invocation) -> Result<Reply, CommandError> {
        let args = require(inv, 3)?;
        let name = decode::name(&args[1])?;
        let index = decode::integer(&args[2])?;

        self.client.del_array_element(name, index).await?;
        Ok(Reply::ok())
    }

    // ========================================================================
    // Hash Commands
    // ========================================================================

    /// HASH/SET name {"k":"v"} [ttl]
    async fn cmd_hash_set(&mut self, inv: &Invocation) -> Result<Reply, CommandError> {
        let args = require(inv, 3)?;
        let name = decode::name(&args[1])?;
        let hash = decode::mapping(&args[2])?;
        let ttl = optional_ttl(args, 3);

        self.client.set_hash(name, &hash, ttl).await?;
        Ok(Reply::ok())
    }

    /// HASH/GET name
    async fn cmd_hash_get(&mut self, inv: &Invocation) -> Result<Reply, CommandError> {
        let args = require(inv, 2)?;
        let name = decode::name(&args[1])?;

        let hash = self.client.get_hash(name).await?;
        let object: Map<String, Value> = hash
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        Ok(Reply::Text(Value::Object(object).to_string()))
    }

    /// HASH/EL/GET name key
    async fn cmd_hash_el_get(&mut self, inv: &Invocation) -> Result<Reply, CommandError> {
        let args = require(inv, 3)?;
        let name = decode::name(&args[1])?;
        let key = decode::name(&args[2])?;

        Ok(Reply::Text(self.client.get_hash_element(name, key).await?))
    }

    /// HASH/EL/SET name key "value"
    async fn cmd_hash_el_set(&mut self, inv: &Invocation) -> Result<Reply, CommandError> {
        let args = require(inv, 4)?;
        let name = decode::name(&args[1])?;
        let key = decode::name(&args[2])?;
        let value = decode::string(&args[3]);

        self.client.set_hash_element(name, key, value).await?;
        Ok(Reply::ok())
    }

    /// HASH/EL/DEL name key
    async fn cmd_hash_el_del(&mut self, inv: &Invocation) -> Result<Reply, CommandError> {
        let args = require(inv, 3)?;
        let name = decode::name(&args[1])?;
        let key = decode::name(&args[2])?;

        self.client.del_hash_element(name, key).await?;
        Ok(Reply::ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use tokio_test::assert_ok;

    fn create_session() -> Session<MemoryStore> {
        Session::with_builtins(MemoryStore::with_instance("test"))
    }

    async fn run(session: &mut Session<MemoryStore>, line: &str) -> String {
        session.run_to_text(line).await.unwrap()
    }

    #[tokio::test]
    async fn test_blank_line_is_noop() {
        let mut session = create_session();
        assert_eq!(session.run("").await.unwrap(), Reply::Nothing);
        assert_eq!(session.run("   ").await.unwrap(), Reply::Nothing);
        assert_eq!(session.client().op_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let mut session = create_session();
        assert!(matches!(
            session.run("NOPE arg").await,
            Err(CommandError::CommandNotExist)
        ));
    }

    #[tokio::test]
    async fn test_keyword_case_is_normalized() {
        let mut session = create_session();
        assert_eq!(run(&mut session, r#"set name "v""#).await, "OK");
        assert_eq!(run(&mut session, "Get name").await, "v");
    }

    #[tokio::test]
    async fn test_set_get() {
        let mut session = create_session();
        assert_eq!(run(&mut session, r#"SET name "v""#).await, "OK");
        assert_eq!(run(&mut session, "GET name").await, "v");

        assert_eq!(run(&mut session, r#"SET greeting "Hello World!" 60"#).await, "OK");
        assert_eq!(run(&mut session, "GET greeting").await, "Hello World!");
    }

    #[tokio::test]
    async fn test_set_with_malformed_ttl_defaults_to_zero() {
        let mut session = create_session();
        assert_eq!(run(&mut session, r#"SET name "v" notanumber"#).await, "OK");
        assert_eq!(run(&mut session, "GET name").await, "v");
    }

    #[tokio::test]
    async fn test_not_enough_arguments() {
        let mut session = create_session();
        for line in ["SET name", "GET", "TTL/SET name", "ARR/EL/SET a 1", "HASH/EL/GET h", "ECHO"] {
            assert!(
                matches!(session.run(line).await, Err(CommandError::NotEnoughArguments)),
                "{line}"
            );
        }
        assert_eq!(session.client().op_count(), 0);
    }

    #[tokio::test]
    async fn test_del() {
        let mut session = create_session();
        run(&mut session, "SET name v").await;
        assert_eq!(run(&mut session, "DEL name").await, "OK");
        assert!(matches!(
            session.run("GET name").await,
            Err(CommandError::Store(StoreError::KeyNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_ttl_set_rejects_bad_integer_before_store_call() {
        let mut session = create_session();
        run(&mut session, "SET name v").await;
        let calls = session.client().op_count();

        assert!(matches!(
            session.run("TTL/SET name abc").await,
            Err(CommandError::Decode(DecodeError::InvalidInteger { .. }))
        ));
        assert_eq!(session.client().op_count(), calls);

        assert_eq!(run(&mut session, "TTL/SET name 100").await, "OK");
        assert_eq!(run(&mut session, "TTL/DEL name").await, "OK");
    }

    #[tokio::test]
    async fn test_huge_ttl_is_accepted() {
        let mut session = create_session();
        assert_eq!(run(&mut session, r#"SET a "v" 9223372036854775807"#).await, "OK");
        assert_eq!(run(&mut session, "TTL/SET a 9223372036854775807").await, "OK");
        assert_eq!(run(&mut session, "GET a").await, "v");

        assert_eq!(run(&mut session, r#"ARR/SET l ["x"] 9223372036854775807"#).await, "OK");
        assert_eq!(run(&mut session, r#"HASH/SET h {"k":"v"} 9223372036854775807"#).await, "OK");
    }

    #[tokio::test]
    async fn test_array_commands() {
        let mut session = create_session();
        assert_eq!(run(&mut session, r#"ARR/SET list ["a","b"]"#).await, "OK");
        assert_eq!(run(&mut session, "ARR/EL/GET list 1").await, "b");

        assert_eq!(run(&mut session, r#"ARR/EL/ADD list "c d""#).await, "OK");
        assert_eq!(run(&mut session, r#"ARR/EL/SET list 0 "z""#).await, "OK");
        assert_eq!(run(&mut session, "ARR/EL/DEL list 1").await, "OK");
        assert_eq!(run(&mut session, "ARR/GET list").await, r#"["z","c d"]"#);
    }

    #[tokio::test]
    async fn test_array_errors() {
        let mut session = create_session();
        assert!(matches!(
            session.run("ARR/SET list [broken").await,
            Err(CommandError::Decode(DecodeError::InvalidSequence(_)))
        ));
        assert!(matches!(
            session.run(r#"ARR/SET list ["a", 1]"#).await,
            Err(CommandError::Decode(DecodeError::InvalidSequence(_)))
        ));
        assert_eq!(session.client().op_count(), 0);
        assert!(matches!(
            session.run("ARR/EL/GET list x").await,
            Err(CommandError::Decode(DecodeError::InvalidInteger { .. }))
        ));

        run(&mut session, r#"ARR/SET list ["a"]"#).await;
        assert!(matches!(
            session.run("ARR/EL/GET list 5").await,
            Err(CommandError::Store(StoreError::IndexOutOfRange { index: 5, .. }))
        ));
    }

    #[tokio::test]
    async fn test_hash_commands() {
        let mut session = create_session();
        assert_eq!(run(&mut session, r#"HASH/SET h {"b": "2", "a": "1"} 60"#).await, "OK");
        assert_eq!(run(&mut session, "HASH/EL/GET h a").await, "1");
        assert_eq!(run(&mut session, r#"HASH/EL/SET h c "three""#).await, "OK");
        assert_eq!(run(&mut session, "HASH/EL/DEL h b").await, "OK");
        assert_eq!(
            run(&mut session, "HASH/GET h").await,
            r#"{"a":"1","c":"three"}"#
        );
    }

    #[tokio::test]
    async fn test_hash_set_malformed_makes_no_store_call() {
        let mut session = create_session();
        assert!(matches!(
            session.run(r#"HASH/SET h {"k":"v""#).await,
            Err(CommandError::Decode(DecodeError::InvalidMapping(_)))
        ));
        assert_eq!(session.client().op_count(), 0);
    }

    #[tokio::test]
    async fn test_instance_commands() {
        let mut session = Session::with_builtins(MemoryStore::new());
        assert_eq!(session.prompt(), "> ");

        assert_eq!(run(&mut session, "CREATE b").await, "OK");
        assert_eq!(run(&mut session, "CREATE a").await, "OK");
        assert_eq!(run(&mut session, "LIST").await, "1) a\n2) b");

        assert_eq!(run(&mut session, "SELECT a").await, "OK");
        assert_eq!(session.prompt(), "a> ");

        assert_eq!(run(&mut session, "DESTROY a").await, "OK");
        assert_eq!(session.prompt(), "> ");
        assert!(matches!(
            session.run("SELECT a").await,
            Err(CommandError::Store(StoreError::InstanceNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_keys_listing() {
        let mut session = create_session();
        assert_eq!(run(&mut session, "KEYS").await, "");

        run(&mut session, "SET b 2").await;
        run(&mut session, "SET a 1").await;
        assert_eq!(run(&mut session, "KEYS").await, "1) a\n2) b");
    }

    #[tokio::test]
    async fn test_store_errors_pass_through() {
        let mut session = Session::with_builtins(MemoryStore::new());
        let err = session.run("GET name").await.unwrap_err();
        assert!(matches!(err, CommandError::Store(StoreError::NoInstanceSelected)));
        assert_eq!(err.to_string(), "no instance selected");
    }

    #[tokio::test]
    async fn test_echo() {
        let mut session = create_session();
        assert_eq!(run(&mut session, r#"ECHO "Hello World!""#).await, "Hello World!");
        assert_eq!(run(&mut session, "ECHO plain").await, "plain");
    }

    #[tokio::test]
    async fn test_exit() {
        let mut session = create_session();
        assert_eq!(session.run("EXIT").await.unwrap(), Reply::Exit);
        assert!(matches!(
            session.run_to_text("EXIT").await,
            Err(CommandError::CannotExit)
        ));
    }

    #[tokio::test]
    async fn test_help_lists_every_command_once() {
        let mut session = create_session();
        let help = run(&mut session, "HELP").await;

        assert!(help.starts_with("Function show information about other functions\n"));
        for (keyword, command) in session.registry().iter() {
            let line = format!("{} - {}", keyword, command.title);
            assert_eq!(help.lines().filter(|l| *l == line).count(), 1, "{line}");
        }
    }

    #[tokio::test]
    async fn test_help_for_one_command() {
        let mut session = create_session();
        assert_eq!(
            run(&mut session, "HELP get").await,
            "Get value\nExample: GET name"
        );
        assert!(matches!(
            session.run("HELP NOPE").await,
            Err(CommandError::CommandNotExist)
        ));
    }

    #[tokio::test]
    async fn test_custom_registry() {
        let mut registry = Registry::new();
        registry.register("SHOUT", CommandDescriptor::new("Echo, louder", "", Handler::Echo));
        let mut session = Session::new(registry, MemoryStore::new());

        assert_ok!(session.run("SHOUT hey").await);
        assert!(matches!(
            session.run("ECHO hey").await,
            Err(CommandError::CommandNotExist)
        ));
    }

    #[test]
    fn test_builtin_table() {
        let registry = builtin_commands();
        assert_eq!(registry.len(), 24);
        assert_eq!(registry.lookup("ARR/EL/GET").map(|c| c.handler), Some(Handler::ArrElGet));
        assert!(registry.iter().all(|(keyword, _)| keyword == keyword.to_uppercase()));
    }
}

//! Command-line configuration.
//!
//! Flags take a single dash (`-http.addr`); a double dash and
//! the `-flag=value` form are accepted as well:
//!
//! ```text
//! kvshell -http.addr http://db.local:3000
//! kvshell --http.addr=http://db.local:3000
//! kvshell -version
//! ```

use anyhow::{anyhow, bail, Result};

/// Address of the store server when none is given.
pub const DEFAULT_HTTP_ADDR: &str = "http://localhost:3000";

/// Shell configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the store server
    pub http_addr: String,
    /// Print the build version and exit
    pub show_version: bool,
    /// Print usage and exit
    pub show_help: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            show_version: false,
            show_help: false,
        }
    }
}

impl Config {
    /// Parses flags, not including the program name.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Config::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let flag = arg
                .strip_prefix("--")
                .or_else(|| arg.strip_prefix('-'))
                .ok_or_else(|| anyhow!("unexpected argument: {}", arg))?;

            let (name, inline) = match flag.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (flag, None),
            };

            match name {
                "http.addr" => {
                    let value = match inline {
                        Some(value) => value,
                        None => args
                            .next()
                            .ok_or_else(|| anyhow!("flag needs an argument: -http.addr"))?,
                    };
                    if value.is_empty() {
                        bail!("flag needs an argument: -http.addr");
                    }
                    config.http_addr = value;
                }
                "version" => config.show_version = true,
                "h" | "help" => config.show_help = true,
                _ => bail!("flag provided but not defined: -{}", name),
            }
        }

        Ok(config)
    }
}

/// Usage text for `-help` and flag errors.
pub fn usage() -> String {
    format!(
        r#"kvshell - interactive shell for a key-value store

USAGE:
    kvshell [OPTIONS]

OPTIONS:
    -http.addr <URL>    Address of the store server (default: {})
    -version            Print the build version
    -h, -help           Print this help message

Run 'HELP' inside the shell for the list of commands."#,
        DEFAULT_HTTP_ADDR
    )
}

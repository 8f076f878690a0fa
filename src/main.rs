//! kvshell - An Interactive Shell for a Key-Value Store
//!
//! This is the main entry point. It parses flags, sets up logging, connects
//! the HTTP store client and runs the REPL on stdin/stdout.

use anyhow::Context;
use kvshell::commands::Session;
use kvshell::config::{usage, Config};
use kvshell::repl::{BlockingLines, ReplHandler, ReplOutcome};
use kvshell::store::HttpClient;
use tokio::io::stdout;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", usage());
            std::process::exit(2);
        }
    };

    if config.show_help {
        println!("{}", usage());
        return Ok(());
    }
    if config.show_version {
        println!("kvshell client build: {}", kvshell::VERSION);
        return Ok(());
    }

    // Set up logging; stdout belongs to the shell
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    let client = HttpClient::new(&config.http_addr)
        .with_context(|| format!("invalid store address '{}'", config.http_addr))?;
    info!(addr = %client.base_url(), "Store client ready");

    let session = Session::with_builtins(client);
    let input = BlockingLines::stdin().context("failed to start the input reader")?;
    let mut repl = ReplHandler::new(session, input, stdout());

    // Ctrl+C leaves the shell like EXIT does
    let interrupted = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Interrupted, leaving the shell"),
            Err(e) => {
                warn!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        result = repl.run() => {
            if result.context("shell stopped")? == ReplOutcome::EndOfInput {
                info!("Input closed");
            }
        }
        _ = interrupted => {}
    }

    let stats = repl.stats();
    info!(
        commands = stats.commands_processed,
        failed = stats.commands_failed,
        read_errors = stats.read_errors,
        "Session complete"
    );
    Ok(())
}

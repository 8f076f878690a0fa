//! REPL Handler
//!
//! Runs the read-dispatch-print loop of the shell.
//!
//! ## Lifecycle
//!
//! ```text
//! 1. Greeting printed
//!        │
//!        ▼
//! 2. ┌──────────────────────────────┐
//!    │      Main Loop               │
//!    │                              │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Print "<instance>> "    │ │
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Read one line           │ │
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Session::run            │ │
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Print result or error   │ │
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │         [Loop back]          │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 3. EXIT / end of input: "Bye!"
//! ```
//!
//! Errors never stop the loop. A failed read prints `ERROR: ...` and the
//! prompt comes back; only a long run of failed reads gives up.

use super::input::LineSource;
use crate::commands::{CommandError, Session};
use crate::protocol::Reply;
use crate::store::StoreClient;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Printed once before the first prompt.
pub const GREETING: &str = "kvshell greets you";

/// Printed when the user leaves.
pub const FAREWELL: &str = "Bye!";

/// Printed instead of an error message for an unknown keyword.
pub const HELP_INFORMATION: &str = "Command does not exist.\nRun 'HELP' for usage.";

/// Consecutive failed reads after which the input is considered dead.
const MAX_READ_ERRORS: u32 = 16;

/// Counters for one shell run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplStats {
    /// Commands that completed successfully
    pub commands_processed: u64,
    /// Commands that returned an error
    pub commands_failed: u64,
    /// Lines that could not be read
    pub read_errors: u64,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplOutcome {
    /// The user ran `EXIT`
    Exit,
    /// The input stream was closed
    EndOfInput,
}

/// Errors that end the loop.
#[derive(Debug, thiserror::Error)]
pub enum ReplError {
    /// Writing to the output failed
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reading failed too many times in a row
    #[error("input failed {0} times in a row")]
    InputFailed(u32),
}

/// Drives one interactive session over an input and an output stream.
pub struct ReplHandler<C, R, W> {
    session: Session<C>,
    input: R,
    output: W,
    stats: ReplStats,
}

impl<C, R, W> ReplHandler<C, R, W>
where
    C: StoreClient,
    R: LineSource,
    W: AsyncWrite + Unpin,
{
    pub fn new(session: Session<C>, input: R, output: W) -> Self {
        Self {
            session,
            input,
            output,
            stats: ReplStats::default(),
        }
    }

    pub fn stats(&self) -> ReplStats {
        self.stats
    }

    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    /// Gives back the session and the output stream.
    pub fn into_parts(self) -> (Session<C>, W) {
        (self.session, self.output)
    }

    /// Runs the loop until `EXIT`, end of input or a dead input stream.
    pub async fn run(&mut self) -> Result<ReplOutcome, ReplError> {
        debug!("Shell started");

        let result = self.main_loop().await;

        match &result {
            Ok(outcome) => info!(
                ?outcome,
                commands = self.stats.commands_processed,
                failed = self.stats.commands_failed,
                "Shell stopped"
            ),
            Err(e) => warn!(error = %e, "Shell stopped"),
        }

        result
    }

    /// The main prompt-read-dispatch-print loop.
    async fn main_loop(&mut self) -> Result<ReplOutcome, ReplError> {
        self.write_line(GREETING).await?;
        let mut failed_reads = 0;

        loop {
            let prompt = self.session.prompt();
            self.output.write_all(prompt.as_bytes()).await?;
            self.output.flush().await?;

            let mut line = String::new();
            match self.input.next_line(&mut line).await {
                Ok(0) => {
                    self.write_line("").await?;
                    self.write_line(FAREWELL).await?;
                    return Ok(ReplOutcome::EndOfInput);
                }
                Ok(_) => failed_reads = 0,
                Err(e) => {
                    failed_reads += 1;
                    self.stats.read_errors += 1;
                    warn!(error = %e, failed_reads, "Failed to read input");
                    self.write_line(&format!("ERROR: {}", e)).await?;
                    if failed_reads >= MAX_READ_ERRORS {
                        return Err(ReplError::InputFailed(failed_reads));
                    }
                    continue;
                }
            }

            match self.session.run(&line).await {
                Ok(Reply::Exit) => {
                    self.write_line(FAREWELL).await?;
                    return Ok(ReplOutcome::Exit);
                }
                Ok(Reply::Nothing) => {}
                Ok(Reply::Text(text)) => {
                    self.stats.commands_processed += 1;
                    self.write_line(&text).await?;
                }
                Err(CommandError::CommandNotExist) => {
                    self.stats.commands_failed += 1;
                    self.write_line(HELP_INFORMATION).await?;
                }
                Err(e) => {
                    self.stats.commands_failed += 1;
                    debug!(error = %e, "Command failed");
                    self.write_line(&format!("ERROR: {}", e)).await?;
                }
            }
        }
    }

    async fn write_line(&mut self, text: &str) -> Result<(), ReplError> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repl::input::BlockingLines;
    use crate::store::MemoryStore;
    use std::io;
    use std::time::Duration;
    use tokio::io::BufReader;

    async fn run_script(
        store: MemoryStore,
        script: &str,
    ) -> (Result<ReplOutcome, ReplError>, ReplStats, String) {
        let session = Session::with_builtins(store);
        let mut repl = ReplHandler::new(session, script.as_bytes(), Vec::new());
        let result = repl.run().await;
        let stats = repl.stats();
        let (_, output) = repl.into_parts();
        (result, stats, String::from_utf8(output).unwrap())
    }

    #[tokio::test]
    async fn test_session_transcript() {
        let (result, stats, output) = run_script(
            MemoryStore::with_instance("db"),
            "SET a \"1\"\nGET a\nEXIT\nGET a\n",
        )
        .await;

        assert_eq!(result.unwrap(), ReplOutcome::Exit);
        assert_eq!(output, "kvshell greets you\ndb> OK\ndb> 1\ndb> Bye!\n");
        assert_eq!(stats.commands_processed, 2);
    }

    #[tokio::test]
    async fn test_errors_keep_the_loop_running() {
        let (result, stats, output) = run_script(
            MemoryStore::with_instance("db"),
            "NOPE\nTTL/SET a abc\n\nGET\nEXIT\n",
        )
        .await;

        assert_eq!(result.unwrap(), ReplOutcome::Exit);
        assert_eq!(
            output,
            "kvshell greets you\n\
             db> Command does not exist.\nRun 'HELP' for usage.\n\
             db> ERROR: invalid integer 'abc': invalid digit found in string\n\
             db> db> ERROR: Not enough arguments\n\
             db> Bye!\n"
        );
        assert_eq!(stats.commands_failed, 3);
        assert_eq!(stats.commands_processed, 0);
    }

    #[tokio::test]
    async fn test_prompt_follows_selected_instance() {
        let (_, _, output) =
            run_script(MemoryStore::new(), "CREATE main\nSELECT main\nEXIT\n").await;
        assert_eq!(output, "kvshell greets you\n> OK\n> OK\nmain> Bye!\n");
    }

    #[tokio::test]
    async fn test_end_of_input() {
        let (result, _, output) = run_script(MemoryStore::new(), "LIST\n").await;
        assert_eq!(result.unwrap(), ReplOutcome::EndOfInput);
        assert!(output.ends_with("> \n> \nBye!\n"));
    }

    #[tokio::test]
    async fn test_read_error_is_reported_and_loop_continues() {
        let input = tokio_test::io::Builder::new()
            .read(b"SET a 1\n")
            .read_error(io::Error::new(io::ErrorKind::Other, "boom"))
            .read(b"GET a\n")
            .build();
        let session = Session::with_builtins(MemoryStore::with_instance("db"));
        let mut repl = ReplHandler::new(session, BufReader::new(input), Vec::new());

        assert_eq!(repl.run().await.unwrap(), ReplOutcome::EndOfInput);
        assert_eq!(repl.stats().read_errors, 1);

        let (_, output) = repl.into_parts();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("db> ERROR: boom\ndb> 1\n"));
    }

    #[tokio::test]
    async fn test_dead_input_gives_up() {
        let mut builder = tokio_test::io::Builder::new();
        for _ in 0..MAX_READ_ERRORS {
            builder.read_error(io::Error::new(io::ErrorKind::Other, "gone"));
        }
        let input = builder.build();
        drop(builder);
        let session = Session::with_builtins(MemoryStore::new());
        let mut repl = ReplHandler::new(session, BufReader::new(input), Vec::new());

        assert!(matches!(
            repl.run().await,
            Err(ReplError::InputFailed(MAX_READ_ERRORS))
        ));
    }

    /// A terminal nobody types into.
    struct Idle;

    impl io::Read for Idle {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            loop {
                std::thread::park();
            }
        }
    }

    #[tokio::test]
    async fn test_interrupt_while_waiting_for_input() {
        let input = BlockingLines::spawn(io::BufReader::new(Idle)).unwrap();
        let session = Session::with_builtins(MemoryStore::with_instance("db"));
        let mut repl = ReplHandler::new(session, input, Vec::new());

        let interrupted = tokio::time::sleep(Duration::from_millis(50));
        tokio::select! {
            _ = repl.run() => panic!("the shell should still be waiting for input"),
            _ = interrupted => {}
        }

        let (_, output) = repl.into_parts();
        assert_eq!(String::from_utf8(output).unwrap(), "kvshell greets you\ndb> ");
    }

    #[tokio::test]
    async fn test_blocking_lines_drive_the_loop() {
        let input = BlockingLines::spawn(io::Cursor::new("SET a 1\nGET a\n")).unwrap();
        let session = Session::with_builtins(MemoryStore::with_instance("db"));
        let mut repl = ReplHandler::new(session, input, Vec::new());

        assert_eq!(repl.run().await.unwrap(), ReplOutcome::EndOfInput);
        let (_, output) = repl.into_parts();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "kvshell greets you\ndb> OK\ndb> 1\ndb> \nBye!\n"
        );
    }
}

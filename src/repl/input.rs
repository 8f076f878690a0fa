//! Line Input
//!
//! Where the REPL gets its lines from. Any tokio [`AsyncBufRead`] works,
//! which is what the tests use. The terminal goes through [`BlockingLines`]
//! instead: `tokio::io::stdin()` reads on a blocking-pool thread that cannot
//! be cancelled, so a pending read would hold up runtime shutdown after
//! Ctrl+C until the user pressed Enter.
//!
//! ```text
//! ┌──────────────────┐  io::Result<String>  ┌──────────────────┐
//! │  reader thread   │─────────────────────>│  BlockingLines   │
//! │ (std BufRead)    │     mpsc channel     │  (LineSource)    │
//! └──────────────────┘                      └──────────────────┘
//! ```
//!
//! The reader thread is detached. It stops at end of input or once the
//! receiving side is gone; if it is parked in a read when the process
//! exits, it is simply torn down with it.

use std::io::{self, BufRead};
use std::thread;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::trace;

/// A source of input lines.
#[allow(async_fn_in_trait)]
pub trait LineSource {
    /// Appends the next line (newline included) to `buf`.
    ///
    /// Returns the number of bytes read; `0` means end of input.
    async fn next_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

impl<T: AsyncBufRead + Unpin> LineSource for T {
    async fn next_line(&mut self, buf: &mut String) -> io::Result<usize> {
        self.read_line(buf).await
    }
}

/// Lines read by a dedicated OS thread from a blocking reader.
pub struct BlockingLines {
    rx: mpsc::Receiver<io::Result<String>>,
}

impl BlockingLines {
    /// Reads the process's standard input.
    pub fn stdin() -> io::Result<Self> {
        Self::spawn(io::BufReader::new(io::stdin()))
    }

    /// Starts a thread that reads `reader` line by line.
    pub fn spawn<R>(mut reader: R) -> io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(1);

        thread::Builder::new()
            .name("kvshell-input".to_string())
            .spawn(move || loop {
                let mut line = String::new();
                let item = match reader.read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) => Ok(line),
                    Err(e) => Err(e),
                };
                if tx.blocking_send(item).is_err() {
                    break;
                }
            })?;

        trace!("Input thread started");
        Ok(Self { rx })
    }
}

impl LineSource for BlockingLines {
    async fn next_line(&mut self, buf: &mut String) -> io::Result<usize> {
        match self.rx.recv().await {
            Some(Ok(line)) => {
                buf.push_str(&line);
                Ok(line.len())
            }
            Some(Err(e)) => Err(e),
            None => Ok(0),
        }
    }
}

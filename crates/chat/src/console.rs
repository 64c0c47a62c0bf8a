//! Local console gateway for trying commands without a chat connection.
//!
//! Every line is treated as coming from a privileged sender and is executed
//! directly. An empty line or end of input ends the session.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info};

use crate::handler::MessageHandler;
use crate::traits::{ChatError, Gateway};

pub struct ConsoleGateway<R, W> {
    input: R,
    output: W,
}

impl ConsoleGateway<tokio::io::BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    /// Read from stdin, reply on stdout.
    pub fn stdio() -> Self {
        Self::new(tokio::io::BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> ConsoleGateway<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

#[async_trait]
impl<R, W> Gateway for ConsoleGateway<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn run(&mut self, handler: Arc<MessageHandler>) -> Result<(), ChatError> {
        info!("debug console started, enter an empty line to quit");
        let mut lines = (&mut self.input).lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                break;
            }
            match handler.processor().process_command(line, true) {
                Ok(Some(reply)) => {
                    self.output.write_all(reply.as_bytes()).await?;
                    self.output.write_all(b"\n").await?;
                    self.output.flush().await?;
                }
                Ok(None) => {}
                Err(e) => error!(error = %e, line = %line, "failed to apply command"),
            }
        }

        info!("debug console closed");
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

//! Interactive loop and lifecycle
//!
//! Drives one turn at a time: chat reply, then detail extraction, then the
//! profile merge. Every way out of the loop (the `exit` command, end of input,
//! an interrupt) goes through the same shutdown.

use std::future::Future;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info};

use crate::config::Config;
use crate::conversational::ConversationSession;
use crate::extractor::DetailExtractor;
use crate::gateway::ModelGateway;
use crate::memory::ConversationHistory;
use crate::profile::ProfileStore;

pub const WELCOME_BANNER: &str = "Welcome to AI Financial Support. How can I help you today?";
pub const USAGE_HINT: &str = "(Type 'exit' to quit)";
pub const PROMPT: &str = "You: ";
pub const REPLY_PREFIX: &str = "AI Support: ";
pub const DETAILS_MODIFIED: &str = "Details Modified";
pub const BLANK_INPUT: &str = "Please Type Something First...";
pub const TURN_FAILED: &str = "Error: Could not get response from AI.";
pub const FAREWELL: &str = "Thank you. Goodbye!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    AwaitingInput,
    Processing,
    Terminating,
}

/// Why the loop stopped. All of these are clean exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    ExitCommand,
    EndOfInput,
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Blank,
    Exit,
    Message(&'a str),
}

pub fn classify_input(line: &str) -> Command<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Command::Blank
    } else if trimmed.eq_ignore_ascii_case("exit") {
        Command::Exit
    } else {
        Command::Message(trimmed)
    }
}

/// Interrupt listener, installed immediately rather than on first poll.
///
/// Once installed, SIGINT no longer kills the process for its remaining lifetime.
#[cfg(unix)]
pub fn interrupt_signal() -> std::io::Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    Ok(async move {
        if sigint.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    })
}

#[cfg(not(unix))]
pub fn interrupt_signal() -> std::io::Result<impl Future<Output = ()>> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Unable to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    })
}

/// Everything one conversation needs, owned in one place
pub struct Assistant {
    gateway: ModelGateway,
    session: ConversationSession,
    extractor: DetailExtractor,
    profile: ProfileStore,
    state: LoopState,
}

impl Assistant {
    pub fn new(gateway: ModelGateway) -> Self {
        let settings = gateway.settings().clone();
        let extractor = DetailExtractor::new(settings.model.clone());

        Self {
            gateway,
            session: ConversationSession::new(settings),
            extractor,
            profile: ProfileStore::new(),
            state: LoopState::Idle,
        }
    }

    pub fn from_config(config: &Config) -> crate::Result<Self> {
        Ok(Self::new(ModelGateway::initialize(config)?))
    }

    pub fn history(&self) -> &ConversationHistory {
        self.session.history()
    }

    pub fn profile(&self) -> &ProfileStore {
        &self.profile
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_shut_down(&self) -> bool {
        self.gateway.is_released()
    }

    /// Run until exit, end of input or `interrupt` resolves.
    pub async fn run<R, W, S>(
        &mut self,
        mut input: R,
        out: &mut W,
        interrupt: S,
    ) -> crate::Result<ExitReason>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
        S: Future<Output = ()>,
    {
        tokio::pin!(interrupt);
        let mut line = Vec::new();

        writeln!(out, "{}", WELCOME_BANNER)?;
        writeln!(out, "{}", USAGE_HINT)?;
        self.state = LoopState::AwaitingInput;
        info!("Interactive loop started");

        let reason = loop {
            write!(out, "{}", PROMPT)?;
            out.flush()?;

            let step = tokio::select! {
                biased;
                _ = &mut interrupt => Ok(Some(ExitReason::Interrupted)),
                step = self.next_step(&mut input, &mut line, out) => step,
            };

            match step {
                Ok(Some(reason)) => break reason,
                Ok(None) => continue,
                Err(e) => {
                    error!("Interactive loop aborted: {}", e);
                    self.shutdown(out)?;
                    return Err(e);
                }
            }
        };

        if reason == ExitReason::Interrupted {
            writeln!(out)?;
        }
        info!(?reason, "Interactive loop finished");
        self.shutdown(out)?;
        Ok(reason)
    }

    async fn next_step<R, W>(
        &mut self,
        input: &mut R,
        line: &mut Vec<u8>,
        out: &mut W,
    ) -> crate::Result<Option<ExitReason>>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        line.clear();
        if input.read_until(b'\n', line).await? == 0 {
            writeln!(out)?;
            return Ok(Some(ExitReason::EndOfInput));
        }

        // Invalid UTF-8 is replaced, never fatal
        let text = String::from_utf8_lossy(&line[..]).into_owned();
        self.handle_line(&text, out).await
    }

    /// Handle one line of input. Returns an exit reason when the loop should stop.
    pub async fn handle_line<W: Write>(
        &mut self,
        line: &str,
        out: &mut W,
    ) -> crate::Result<Option<ExitReason>> {
        match classify_input(line) {
            Command::Blank => {
                writeln!(out, "{}", BLANK_INPUT)?;
                Ok(None)
            }
            Command::Exit => {
                self.state = LoopState::Terminating;
                Ok(Some(ExitReason::ExitCommand))
            }
            Command::Message(text) => {
                self.state = LoopState::Processing;
                if let Err(e) = self.respond(text, out).await {
                    error!("Turn failed: {}", e);
                    writeln!(out, "{} {}", TURN_FAILED, e)?;
                }
                self.state = LoopState::AwaitingInput;
                Ok(None)
            }
        }
    }

    async fn respond<W: Write>(&mut self, text: &str, out: &mut W) -> crate::Result<()> {
        let reply = self
            .session
            .send_user_message(self.gateway.chat(), text)
            .await?;
        writeln!(out, "{}{}", REPLY_PREFIX, reply)?;
        out.flush()?;

        let details = self.extractor.extract(self.gateway.extractor(), text).await;
        if self.profile.merge(details.as_ref()) {
            info!(fields = self.profile.len(), "Profile updated");
            writeln!(out, "{}", DETAILS_MODIFIED)?;
        }

        Ok(())
    }

    /// Release both connections and say goodbye. Runs at most once.
    pub fn shutdown<W: Write>(&mut self, out: &mut W) -> std::io::Result<()> {
        self.state = LoopState::Terminating;
        if self.gateway.is_released() {
            return Ok(());
        }
        self.gateway.shutdown();
        writeln!(out, "{}", FAREWELL)?;
        out.flush()
    }
}

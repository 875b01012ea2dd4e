//! Registry of terminal sessions.

use tracing::{debug, info, warn};

use super::{Terminal, TerminalHost};
use crate::error::TccRunnerError;
use crate::Result;

/// Label for the `n`-th session (1-based).
pub fn session_name(n: usize) -> String {
    format!("compiler #{}", n)
}

/// Owns the sessions created through a host.
///
/// Sessions are created lazily and reused: `ensure_session` only creates one
/// when none exists, so during normal use the registry holds exactly one.
pub struct TerminalRegistry<H: TerminalHost> {
    host: H,
    sessions: Vec<H::Terminal>,
}

impl<H: TerminalHost> TerminalRegistry<H> {
    /// Create an empty registry.
    pub fn new(host: H) -> Self {
        Self {
            host,
            sessions: Vec::new(),
        }
    }

    /// Return the current session, creating one if none exists.
    pub fn ensure_session(&mut self) -> Result<&mut H::Terminal> {
        if self.sessions.is_empty() {
            let name = session_name(self.sessions.len() + 1);
            let terminal = self.host.create_terminal(&name)?;
            info!("terminal session created: {}", name);
            self.sessions.push(terminal);
        } else {
            debug!("reusing terminal session");
        }

        self.sessions.last_mut().ok_or(TccRunnerError::NoSession)
    }

    /// The most recently created session.
    pub fn current_session(&self) -> Option<&H::Terminal> {
        self.sessions.last()
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Close every session, newest first.
    ///
    /// Sessions that fail to close are logged and dropped anyway.
    pub async fn shutdown(&mut self) {
        while let Some(mut terminal) = self.sessions.pop() {
            let name = terminal.name().to_string();
            match terminal.close().await {
                Ok(()) => info!("terminal session closed: {}", name),
                Err(e) => warn!("failed to close terminal session {}: {}", name, e),
            }
        }
    }
}

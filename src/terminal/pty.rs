//! Shell sessions running in a native pseudo-terminal.

use std::io::{Read, Write};
use std::time::Duration;

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySystem};
use tracing::{debug, info};

use super::pump::OutputPump;
use super::{Terminal, TerminalHost};
use crate::error::TccRunnerError;
use crate::Result;

/// How long `close` waits for the remaining output to be forwarded.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// Get the default shell for the current platform.
pub fn default_shell() -> String {
    #[cfg(unix)]
    {
        std::env::var("SHELL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "/bin/sh".to_string())
    }
    #[cfg(windows)]
    {
        "powershell.exe".to_string()
    }
}

/// Size of a PTY in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PtySize {
    /// Number of rows (height).
    pub rows: u16,
    /// Number of columns (width).
    pub cols: u16,
}

impl PtySize {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

impl Default for PtySize {
    fn default() -> Self {
        Self { rows: 24, cols: 80 }
    }
}

impl From<PtySize> for portable_pty::PtySize {
    fn from(size: PtySize) -> Self {
        portable_pty::PtySize {
            rows: size.rows,
            cols: size.cols,
            pixel_width: 0,
            pixel_height: 0,
        }
    }
}

/// Creates interactive shells in native PTYs.
///
/// Output of a shown session is forwarded to this process's stdout.
pub struct PtyTerminalHost {
    pty_system: Box<dyn PtySystem + Send>,
    shell: String,
    size: PtySize,
    runtime: tokio::runtime::Handle,
}

impl PtyTerminalHost {
    /// Create a host spawning `shell`, bound to the current tokio runtime.
    pub fn new(shell: impl Into<String>) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TccRunnerError::Pty(format!("no async runtime: {}", e)))?;

        Ok(Self {
            pty_system: native_pty_system(),
            shell: shell.into(),
            size: PtySize::default(),
            runtime,
        })
    }

    /// Set the size of PTYs created from now on.
    pub fn with_size(mut self, size: PtySize) -> Self {
        self.size = size;
        self
    }
}

impl TerminalHost for PtyTerminalHost {
    type Terminal = PtyTerminal;

    fn create_terminal(&mut self, name: &str) -> Result<PtyTerminal> {
        let pair = self
            .pty_system
            .openpty(self.size.into())
            .map_err(|e| TccRunnerError::Pty(e.to_string()))?;

        // Inherits the environment and working directory of this process.
        let mut cmd = CommandBuilder::new(&self.shell);
        if let Ok(cwd) = std::env::current_dir() {
            cmd.cwd(cwd);
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| TccRunnerError::Pty(e.to_string()))?;
        drop(pair.slave);

        let writer = pair
            .master
            .take_writer()
            .map_err(|e| TccRunnerError::Pty(e.to_string()))?;

        info!(
            "spawned {} for {} (pid {})",
            self.shell,
            name,
            child.process_id().unwrap_or(0)
        );

        Ok(PtyTerminal {
            name: name.to_string(),
            master: Some(pair.master),
            child: Some(child),
            writer: Some(writer),
            pump: None,
            runtime: self.runtime.clone(),
        })
    }
}

/// An interactive shell in a PTY.
pub struct PtyTerminal {
    name: String,
    master: Option<Box<dyn MasterPty + Send>>,
    child: Option<Box<dyn Child + Send + Sync>>,
    writer: Option<Box<dyn Write + Send>>,
    pump: Option<OutputPump>,
    runtime: tokio::runtime::Handle,
}

impl PtyTerminal {
    /// Process ID of the shell, if still known.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(|c| c.process_id())
    }

    /// Whether output is being forwarded.
    pub fn is_shown(&self) -> bool {
        self.pump.is_some()
    }

    /// Start forwarding session output into `sink`.
    ///
    /// Only the first call has an effect; output already forwarded
    /// elsewhere is not redirected.
    pub fn forward_to<W>(&mut self, sink: W) -> Result<()>
    where
        W: tokio::io::AsyncWrite + Unpin + Send + 'static,
    {
        if self.pump.is_none() {
            let reader = self.reader()?;
            self.pump = Some(OutputPump::start(&self.runtime, reader, sink));
            debug!("{} shown", self.name);
        }
        Ok(())
    }

    fn reader(&self) -> Result<Box<dyn Read + Send>> {
        self.master
            .as_ref()
            .ok_or(TccRunnerError::NoSession)?
            .try_clone_reader()
            .map_err(|e| TccRunnerError::Pty(e.to_string()))
    }
}

impl Terminal for PtyTerminal {
    fn name(&self) -> &str {
        &self.name
    }

    fn send_text(&mut self, text: &str) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(TccRunnerError::NoSession)?;
        writer.write_all(text.as_bytes())?;
        writer.write_all(LINE_ENDING.as_bytes())?;
        writer.flush()?;
        debug!("sent {} bytes to {}", text.len(), self.name);
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        self.forward_to(tokio::io::stdout())
    }

    async fn close(&mut self) -> Result<()> {
        // Dropping the writer sends EOF; the shell leaves once its
        // foreground job is done. Nothing is typed into the session.
        drop(self.writer.take());

        if let Some(mut child) = self.child.take() {
            let status = tokio::task::spawn_blocking(move || child.wait())
                .await
                .map_err(|e| TccRunnerError::Pty(e.to_string()))??;
            debug!("{} exited: {:?}", self.name, status);
        }

        // Some platforms only signal EOF to the reader once the master is gone.
        self.master.take();

        if let Some(pump) = self.pump.take() {
            if let Some(bytes) = pump.finish(DRAIN_TIMEOUT).await {
                debug!("{} forwarded {} bytes", self.name, bytes);
            }
        }

        Ok(())
    }
}

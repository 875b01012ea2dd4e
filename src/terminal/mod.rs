//! Terminal sessions.
//!
//! A [`TerminalHost`] creates interactive shell sessions; the
//! [`TerminalRegistry`] keeps them and hands out the current one, creating
//! it lazily on first use.

mod pty;
mod pump;
mod registry;

pub use pty::{default_shell, PtySize, PtyTerminal, PtyTerminalHost};
pub use pump::OutputPump;
pub use registry::{session_name, TerminalRegistry};

use crate::Result;

/// An interactive shell session.
#[allow(async_fn_in_trait)]
pub trait Terminal {
    /// Label shown for this session.
    fn name(&self) -> &str;

    /// Type `text` into the session followed by a line ending.
    fn send_text(&mut self, text: &str) -> Result<()>;

    /// Bring the session to the foreground.
    fn show(&mut self) -> Result<()>;

    /// End the session and wait for it to go away.
    async fn close(&mut self) -> Result<()>;
}

/// Something that can open interactive shell sessions.
pub trait TerminalHost {
    type Terminal: Terminal;

    fn create_terminal(&mut self, name: &str) -> Result<Self::Terminal>;
}

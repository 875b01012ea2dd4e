//! # tcc-runner
//!
//! Command palette bridge for the Tiny C Compiler.
//!
//! Each `run` or `compile` action composes a `tcc` command line from the
//! user's settings and the active document, then types it into one
//! reusable interactive shell session running in a pseudo-terminal.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tcc_runner::{
//!     Dispatcher, EditorState, Platform, PlatformResolver, PtyTerminalHost, UserSettings,
//! };
//!
//! #[tokio::main]
//! async fn main() -> tcc_runner::Result<()> {
//!     tcc_runner::logging::try_init(None).ok();
//!
//!     let host = PtyTerminalHost::new("/bin/sh")?;
//!     let settings = UserSettings::new(None);
//!     let editor = EditorState::with_document("hello.c")?;
//!     let resolver = PlatformResolver::new(Platform::current(), ".");
//!
//!     let mut dispatcher = Dispatcher::new(host, settings, editor, resolver);
//!     let command = dispatcher.run()?;
//!     println!("dispatched: {}", command);
//!
//!     dispatcher.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod compose;
pub mod config;
pub mod dispatch;
pub mod editor;
pub mod error;
pub mod logging;
pub mod palette;
pub mod platform;
pub mod settings;
pub mod terminal;

/// Serializes tests that set process environment variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

// Re-export commonly used types
pub use compose::{CommandComposer, ComposedCommand, Mode};
pub use dispatch::Dispatcher;
pub use editor::{Editor, EditorState};
pub use error::{Result, TccRunnerError};
pub use platform::{Platform, PlatformResolver, UnsupportedPlatformPolicy};
pub use settings::{SettingKey, Settings, UserSettings};
pub use terminal::{PtyTerminal, PtyTerminalHost, Terminal, TerminalHost, TerminalRegistry};

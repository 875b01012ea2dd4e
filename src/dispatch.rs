//! Palette actions: compose a compiler command and hand it to the terminal.

use tracing::info;

use crate::compose::{CommandComposer, ComposedCommand, Mode};
use crate::editor::Editor;
use crate::platform::PlatformResolver;
use crate::settings::Settings;
use crate::terminal::{Terminal, TerminalHost, TerminalRegistry};
use crate::Result;

/// Owns everything an action needs and the terminal sessions it drives.
///
/// Constructed once at startup; call [`Dispatcher::shutdown`] before exit.
pub struct Dispatcher<H: TerminalHost, S: Settings, E: Editor> {
    registry: TerminalRegistry<H>,
    settings: S,
    editor: E,
    resolver: PlatformResolver,
}

impl<H: TerminalHost, S: Settings, E: Editor> Dispatcher<H, S, E> {
    pub fn new(host: H, settings: S, editor: E, resolver: PlatformResolver) -> Self {
        Self {
            registry: TerminalRegistry::new(host),
            settings,
            editor,
            resolver,
        }
    }

    /// Compile the active document (or the configured flags) and run it.
    pub fn run(&mut self) -> Result<ComposedCommand> {
        self.dispatch(Mode::Run)
    }

    /// Compile only.
    pub fn compile(&mut self) -> Result<ComposedCommand> {
        self.dispatch(Mode::Compile)
    }

    /// Compose the command for `mode` without touching any terminal.
    pub fn preview(&self, mode: Mode) -> Result<ComposedCommand> {
        CommandComposer::new(&self.settings, &self.editor, &self.resolver).build_command(mode)
    }

    /// Compose, send to the current session and show it.
    pub fn dispatch(&mut self, mode: Mode) -> Result<ComposedCommand> {
        let command = self.preview(mode)?;
        let line = command.command_line();

        let terminal = self.registry.ensure_session()?;
        terminal.send_text(&line)?;
        terminal.show()?;

        info!("{} dispatched to {}: {}", mode, terminal.name(), line);
        Ok(command)
    }

    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    pub fn active_document(&self) -> Option<std::path::PathBuf> {
        self.editor.active_document()
    }

    pub fn registry(&self) -> &TerminalRegistry<H> {
        &self.registry
    }

    /// Close all terminal sessions.
    pub async fn shutdown(&mut self) {
        self.registry.shutdown().await;
    }
}

//! Compiler command composition.

use std::fmt;
use std::path::PathBuf;

use crate::editor::Editor;
use crate::platform::PlatformResolver;
use crate::settings::{SettingKey, Settings};
use crate::Result;

/// Marker telling tcc to run the compiled program instead of writing it out.
pub const RUN_MARKER: &str = "-run";

/// Which palette action a command is composed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Compile and run in one step (`tcc <flags> -run <args>`).
    Run,
    /// Compile only (`tcc <flags> <args>`).
    Compile,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Run => "run",
            Mode::Compile => "compile",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A composed compiler invocation.
///
/// `Display` renders the shell command line, joining non-empty segments with
/// single spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedCommand {
    /// Compiler executable.
    pub executable: PathBuf,
    /// Flags segment (configured flags or the quoted active document).
    pub flags: String,
    /// Whether the run marker is present.
    pub run: bool,
    /// Arguments segment (configured args or empty).
    pub args: String,
}

impl ComposedCommand {
    /// The full command line.
    pub fn command_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ComposedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.executable.display())?;

        let marker = if self.run { RUN_MARKER } else { "" };
        for segment in [self.flags.as_str(), marker, self.args.as_str()] {
            if !segment.is_empty() {
                write!(f, " {}", segment)?;
            }
        }
        Ok(())
    }
}

/// Builds compiler commands from settings, the active document and the
/// platform's compiler location.
pub struct CommandComposer<'a, S: Settings, E: Editor> {
    settings: &'a S,
    editor: &'a E,
    resolver: &'a PlatformResolver,
}

impl<'a, S: Settings, E: Editor> CommandComposer<'a, S, E> {
    pub fn new(settings: &'a S, editor: &'a E, resolver: &'a PlatformResolver) -> Self {
        Self {
            settings,
            editor,
            resolver,
        }
    }

    /// Configured flags, or the quoted active document path.
    ///
    /// With no active document the result is `""` (two quote characters),
    /// which tcc will reject in the terminal.
    pub fn resolve_flags(&self) -> String {
        self.settings
            .get(SettingKey::Flags)
            .unwrap_or_else(|| quoted_document(self.editor.active_document()))
    }

    /// Configured args, or nothing.
    pub fn resolve_args(&self) -> String {
        self.settings.get(SettingKey::Args).unwrap_or_default()
    }

    /// Compose the command for `mode`.
    ///
    /// Fails only when the platform is unsupported under the reject policy.
    pub fn build_command(&self, mode: Mode) -> Result<ComposedCommand> {
        Ok(ComposedCommand {
            executable: self.resolver.resolve_executable_path()?,
            flags: self.resolve_flags(),
            run: mode == Mode::Run,
            args: self.resolve_args(),
        })
    }
}

fn quoted_document(document: Option<PathBuf>) -> String {
    match document {
        Some(path) => format!("\"{}\"", path.display()),
        None => "\"\"".to_string(),
    }
}

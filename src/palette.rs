//! Line-oriented command palette.
//!
//! Each input line names one action. Actions run to completion before the
//! next line is read.

use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error};

use crate::compose::Mode;
use crate::dispatch::Dispatcher;
use crate::editor::EditorState;
use crate::settings::Settings;
use crate::terminal::TerminalHost;

/// A parsed palette action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteCommand {
    /// Compose and dispatch.
    Dispatch(Mode),
    /// Compose and print only.
    Print(Mode),
    /// Make a file the active document.
    Open(PathBuf),
    /// Clear the active document.
    Close,
    Help,
    Quit,
    /// Blank input.
    Nothing,
}

impl PaletteCommand {
    /// Parse one line of palette input.
    pub fn parse(line: &str) -> Result<Self, PaletteError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            "" => PaletteCommand::Nothing,
            "run" => PaletteCommand::Dispatch(Mode::Run),
            "compile" => PaletteCommand::Dispatch(Mode::Compile),
            "print" => match rest {
                "run" => PaletteCommand::Print(Mode::Run),
                "compile" | "" => PaletteCommand::Print(Mode::Compile),
                other => return Err(PaletteError::UnknownMode(other.to_string())),
            },
            "open" => {
                if rest.is_empty() {
                    return Err(PaletteError::MissingPath);
                }
                PaletteCommand::Open(PathBuf::from(unquote(rest)))
            }
            "close" => PaletteCommand::Close,
            "help" | "?" => PaletteCommand::Help,
            "quit" | "exit" => PaletteCommand::Quit,
            other => return Err(PaletteError::UnknownAction(other.to_string())),
        };

        if !rest.is_empty() && !matches!(command, PaletteCommand::Open(_) | PaletteCommand::Print(_))
        {
            return Err(PaletteError::UnexpectedInput(rest.to_string()));
        }

        Ok(command)
    }
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

/// Palette input errors.
#[derive(Debug, PartialEq, Eq)]
pub enum PaletteError {
    UnknownAction(String),
    UnknownMode(String),
    MissingPath,
    UnexpectedInput(String),
}

impl std::fmt::Display for PaletteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownAction(word) => {
                write!(f, "unknown action '{}' (try 'help')", word)
            }
            Self::UnknownMode(mode) => {
                write!(f, "cannot print '{}': expected 'run' or 'compile'", mode)
            }
            Self::MissingPath => write!(f, "open needs a file path"),
            Self::UnexpectedInput(rest) => write!(f, "unexpected input: '{}'", rest),
        }
    }
}

impl std::error::Error for PaletteError {}

const HELP: &str = "\
actions:
    run              compile and run the active file
    compile          compile the active file
    print [MODE]     show the command for 'run' or 'compile'
    open <FILE>      make FILE the active file
    close            clear the active file
    help             show this list
    quit             close the terminal and leave
";

/// Read actions from `input` until `quit` or EOF.
///
/// Prompts, previews and hints go to `out`; dispatched commands show up in
/// the terminal session itself. Action failures are logged and the loop
/// carries on.
pub async fn run_palette<H, S, I, O>(
    dispatcher: &mut Dispatcher<H, S, EditorState>,
    input: I,
    mut out: O,
) -> std::io::Result<()>
where
    H: TerminalHost,
    S: Settings,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        out.write_all(b"tcc> ").await?;
        out.flush().await?;

        let Some(line) = lines.next_line().await? else {
            debug!("palette input closed");
            break;
        };

        let command = match PaletteCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                out.write_all(format!("{}\n", e).as_bytes()).await?;
                continue;
            }
        };

        match command {
            PaletteCommand::Nothing => {}
            PaletteCommand::Dispatch(mode) => {
                if let Err(e) = dispatcher.dispatch(mode) {
                    error!("{} failed: {}", mode, e);
                }
            }
            PaletteCommand::Print(mode) => match dispatcher.preview(mode) {
                Ok(cmd) => out.write_all(format!("{}\n", cmd).as_bytes()).await?,
                Err(e) => error!("{} failed: {}", mode, e),
            },
            PaletteCommand::Open(path) => {
                if let Err(e) = dispatcher.editor_mut().open(&path) {
                    error!("cannot open {}: {}", path.display(), e);
                }
            }
            PaletteCommand::Close => {
                dispatcher.editor_mut().close();
            }
            PaletteCommand::Help => out.write_all(HELP.as_bytes()).await?,
            PaletteCommand::Quit => break,
        }
    }

    out.flush().await
}

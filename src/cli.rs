//! Command-line interface for tcc-runner.
//!
//! Uses lexopt for minimal binary size overhead (~34KB).

use std::ffi::OsString;
use std::path::PathBuf;

use crate::compose::Mode;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// One-shot action; `None` starts the interactive palette.
    pub action: Option<Mode>,
    /// Initial active document.
    pub file: Option<PathBuf>,
    /// Print the composed command instead of dispatching it.
    pub print: bool,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Flags override for this process.
    pub flags: Option<String>,
    /// Args override for this process.
    pub args: Option<String>,
    /// Platform identifier overriding detection.
    pub platform: Option<String>,
    /// Install directory of the bundled Windows compiler.
    pub install_dir: Option<PathBuf>,
    /// Fail instead of falling back on unsupported platforms.
    pub strict_platform: bool,
    /// Shell to run in the terminal session.
    pub shell: Option<String>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('n') | Long("print") => {
                result.print = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Long("flags") => {
                result.flags = Some(parser.value()?.parse()?);
            }
            Long("args") => {
                result.args = Some(parser.value()?.parse()?);
            }
            Long("platform") => {
                result.platform = Some(parser.value()?.parse()?);
            }
            Long("install-dir") => {
                result.install_dir = Some(parser.value()?.parse()?);
            }
            Long("strict-platform") => {
                result.strict_platform = true;
            }
            Short('s') | Long("shell") => {
                result.shell = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                let val: String = val.string()?;
                match val.as_str() {
                    "run" if result.action.is_none() && result.file.is_none() => {
                        result.action = Some(Mode::Run);
                    }
                    "compile" if result.action.is_none() && result.file.is_none() => {
                        result.action = Some(Mode::Compile);
                    }
                    _ if result.file.is_none() => {
                        result.file = Some(PathBuf::from(val));
                    }
                    _ => return Err(ArgsError::UnexpectedArgument(val)),
                }
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"tcc-runner {version}
Compose Tiny C Compiler commands and run them in a reusable shell session

USAGE:
    tcc-runner [OPTIONS] [run|compile] [FILE]

Without an action, an interactive palette reads actions from stdin
(run, compile, print, open <FILE>, close, help, quit).

OPTIONS:
    -n, --print             Print the composed command instead of running it
    -c, --config <FILE>     Path to settings/configuration file (JSON)
        --flags <FLAGS>     Compiler flags [default: the quoted active file]
        --args <ARGS>       Program arguments [default: none]
        --platform <ID>     Platform identifier (linux, win32, ...)
        --install-dir <DIR> Directory holding tcc-win32/tcc.exe
        --strict-platform   Fail on unsupported platforms instead of
                            falling back to the win32 layout
    -s, --shell <PATH>      Shell for the terminal session
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    TCC_RUNNER_FLAGS        Compiler flags (overrides settings file)
    TCC_RUNNER_ARGS         Program arguments (overrides settings file)
    TCC_RUNNER_INSTALL_DIR  Install directory (overrides config)
    TCC_RUNNER_SHELL        Session shell (overrides config)
    TCC_RUNNER_LOG_LEVEL    Log level (overrides config)
    RUST_LOG                Full tracing filter

EXAMPLES:
    # Compile and run hello.c once
    tcc-runner run hello.c

    # Show the command that would be used
    tcc-runner -n --flags -Wall --args "-o out" compile

    # Interactive palette with a settings file
    tcc-runner -c ~/.config/tcc-runner.json main.c
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("tcc-runner {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<OsString> {
        std::iter::once("tcc-runner")
            .chain(args.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn test_default_args() {
        let result = parse_args_from(args(&[])).unwrap();
        assert!(result.action.is_none());
        assert!(result.file.is_none());
        assert!(!result.print);
        assert!(!result.strict_platform);
    }

    #[test]
    fn test_action_and_file() {
        let result = parse_args_from(args(&["run", "hello.c"])).unwrap();
        assert_eq!(result.action, Some(Mode::Run));
        assert_eq!(result.file, Some(PathBuf::from("hello.c")));

        let result = parse_args_from(args(&["compile"])).unwrap();
        assert_eq!(result.action, Some(Mode::Compile));
        assert!(result.file.is_none());
    }

    #[test]
    fn test_file_only_starts_palette() {
        let result = parse_args_from(args(&["main.c"])).unwrap();
        assert!(result.action.is_none());
        assert_eq!(result.file, Some(PathBuf::from("main.c")));
    }

    #[test]
    fn test_file_named_like_action() {
        // After the file, nothing else is accepted.
        let result = parse_args_from(args(&["compile", "run"])).unwrap();
        assert_eq!(result.action, Some(Mode::Compile));
        assert_eq!(result.file, Some(PathBuf::from("run")));
    }

    #[test]
    fn test_flags_and_args() {
        let result =
            parse_args_from(args(&["--flags", "-Wall", "--args=-o out", "compile"])).unwrap();
        assert_eq!(result.flags, Some("-Wall".to_string()));
        assert_eq!(result.args, Some("-o out".to_string()));
    }

    #[test]
    fn test_platform_options() {
        let result = parse_args_from(args(&[
            "--platform",
            "darwin",
            "--install-dir",
            "/opt/tcc",
            "--strict-platform",
        ]))
        .unwrap();
        assert_eq!(result.platform, Some("darwin".to_string()));
        assert_eq!(result.install_dir, Some(PathBuf::from("/opt/tcc")));
        assert!(result.strict_platform);
    }

    #[test]
    fn test_help_flag() {
        assert!(parse_args_from(args(&["-h"])).unwrap().help);
        assert!(parse_args_from(args(&["--help"])).unwrap().help);
    }

    #[test]
    fn test_version_flag() {
        assert!(parse_args_from(args(&["-V"])).unwrap().version);
        assert!(parse_args_from(args(&["--version"])).unwrap().version);
    }

    #[test]
    fn test_too_many_positionals() {
        let result = parse_args_from(args(&["run", "a.c", "b.c"]));
        assert!(matches!(result, Err(ArgsError::UnexpectedArgument(ref a)) if a == "b.c"));
    }

    #[test]
    fn test_missing_value() {
        assert!(parse_args_from(args(&["--config"])).is_err());
    }

    #[test]
    fn test_unknown_option() {
        assert!(parse_args_from(args(&["--bogus"])).is_err());
    }
}

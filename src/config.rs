//! Configuration management for tcc-runner.
//!
//! Static configuration is loaded once at startup with the following
//! priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values
//!
//! The compiler `flags` and `args` live in the `tcc` section of the same
//! file but are read per invocation by [`crate::settings::UserSettings`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::platform::{Platform, PlatformResolver, UnsupportedPlatformPolicy};
use crate::settings::{SettingKey, UserSettings};
use crate::terminal::{default_shell, PtySize};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Platform and compiler layout.
    pub platform: PlatformSection,
    /// Terminal session settings.
    pub terminal: TerminalSection,
    /// Logging configuration.
    pub logging: LoggingSection,
    /// Settings file, remembered for per-invocation lookups.
    #[serde(skip)]
    pub settings_file: Option<PathBuf>,
}

/// Platform configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSection {
    /// Platform identifier overriding detection (`linux`, `win32`, ...).
    pub identifier: Option<String>,
    /// Directory holding the bundled Windows compiler.
    /// Defaults to the directory of the running binary.
    pub install_dir: Option<PathBuf>,
    /// What to do on platforms without a known compiler layout.
    pub unsupported: UnsupportedPlatformPolicy,
}

/// Terminal configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalSection {
    /// Shell to run in the session. Defaults to `$SHELL` or the platform shell.
    pub shell: Option<String>,
    /// PTY height.
    pub rows: u16,
    /// PTY width.
    pub cols: u16,
}

impl Default for TerminalSection {
    fn default() -> Self {
        let size = PtySize::default();
        Self {
            shell: None,
            rows: size.rows,
            cols: size.cols,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let mut config: Config = serde_json::from_str(&content).map_err(ConfigError::Json)?;
        config.settings_file = Some(path.to_path_buf());
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var("TCC_RUNNER_INSTALL_DIR") {
            if !dir.is_empty() {
                self.platform.install_dir = Some(PathBuf::from(dir));
            }
        }

        if let Ok(shell) = std::env::var("TCC_RUNNER_SHELL") {
            if !shell.is_empty() {
                self.terminal.shell = Some(shell);
            }
        }

        if let Ok(level) = std::env::var("TCC_RUNNER_LOG_LEVEL") {
            if !level.is_empty() {
                self.logging.level = level;
            }
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref id) = args.platform {
            self.platform.identifier = Some(id.clone());
        }

        if let Some(ref dir) = args.install_dir {
            self.platform.install_dir = Some(dir.clone());
        }

        if args.strict_platform {
            self.platform.unsupported = UnsupportedPlatformPolicy::Reject;
        }

        if let Some(ref shell) = args.shell {
            self.terminal.shell = Some(shell.clone());
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// The platform to resolve the compiler for.
    pub fn platform(&self) -> Platform {
        match self.platform.identifier {
            Some(ref id) => Platform::from_identifier(id),
            None => Platform::current(),
        }
    }

    /// The installation directory, defaulting to the binary's directory.
    pub fn install_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref dir) = self.platform.install_dir {
            return Ok(dir.clone());
        }

        let exe = std::env::current_exe().map_err(ConfigError::Io)?;
        exe.parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| ConfigError::InstallDir(exe.clone()))
    }

    /// Build the compiler path resolver.
    pub fn resolver(&self) -> Result<PlatformResolver, ConfigError> {
        Ok(PlatformResolver::new(self.platform(), self.install_dir()?)
            .with_policy(self.platform.unsupported))
    }

    /// Build the per-invocation settings source, including CLI overrides.
    pub fn user_settings(&self, args: &Args) -> UserSettings {
        let mut settings = UserSettings::new(self.settings_file.clone());
        if let Some(ref flags) = args.flags {
            settings = settings.with_override(SettingKey::Flags, flags.clone());
        }
        if let Some(ref extra) = args.args {
            settings = settings.with_override(SettingKey::Args, extra.clone());
        }
        settings
    }

    /// The shell to run in terminal sessions.
    pub fn shell(&self) -> String {
        self.terminal.shell.clone().unwrap_or_else(default_shell)
    }

    /// Size of the session's PTY.
    pub fn pty_size(&self) -> PtySize {
        PtySize::new(self.terminal.rows, self.terminal.cols)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Install directory could not be derived from the binary path.
    InstallDir(PathBuf),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InstallDir(exe) => {
                write!(f, "cannot derive install directory from {}", exe.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for crate::TccRunnerError {
    fn from(e: ConfigError) -> Self {
        crate::TccRunnerError::Config(e.to_string())
    }
}

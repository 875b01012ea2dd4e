//! Platform detection and compiler executable resolution.
//!
//! Only two compiler layouts are known: the system package on Linux and the
//! bundled Windows build shipped next to the runner.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::TccRunnerError;
use crate::Result;

/// System-wide compiler location on Linux, relative to the filesystem root.
pub const LINUX_TCC_PATH: &str = "usr/bin/tcc";

/// Bundled compiler location on Windows, relative to the install directory.
pub const WIN32_TCC_PATH: &str = "/tcc-win32/tcc.exe";

/// Host platform, as far as compiler layout is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    Win32,
    /// Any other platform, carrying its identifier for diagnostics.
    Unsupported(String),
}

impl Platform {
    /// Detect the platform this binary is running on.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "linux" => Platform::Linux,
            "windows" => Platform::Win32,
            other => Platform::Unsupported(other.to_string()),
        }
    }

    /// Map a platform identifier (`linux`, `win32`, `darwin`, ...) to a platform.
    ///
    /// `windows` is accepted as an alias for `win32`.
    pub fn from_identifier(id: &str) -> Self {
        match id.trim().to_ascii_lowercase().as_str() {
            "linux" => Platform::Linux,
            "win32" | "windows" => Platform::Win32,
            _ => Platform::Unsupported(id.trim().to_string()),
        }
    }

    /// The identifier of this platform.
    pub fn identifier(&self) -> &str {
        match self {
            Platform::Linux => "linux",
            Platform::Win32 => "win32",
            Platform::Unsupported(id) => id,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// What to do when the platform has no known compiler layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsupportedPlatformPolicy {
    /// Log the problem and use the Windows layout anyway.
    #[default]
    Fallback,
    /// Fail with [`TccRunnerError::UnsupportedPlatform`].
    Reject,
}

/// Resolves the compiler executable for a platform.
#[derive(Debug, Clone)]
pub struct PlatformResolver {
    platform: Platform,
    install_dir: PathBuf,
    policy: UnsupportedPlatformPolicy,
}

impl PlatformResolver {
    /// Create a resolver for the given platform and install directory.
    pub fn new(platform: Platform, install_dir: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            install_dir: install_dir.into(),
            policy: UnsupportedPlatformPolicy::default(),
        }
    }

    /// Set the unsupported-platform policy.
    pub fn with_policy(mut self, policy: UnsupportedPlatformPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// Resolve the compiler executable path.
    ///
    /// Pure lookup: the returned path is not checked for existence.
    pub fn resolve_executable_path(&self) -> Result<PathBuf> {
        let path = match &self.platform {
            Platform::Linux => join_normalized(Path::new("/"), LINUX_TCC_PATH),
            Platform::Win32 => join_normalized(&self.install_dir, WIN32_TCC_PATH),
            Platform::Unsupported(id) => match self.policy {
                UnsupportedPlatformPolicy::Fallback => {
                    error!("platform {} not supported, using win32 layout", id);
                    join_normalized(&self.install_dir, WIN32_TCC_PATH)
                }
                UnsupportedPlatformPolicy::Reject => {
                    error!("platform {} not supported", id);
                    return Err(TccRunnerError::UnsupportedPlatform(id.clone()));
                }
            },
        };

        debug!(platform = %self.platform, path = %path.display(), "resolved compiler");
        Ok(path)
    }
}

/// Join `relative` onto `base` the way a path-join that normalizes leading
/// separators does: `join("/opt/x", "/a/b")` is `/opt/x/a/b`, not `/a/b`.
fn join_normalized(base: &Path, relative: &str) -> PathBuf {
    relative
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != ".")
        .fold(base.to_path_buf(), |path, part| path.join(part))
}

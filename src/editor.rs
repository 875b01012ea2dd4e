//! Active document tracking.

use std::path::{Path, PathBuf};

use tracing::info;

/// Source of the document currently in focus.
pub trait Editor {
    /// Absolute path of the active document, if one is open.
    fn active_document(&self) -> Option<PathBuf>;
}

/// Minimal editor state: at most one active document.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    active: Option<PathBuf>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state with `path` already open.
    pub fn with_document(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let mut state = Self::new();
        state.open(path)?;
        Ok(state)
    }

    /// Make `path` the active document.
    ///
    /// Relative paths are resolved against the current working directory.
    /// The file does not have to exist.
    pub fn open(&mut self, path: impl AsRef<Path>) -> std::io::Result<&Path> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        info!("active document: {}", absolute.display());
        let active = self.active.insert(absolute);
        Ok(active.as_path())
    }

    /// Clear the active document.
    pub fn close(&mut self) -> Option<PathBuf> {
        self.active.take()
    }
}

impl Editor for EditorState {
    fn active_document(&self) -> Option<PathBuf> {
        self.active.clone()
    }
}

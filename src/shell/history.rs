//! Shell history persisted as a plain line file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{KtrlError, Result};

/// Command history, optionally backed by a file rotated to `max_lines`.
#[derive(Debug, Clone)]
pub struct History {
    path: Option<PathBuf>,
    max_lines: usize,
    lines: Vec<String>,
}

impl History {
    /// History kept in memory only.
    #[must_use]
    pub fn in_memory(max_lines: usize) -> Self {
        Self {
            path: None,
            max_lines,
            lines: Vec::new(),
        }
    }

    /// Load history from `path`, creating its directory when missing.
    ///
    /// # Errors
    ///
    /// Returns `KtrlError::Io` if the directory cannot be created or an
    /// existing file cannot be read.
    pub fn open(path: impl AsRef<Path>, max_lines: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|err| {
                KtrlError::Io(format!("failed to create {}: {err}", dir.display()))
            })?;
        }

        let lines = match fs::read_to_string(&path) {
            Ok(raw) => raw
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect(),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                return Err(KtrlError::Io(format!(
                    "failed to read history {}: {err}",
                    path.display()
                )))
            }
        };

        let mut history = Self {
            path: Some(path),
            max_lines,
            lines,
        };
        history.rotate();
        debug!(entries = history.lines.len(), "history loaded");
        Ok(history)
    }

    /// History backed by `path` when given and usable, in memory otherwise.
    ///
    /// A file that cannot be opened is logged at `warn`; the shell keeps
    /// running without persistence.
    #[must_use]
    pub fn open_or_in_memory(path: Option<&Path>, max_lines: usize) -> Self {
        let Some(path) = path else {
            return Self::in_memory(max_lines);
        };
        Self::open(path, max_lines).unwrap_or_else(|err| {
            warn!(%err, path = %path.display(), "history file unavailable; keeping history in memory");
            Self::in_memory(max_lines)
        })
    }

    /// Whether entries are written to a file.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.path.is_some()
    }

    /// Record `line`. Blank lines and repeats of the previous entry are
    /// ignored; returns whether the line was recorded.
    pub fn push(&mut self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() || self.lines.last().is_some_and(|last| last == line) {
            return false;
        }
        self.lines.push(line.to_owned());
        self.rotate();
        true
    }

    /// Entries, oldest first.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Write the retained entries to the history file, if any.
    ///
    /// # Errors
    ///
    /// Returns `KtrlError::Io` if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut raw = self.lines.join("\n");
        raw.push('\n');
        fs::write(path, raw)
            .map_err(|err| KtrlError::Io(format!("failed to write history {}: {err}", path.display())))
    }

    fn rotate(&mut self) {
        if self.lines.len() > self.max_lines {
            let excess = self.lines.len() - self.max_lines;
            self.lines.drain(..excess);
        }
    }
}

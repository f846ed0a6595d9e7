//! Executable lookup for program sub-configurations.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::SearchConfig;

/// Locates configuration programs on the executable search path and in the
/// fcitx binary directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramLocator {
    search_path: Vec<PathBuf>,
    bin_dir: Option<PathBuf>,
}

impl ProgramLocator {
    /// Creates a locator over `search_path` with an optional fallback
    /// binary directory.
    pub fn new(search_path: Vec<PathBuf>, bin_dir: Option<PathBuf>) -> Self {
        Self {
            search_path,
            bin_dir,
        }
    }

    /// Uses `$PATH` and the fcitx binary directory from `config`.
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.executable_path.clone(), Some(config.bin_dir.clone()))
    }

    /// Resolves `program` to an absolute executable path.
    ///
    /// Absolute names are taken as is. Other names are looked up on the
    /// search path first and in the binary directory second. Returns `None`
    /// unless the candidate is an existing executable file.
    pub fn locate(&self, program: &str) -> Option<PathBuf> {
        if program.is_empty() {
            return None;
        }

        let candidate = if program.starts_with('/') {
            Some(PathBuf::from(program))
        } else {
            self.find_on_search_path(program)
                .or_else(|| self.bin_dir.as_ref().map(|dir| dir.join(program)))
        };

        let resolved = candidate.filter(|path| is_executable(path));
        if resolved.is_none() {
            debug!(%program, "configuration program not found");
        }

        resolved
    }

    fn find_on_search_path(&self, program: &str) -> Option<PathBuf> {
        self.search_path
            .iter()
            .filter(|dir| dir.is_absolute())
            .map(|dir| dir.join(program))
            .find(|path| is_executable(path))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .is_ok_and(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|metadata| metadata.is_file())
}

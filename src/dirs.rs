use crate::error::{Error, Result};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project directories plus the lazily selected install prefix.
pub struct Dirs {
    project: PathBuf,
    system_prefix: PathBuf,
    local: OnceCell<PathBuf>,
}

impl Dirs {
    pub fn new(project: impl Into<PathBuf>, system_prefix: impl Into<PathBuf>) -> Self {
        Self {
            project: project.into(),
            system_prefix: system_prefix.into(),
            local: OnceCell::new(),
        }
    }

    pub fn project(&self) -> &Path {
        &self.project
    }

    /// Where generated binaries of the project itself are placed.
    pub fn bin(&self) -> PathBuf {
        self.project.join("bin")
    }

    /// The install prefix for tools. Selected on first use and cached for the process.
    pub fn local(&self) -> Result<&Path> {
        self.local
            .get_or_try_init(|| {
                let local = select_local(&self.project, &self.system_prefix, is_writable)?;
                debug!(local = %local.display(), "selected local install prefix");
                Ok(local)
            })
            .map(PathBuf::as_path)
    }

    pub fn local_bin(&self) -> Result<PathBuf> {
        Ok(self.local()?.join("bin"))
    }

    pub fn local_lib(&self) -> Result<PathBuf> {
        Ok(self.local()?.join("lib"))
    }

    #[cfg(test)]
    pub fn with_local(project: impl Into<PathBuf>, local: impl Into<PathBuf>) -> Self {
        let dirs = Self::new(project, "/nonexistent");
        let _ = dirs.local.set(local.into());
        dirs
    }
}

/// Prefix selection policy:
/// 1. `<project>/../.local` when it exists or the project parent is writable;
/// 2. the system prefix when it exists and the project is writable;
/// 3. otherwise a configuration error.
pub fn select_local(
    project: &Path,
    system_prefix: &Path,
    writable: impl Fn(&Path) -> bool,
) -> Result<PathBuf> {
    if let Some(parent) = project.parent() {
        let local = parent.join(".local");
        if local.exists() || writable(parent) {
            return Ok(local);
        }
    }
    if system_prefix.exists() && writable(project) {
        return Ok(system_prefix.to_path_buf());
    }
    Err(Error::config("failed to select a suitable local directory"))
}

/// Probes by creating a temporary file, so ownership and ACLs are honoured.
fn is_writable(dir: &Path) -> bool {
    tempfile::tempfile_in(dir).is_ok()
}

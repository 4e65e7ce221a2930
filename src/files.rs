use crate::error::Result;
use fs_err as fs;
use std::path::Path;
use tracing::debug;

pub fn ensure_dir(p: &Path) -> Result<()> {
    fs::create_dir_all(p)?;
    Ok(())
}

/// Moves a file, falling back to copy and remove when `from` and `to` are on different
/// filesystems.
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    debug!(from = %from.display(), to = %to.display(), "rename failed, copying");
    fs::copy(from, to)?;
    fs::remove_file(from)?;
    Ok(())
}

use crate::error::{Error, Result};
use flate2::read::GzDecoder;
use fs_err as fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};
use zip::ZipArchive;

/// Unpacks a `.tar.gz` into `dest`, dropping the first `strip` path components of every entry.
pub fn extract_tar_gz(archive: &Path, dest: &Path, strip: usize) -> Result<()> {
    let file = fs::File::open(archive)?;
    let mut tar = Archive::new(GzDecoder::new(file));
    tar.set_preserve_permissions(true);
    tar.set_overwrite(true);
    for entry in tar.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();
        let rel: PathBuf = path.components().skip(strip).collect();
        if rel.as_os_str().is_empty() {
            continue;
        }
        let target = dest.join(checked(&rel)?);
        if matches!(entry.header().entry_type(), EntryType::Symlink | EntryType::Link) {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("archive entry '{}' is a link", rel.display()),
            )));
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        entry.unpack(&target)?;
    }
    Ok(())
}

/// Unpacks a `.zip` into `dest`, overwriting existing files and keeping unix modes.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    let zip_err = |source| Error::Archive {
        path: archive.to_path_buf(),
        source,
    };
    let file = fs::File::open(archive)?;
    let mut zip = ZipArchive::new(file).map_err(zip_err)?;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(zip_err)?;
        let Some(rel) = entry.enclosed_name().map(Path::to_path_buf) else {
            return Err(unsafe_path(Path::new(entry.name())));
        };
        let target = dest.join(rel);
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&target, std::fs::Permissions::from_mode(mode & 0o7777))?;
        }
    }
    Ok(())
}

fn checked(rel: &Path) -> Result<&Path> {
    if rel.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir)) {
        Ok(rel)
    } else {
        Err(unsafe_path(rel))
    }
}

fn unsafe_path(path: &Path) -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("archive entry '{}' escapes the destination", path.display()),
    ))
}

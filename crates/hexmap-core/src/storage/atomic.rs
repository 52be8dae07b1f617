use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Error, Result};

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Path of the backup copy kept next to `path` (`<name>.bak`).
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

fn write_temp(path: &Path, content: &[u8]) -> Result<NamedTempFile> {
    let mut temp = NamedTempFile::new_in(parent_dir(path))?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    Ok(temp)
}

fn persist(temp: NamedTempFile, path: &Path) -> Result<()> {
    temp.persist(path).map_err(|e| Error::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

/// Write `content` to `path` through a temp file in the same directory.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let temp = write_temp(path, content)?;
    persist(temp, path)
}

/// Replace an existing file with `content`, keeping its permissions.
///
/// When `backup` is set the previous content is copied to `<name>.bak`
/// before the swap. Returns the backup path if one was written. On any error
/// the temp file is dropped and the original is left as it was.
pub fn replace_file(path: &Path, content: &[u8], backup: bool) -> Result<Option<PathBuf>> {
    let permissions = fs::metadata(path)?.permissions();

    let temp = write_temp(path, content)?;
    fs::set_permissions(temp.path(), permissions)?;

    let backup_file = if backup {
        let target = backup_path(path);
        fs::copy(path, &target)?;
        debug!("Backed up {} to {}", path.display(), target.display());
        Some(target)
    } else {
        None
    };

    persist(temp, path)?;
    Ok(backup_file)
}

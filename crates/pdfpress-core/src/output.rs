//! Writing finished documents to disk

use crate::error::PdfPressError;
use std::io::Write;
use std::path::Path;

/// Write `bytes` to `path` through a temporary file in the same directory,
/// so that an existing file is only replaced once the new one is complete.
///
/// A replaced file keeps its permissions; a new one gets the mode
/// `std::fs::write` would give it (0666 less the umask).
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), PdfPressError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    #[cfg_attr(not(unix), allow(unused_mut))]
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder
        .tempfile_in(dir)
        .map_err(|e| PdfPressError::io(dir, e))?;
    if let Ok(existing) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(|e| PdfPressError::io(tmp.path(), e))?;
    }
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| PdfPressError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| PdfPressError::io(path, e.error))?;

    Ok(())
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>, PdfPressError> {
    std::fs::read(path).map_err(|e| PdfPressError::io(path, e))
}

/// Case-insensitive extension check
pub(crate) fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

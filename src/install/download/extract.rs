//! Binary extraction from release tarballs.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tar::{Archive, EntryType};

use crate::install::error::InstallerError;

/// Extract the regular file named `binary` from a `.tar.gz` into `dest_dir`.
///
/// Only that one entry is written, whatever directory it sits in inside the
/// archive. It is staged in a temporary file next to its destination and
/// renamed into place, so an interrupted extraction never leaves a truncated
/// binary behind.
pub fn extract_binary(
    archive: &Path,
    binary: &str,
    dest_dir: &Path,
) -> Result<PathBuf, InstallerError> {
    let fail = |message: String| InstallerError::Extract {
        archive: archive.to_path_buf(),
        message,
    };

    let file = File::open(archive).map_err(|e| fail(e.to_string()))?;
    let mut reader = Archive::new(GzDecoder::new(file));

    for entry in reader.entries().map_err(|e| fail(e.to_string()))? {
        let mut entry = entry.map_err(|e| fail(e.to_string()))?;
        if entry.header().entry_type() != EntryType::Regular {
            continue;
        }
        let matches = entry
            .path()
            .map_err(|e| fail(e.to_string()))?
            .file_name()
            .is_some_and(|name| name == binary);
        if !matches {
            continue;
        }

        let mut staged =
            tempfile::NamedTempFile::new_in(dest_dir).map_err(|e| fail(e.to_string()))?;
        io::copy(&mut entry, staged.as_file_mut()).map_err(|e| fail(e.to_string()))?;
        staged.as_file().sync_all().map_err(|e| fail(e.to_string()))?;

        let final_path = dest_dir.join(binary);
        staged
            .persist(&final_path)
            .map_err(|e| fail(format!("Failed to move binary into place: {}", e.error)))?;
        return Ok(final_path);
    }

    Err(fail(format!("Binary {binary} not found in archive")))
}

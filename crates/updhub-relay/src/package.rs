//! Executable repackaging.
//!
//! Bare `.exe` payloads are wrapped in a single-entry deflate zip before
//! delivery — the transfer destination rejects raw executables.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::RelayError;

/// Wrap `payload` in a zip archive containing a single entry named
/// `entry_name`.
pub fn package_executable(entry_name: &str, payload: &[u8]) -> Result<Vec<u8>, RelayError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer
        .start_file(entry_name, options)
        .map_err(|e| RelayError::Packaging {
            reason: format!("zip entry {entry_name}: {e}"),
        })?;
    writer.write_all(payload).map_err(|e| RelayError::Packaging {
        reason: format!("zip write: {e}"),
    })?;

    let cursor = writer.finish().map_err(|e| RelayError::Packaging {
        reason: format!("zip finish: {e}"),
    })?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn archive_holds_exactly_the_original_payload() {
        let payload = b"MZ\x90\x00 fake executable bytes".to_vec();
        let archived = package_executable("relatorio_folha.exe", &payload).unwrap();

        let mut zip = zip::ZipArchive::new(Cursor::new(archived)).unwrap();
        assert_eq!(zip.len(), 1);

        let mut entry = zip.by_index(0).unwrap();
        assert_eq!(entry.name(), "relatorio_folha.exe");

        let mut restored = Vec::new();
        entry.read_to_end(&mut restored).unwrap();
        assert_eq!(restored, payload);
    }

    #[test]
    fn empty_payload_packages_cleanly() {
        let archived = package_executable("vazio.exe", &[]).unwrap();
        let zip = zip::ZipArchive::new(Cursor::new(archived)).unwrap();
        assert_eq!(zip.len(), 1);
    }
}

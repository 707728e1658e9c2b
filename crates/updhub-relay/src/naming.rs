//! Artifact naming: slot guards and timestamped renames.
//!
//! Uploaded files are renamed to a canonical, timestamped form before
//! delivery. The client-side timestamp (milliseconds since epoch) yields
//! both the filename suffix (`.YYYY.MM.DD.HH.MM.SS`) and the version
//! label (`YYYY.MM.DD.HH:MM:SS`), both in UTC.

use chrono::DateTime;

use updhub_core::ModuleKey;

use crate::RelayError;

/// The derived canonical identity of an uploaded artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactName {
    /// Final (lowercased) filename to store on the transfer destination.
    pub filename: String,
    /// Version label recorded in the ledger for this artifact.
    pub version: String,
    /// True when the payload must be repackaged into a zip archive
    /// (the original was a bare `.exe`).
    pub repackage: bool,
}

/// Reject an upload whose original filename does not belong in the given
/// module slot. The check is case-insensitive substring containment on
/// the module's name markers.
pub fn validate_slot_name(module: ModuleKey, original: &str) -> Result<(), RelayError> {
    let lowered = original.to_lowercase();
    if module
        .name_markers()
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        Ok(())
    } else {
        Err(RelayError::NameMismatch {
            module,
            filename: original.to_string(),
        })
    }
}

/// Derive the canonical artifact name from the original filename and the
/// client-side upload timestamp.
///
/// Bare executables are flagged for zip repackaging and take a `.zip`
/// extension; any other extension is preserved. The whole filename is
/// lowercased.
pub fn derive_name(original: &str, client_timestamp_millis: i64) -> Result<ArtifactName, RelayError> {
    let when = DateTime::from_timestamp_millis(client_timestamp_millis).ok_or(
        RelayError::BadTimestamp {
            millis: client_timestamp_millis,
        },
    )?;

    let suffix = when.format(".%Y.%m.%d.%H.%M.%S").to_string();
    let version = when.format("%Y.%m.%d.%H:%M:%S").to_string();

    let (base, ext) = split_extension(original);
    let repackage = ext.eq_ignore_ascii_case(".exe");
    let final_ext = if repackage { ".zip" } else { ext };

    Ok(ArtifactName {
        filename: format!("{base}{suffix}{final_ext}").to_lowercase(),
        version,
        repackage,
    })
}

/// Split `name.ext` at the last dot. A name without a dot (or a leading
/// dot only) has an empty extension.
fn split_extension(original: &str) -> (&str, &str) {
    match original.rfind('.') {
        Some(idx) if idx > 0 => original.split_at(idx),
        _ => (original, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2023-11-14T22:13:20Z
    const TS: i64 = 1_700_000_000_000;

    #[test]
    fn payroll_executable_becomes_timestamped_zip() {
        let name = derive_name("Relatorio_FOLHA.exe", TS).unwrap();
        assert_eq!(name.filename, "relatorio_folha.2023.11.14.22.13.20.zip");
        assert_eq!(name.version, "2023.11.14.22:13:20");
        assert!(name.repackage);
    }

    #[test]
    fn non_executable_keeps_its_extension() {
        let name = derive_name("Fiscal_Tabelas.DAT", TS).unwrap();
        assert_eq!(name.filename, "fiscal_tabelas.2023.11.14.22.13.20.dat");
        assert!(!name.repackage);
    }

    #[test]
    fn extensionless_name_gets_suffix_only() {
        let name = derive_name("contabil", TS).unwrap();
        assert_eq!(name.filename, "contabil.2023.11.14.22.13.20");
        assert!(!name.repackage);
    }

    #[test]
    fn out_of_range_timestamp_is_rejected() {
        let err = derive_name("folha.exe", i64::MAX).unwrap_err();
        assert!(matches!(err, RelayError::BadTimestamp { millis: i64::MAX }));
    }

    #[test]
    fn slot_guard_matches_case_insensitively() {
        assert!(validate_slot_name(ModuleKey::Payroll, "Relatorio_FOLHA.exe").is_ok());
        assert!(validate_slot_name(ModuleKey::Fiscal, "atualiza_fiscal.exe").is_ok());
        assert!(validate_slot_name(ModuleKey::Accounting, "Contabil_2023.exe").is_ok());
    }

    #[test]
    fn slot_guard_accepts_accented_accounting_name() {
        assert!(validate_slot_name(ModuleKey::Accounting, "Módulo_Contábil.exe").is_ok());
    }

    #[test]
    fn wrong_slot_is_rejected() {
        let err = validate_slot_name(ModuleKey::Fiscal, "dados.txt").unwrap_err();
        match err {
            RelayError::NameMismatch { module, filename } => {
                assert_eq!(module, ModuleKey::Fiscal);
                assert_eq!(filename, "dados.txt");
            }
            other => panic!("expected NameMismatch, got: {other:?}"),
        }
    }
}

//! # Software Module Keys & Release State
//!
//! The service tracks exactly three software modules per client
//! installation: payroll ("folha"), fiscal, and accounting ("contabil").
//! The legacy Portuguese names survive on the wire and in artifact
//! filenames; code uses the English variants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three software modules tracked for authorization and
/// version publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKey {
    /// Payroll module ("folha").
    Payroll,
    /// Fiscal module.
    Fiscal,
    /// Accounting module ("contabil").
    Accounting,
}

impl ModuleKey {
    /// All module keys, in canonical order.
    pub const ALL: [ModuleKey; 3] = [Self::Payroll, Self::Fiscal, Self::Accounting];

    /// Legacy wire name of this module.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payroll => "folha",
            Self::Fiscal => "fiscal",
            Self::Accounting => "contabil",
        }
    }

    /// Substrings that must appear (case-insensitively) in an uploaded
    /// artifact's original filename for it to be accepted into this
    /// module's slot. Guards against an admin uploading the wrong file
    /// into the wrong slot.
    ///
    /// Accounting accepts both the accented and unaccented spellings,
    /// since upload filenames come from end-user machines.
    pub fn name_markers(&self) -> &'static [&'static str] {
        match self {
            Self::Payroll => &["folha"],
            Self::Fiscal => &["fiscal"],
            Self::Accounting => &["contabil", "contábil"],
        }
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One module's published state: a version label and the artifact
/// filename that carries it. The two are always published together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRelease {
    /// Human-readable version label, e.g. `2023.11.14.22:13:20`.
    pub version: String,
    /// Artifact filename as stored on the transfer destination,
    /// e.g. `relatorio_folha.2023.11.14.22.13.20.zip`.
    pub artifact: String,
}

impl ModuleRelease {
    pub fn new(version: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            artifact: artifact.into(),
        }
    }
}

/// Published release state for all three modules.
///
/// A `None` slot means that module has never been published. A first-ever
/// publish touching only some modules leaves the others `None` — there is
/// no sentinel defaulting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSnapshot {
    pub payroll: Option<ModuleRelease>,
    pub fiscal: Option<ModuleRelease>,
    pub accounting: Option<ModuleRelease>,
}

impl ReleaseSnapshot {
    /// Snapshot with no module ever published.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Release state for one module.
    pub fn get(&self, key: ModuleKey) -> Option<&ModuleRelease> {
        match key {
            ModuleKey::Payroll => self.payroll.as_ref(),
            ModuleKey::Fiscal => self.fiscal.as_ref(),
            ModuleKey::Accounting => self.accounting.as_ref(),
        }
    }

    /// Replace one module's release state.
    pub fn set(&mut self, key: ModuleKey, release: Option<ModuleRelease>) {
        match key {
            ModuleKey::Payroll => self.payroll = release,
            ModuleKey::Fiscal => self.fiscal = release,
            ModuleKey::Accounting => self.accounting = release,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_covers_every_key_once() {
        assert_eq!(ModuleKey::ALL.len(), 3);
        let mut keys: Vec<_> = ModuleKey::ALL.to_vec();
        keys.dedup();
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn wire_names_are_legacy_portuguese() {
        assert_eq!(ModuleKey::Payroll.as_str(), "folha");
        assert_eq!(ModuleKey::Fiscal.as_str(), "fiscal");
        assert_eq!(ModuleKey::Accounting.as_str(), "contabil");
    }

    #[test]
    fn accounting_markers_accept_both_spellings() {
        let markers = ModuleKey::Accounting.name_markers();
        assert!(markers.contains(&"contabil"));
        assert!(markers.contains(&"contábil"));
    }

    #[test]
    fn snapshot_get_set_round_trip() {
        let mut snap = ReleaseSnapshot::empty();
        assert!(snap.get(ModuleKey::Fiscal).is_none());

        let rel = ModuleRelease::new("2023.11.14.22:13:20", "fiscal.2023.11.14.22.13.20.zip");
        snap.set(ModuleKey::Fiscal, Some(rel.clone()));

        assert_eq!(snap.get(ModuleKey::Fiscal), Some(&rel));
        assert!(snap.get(ModuleKey::Payroll).is_none());
        assert!(snap.get(ModuleKey::Accounting).is_none());
    }
}

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// An identifier for a license under some naming scheme (`SPDX`, `Trove`, `DEP5`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub scheme: String,
    pub identifier: String,
}

/// A canonical license entry from the reference corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub canonical_id: String,
    pub display_name: String,
    /// Free-form names known to refer to this license, in corpus order.
    pub alias_names: Vec<String>,
    pub identifiers: Vec<Identifier>,
    /// Reference text, when the corpus ships one for this id.
    pub reference_text: Option<String>,
}

impl LicenseRecord {
    /// Every string this record answers to: display name, canonical id, then aliases.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.display_name.as_str())
            .chain(std::iter::once(self.canonical_id.as_str()))
            .chain(self.alias_names.iter().map(String::as_str))
            .filter(|name| !name.is_empty())
    }

    /// The identifier registered under `scheme`, compared case-insensitively.
    pub fn identifier_for(&self, scheme: &str) -> Option<&str> {
        self.identifiers
            .iter()
            .find(|i| i.scheme.eq_ignore_ascii_case(scheme))
            .map(|i| i.identifier.as_str())
    }
}

/// Outcome of a successful discovery stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortLicense {
    /// Canonical (or caller-supplied default) license identifier.
    pub name: String,
    /// Where the license text lives. Relative to the search root for packaged licenses.
    pub location: PathBuf,
    /// `true` only when the file ships inside the searched local folder.
    pub is_packaged: bool,
}

impl ShortLicense {
    pub fn new(name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            is_packaged: false,
        }
    }

    pub fn source(&self) -> LicenseSource {
        if self.is_packaged {
            LicenseSource::Packaged
        } else {
            LicenseSource::External
        }
    }
}

/// Whether a discovered license travels with the project sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseSource {
    Packaged,
    External,
}

impl std::fmt::Display for LicenseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseSource::Packaged => write!(f, "packaged"),
            LicenseSource::External => write!(f, "external"),
        }
    }
}

//! Snippet discovery and bundling.
//!
//! The loader pulls the scheme region out of every provider file; the bundle
//! builder deduplicates, cleans and writes the survivors.

pub mod bundle;
pub mod loader;

use std::collections::BTreeSet;

/// One discovered provider snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorRecord {
    /// Provider name, taken from the file name up to its first `.`.
    pub name: String,
    /// Raw text between the scheme markers.
    pub snippet: String,
}

impl ExtractorRecord {
    pub fn new(name: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            snippet: snippet.into(),
        }
    }
}

/// Provider names permitted in a build pass. Empty means unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderFilter(BTreeSet<String>);

impl ProviderFilter {
    /// A filter that admits every provider.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether `name` may be built under this filter.
    pub fn admits(&self, name: &str) -> bool {
        self.0.is_empty() || self.0.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ProviderFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

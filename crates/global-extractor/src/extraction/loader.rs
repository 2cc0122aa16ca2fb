//! Load provider snippets from the extractor directory.

use super::{ExtractorRecord, ProviderFilter};
use crate::config::MarkerPair;
use crate::error::{BuildError, Result};
use crate::region;
use std::fs::DirEntry;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Scans a directory for snippet files and pulls out their scheme regions.
pub struct SnippetLoader<'a> {
    dir: &'a Path,
    extension: &'a str,
    markers: &'a MarkerPair,
}

impl<'a> SnippetLoader<'a> {
    pub fn new(dir: &'a Path, extension: &'a str, markers: &'a MarkerPair) -> Self {
        Self {
            dir,
            extension,
            markers,
        }
    }

    /// Every file carrying a scheme region and admitted by `filter`.
    ///
    /// Repeated provider names (`voe.js` next to `voe.old.js`) are all kept;
    /// the bundle builder decides what to do with them.
    pub fn load(&self, filter: &ProviderFilter) -> Result<Vec<ExtractorRecord>> {
        let suffix = format!(".{}", self.extension);
        let mut records = Vec::new();

        debug!("scanning {} for *{suffix} snippets", self.dir.display());

        for (file_name, path) in self.candidates(&suffix)? {
            let content = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    warn!("skipping unreadable snippet {}: {e}", path.display());
                    continue;
                }
            };

            let Some(snippet) = region::extract_region(&content, &self.markers.start, &self.markers.end)
            else {
                debug!("{file_name} has no scheme markers, skipping");
                continue;
            };

            let name = provider_name(&file_name);
            if !filter.admits(name) {
                debug!("{name} is not in the allowed providers list, skipping");
                continue;
            }

            records.push(ExtractorRecord::new(name, snippet));
        }

        info!("{} extractor snippets found", records.len());
        Ok(records)
    }

    /// Files in the directory ending with `suffix`, ordered by file name.
    fn candidates(&self, suffix: &str) -> Result<Vec<(String, PathBuf)>> {
        let entries = std::fs::read_dir(self.dir).map_err(|source| BuildError::ReadDir {
            path: self.dir.to_path_buf(),
            source,
        })?;

        let mut files: Vec<(String, PathBuf)> = entries
            .filter_map(|entry| readable_entry(self.dir, entry))
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let file_name = entry.file_name().to_string_lossy().into_owned();
                file_name
                    .ends_with(suffix)
                    .then(|| (file_name, entry.path()))
            })
            .collect();
        files.sort();
        Ok(files)
    }
}

/// Unwrap a directory entry, logging the ones that cannot be read.
fn readable_entry(dir: &Path, entry: std::io::Result<DirEntry>) -> Option<DirEntry> {
    match entry {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!("skipping unreadable entry in {}: {e}", dir.display());
            None
        }
    }
}

/// Provider name for a snippet file: everything before the first `.`.
pub fn provider_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Markers;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn scheme(body: &str) -> String {
        format!("prelude();\n/* SCHEME START */{body}/* SCHEME END */\n")
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(provider_name("voe.js"), "voe");
        assert_eq!(provider_name("voe.old.js"), "voe");
        assert_eq!(provider_name("noext"), "noext");
    }

    #[test]
    fn test_load_extracts_scheme_regions() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "voe.js", &scheme("\nfunction voeExtractor() {}\n"));
        write(dir.path(), "vidoza.js", &scheme("\nfunction vidozaExtractor() {}\n"));

        let markers = Markers::default();
        let loader = SnippetLoader::new(dir.path(), "js", &markers.scheme);
        let records = loader.load(&ProviderFilter::unrestricted()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "vidoza");
        assert_eq!(records[1].name, "voe");
        assert_eq!(records[1].snippet, "\nfunction voeExtractor() {}\n");
    }

    #[test]
    fn test_load_skips_files_without_markers_and_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "voe.js", &scheme("voe"));
        write(dir.path(), "plain.js", "function plain() {}\n");
        write(dir.path(), "half.js", "/* SCHEME START */ never closed");
        write(dir.path(), "notes.txt", &scheme("not javascript"));
        std::fs::create_dir(dir.path().join("nested.js")).unwrap();

        let markers = Markers::default();
        let loader = SnippetLoader::new(dir.path(), "js", &markers.scheme);
        let records = loader.load(&ProviderFilter::unrestricted()).unwrap();

        assert_eq!(records, vec![ExtractorRecord::new("voe", "voe")]);
    }

    #[test]
    fn test_load_respects_filter() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "voe.js", &scheme("voe"));
        write(dir.path(), "speedfiles.js", &scheme("speedfiles"));

        let markers = Markers::default();
        let loader = SnippetLoader::new(dir.path(), "js", &markers.scheme);
        let filter: ProviderFilter = ["speedfiles"].into_iter().collect();
        let records = loader.load(&filter).unwrap();

        assert_eq!(records, vec![ExtractorRecord::new("speedfiles", "speedfiles")]);
    }

    #[test]
    fn test_load_keeps_repeated_provider_names() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "voe.js", &scheme("new"));
        write(dir.path(), "voe.old.js", &scheme("old"));

        let markers = Markers::default();
        let loader = SnippetLoader::new(dir.path(), "js", &markers.scheme);
        let records = loader.load(&ProviderFilter::unrestricted()).unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.name == "voe"));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let markers = Markers::default();
        let loader = SnippetLoader::new(&missing, "js", &markers.scheme);
        assert!(matches!(
            loader.load(&ProviderFilter::unrestricted()),
            Err(BuildError::ReadDir { .. })
        ));
    }

    #[test]
    fn test_unreadable_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "voe.js", &scheme("voe"));

        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(readable_entry(dir.path(), Err(err)).is_none());

        let entry = std::fs::read_dir(dir.path()).unwrap().next().unwrap();
        let kept = readable_entry(dir.path(), entry).unwrap();
        assert_eq!(kept.file_name(), "voe.js");
    }
}

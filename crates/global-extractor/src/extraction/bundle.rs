//! Build the extractor bundle: deduplicate, clean, and write the
//! concatenated script plus its JSON index.
//!
//! Each cleaning step takes the records by value and hands back a new
//! collection, so every pass can be exercised on its own.

use super::ExtractorRecord;
use crate::config::{BuildConfig, MarkerPair};
use crate::error::{self, Result};
use crate::region;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// Number of lines taken by the generated header of the bundle script.
pub const GENERATED_HEADER_LINES: usize = 6;

static CLASS_DECL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"class (\S+)").expect("class declaration regex is valid"));

/// Surviving provider → cleaned snippet, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    entries: Vec<(String, String)>,
}

impl Bundle {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, snippet)| (name.as_str(), snippet.as_str()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.iter().find(|(n, _)| *n == name).map(|(_, s)| s)
    }
}

impl From<Vec<ExtractorRecord>> for Bundle {
    fn from(records: Vec<ExtractorRecord>) -> Self {
        Self {
            entries: records.into_iter().map(|r| (r.name, r.snippet)).collect(),
        }
    }
}

impl Serialize for Bundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Output of a bundle build.
#[derive(Debug, Clone)]
pub struct BuiltBundle {
    pub bundle: Bundle,
    /// The concatenated script as written to `extractors.js`.
    pub script: String,
}

/// Provider names discovered more than once.
pub fn duplicate_provider_names(records: &[ExtractorRecord]) -> BTreeSet<String> {
    repeated(records.iter().map(|r| r.name.as_str()))
}

/// Remove every record whose provider name collides with another's.
pub fn drop_duplicate_providers(records: Vec<ExtractorRecord>) -> Vec<ExtractorRecord> {
    let duplicates = duplicate_provider_names(&records);
    if duplicates.is_empty() {
        return records;
    }
    warn!("duplicate provider names found: {duplicates:?}, removing all of them");
    records
        .into_iter()
        .filter(|r| !duplicates.contains(&r.name))
        .collect()
}

/// Identifiers following `class ` on each line of a snippet.
pub fn declared_names(snippet: &str) -> Vec<&str> {
    snippet
        .lines()
        .filter_map(|line| CLASS_DECL_RE.captures(line))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Declared names appearing more than once across all snippets.
pub fn duplicate_declared_names(records: &[ExtractorRecord]) -> BTreeSet<String> {
    repeated(records.iter().flat_map(|r| declared_names(&r.snippet)))
}

/// Resolve declared-name collisions.
///
/// For each offending name only the first record containing it is dropped;
/// later holders survive unless another offending name catches them.
pub fn drop_duplicate_declarations(mut records: Vec<ExtractorRecord>) -> Vec<ExtractorRecord> {
    let duplicates = duplicate_declared_names(&records);
    if duplicates.is_empty() {
        return records;
    }
    warn!("duplicate class names found: {duplicates:?}, removing duplicates");
    for class in &duplicates {
        if let Some(idx) = records.iter().position(|r| r.snippet.contains(class.as_str())) {
            let removed = records.remove(idx);
            debug!("dropped {} for redeclaring class {class}", removed.name);
        }
    }
    records
}

/// Excise every build-excluded region from a snippet.
pub fn strip_removed(snippet: &str, remove: &MarkerPair) -> String {
    region::remove_all_regions(snippet, &remove.start, &remove.end)
}

/// Single left-to-right pass turning each `\n\n` into `\n`. Runs of three or
/// more line breaks shrink but do not fully collapse.
pub fn collapse_blank_lines(snippet: &str) -> String {
    snippet.replace("\n\n", "\n")
}

/// Run the dedup and cleaning passes, in order.
pub fn clean(records: Vec<ExtractorRecord>, remove: &MarkerPair) -> Bundle {
    let records = drop_duplicate_providers(records);
    let records = drop_duplicate_declarations(records);
    records
        .into_iter()
        .map(|r| {
            let snippet = collapse_blank_lines(&strip_removed(&r.snippet, remove));
            ExtractorRecord::new(r.name, snippet)
        })
        .collect::<Vec<_>>()
        .into()
}

/// The concatenated script: generated header, then one labeled section per
/// provider.
pub fn render_script(bundle: &Bundle, timestamp: &str) -> String {
    let mut out = String::new();
    out.push_str("/**\n");
    out.push_str(" * This file is automatically generated.\n");
    out.push_str(" * Do not edit this file directly.\n");
    out.push_str(" * \n");
    out.push_str(&format!(" * Build Time: {timestamp}\n"));
    out.push_str(" */\n\n");

    for (name, snippet) in bundle.iter() {
        out.push_str(&format!("/* --- {name} --- */\n"));
        out.push_str(snippet);
        out.push_str("\n\n");
    }
    out
}

/// The JSON index, indented by four spaces.
pub fn render_json(bundle: &Bundle) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    bundle.serialize(&mut ser)?;
    Ok(buf)
}

/// Clean the records and write `extractors.js` and `extractors.json`.
pub fn build(records: Vec<ExtractorRecord>, config: &BuildConfig, timestamp: &str) -> Result<BuiltBundle> {
    info!("building extractors");
    let bundle = clean(records, &config.markers.remove);

    let script = render_script(&bundle, timestamp);
    error::write_file(&config.bundle_script_path(), &script)?;
    error::write_file(&config.bundle_json_path(), render_json(&bundle)?)?;

    info!("{} extractors built", bundle.len());
    Ok(BuiltBundle { bundle, script })
}

fn repeated<'a>(names: impl Iterator<Item = &'a str>) -> BTreeSet<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for name in names {
        *counts.entry(name).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(name, _)| name.to_string())
        .collect()
}

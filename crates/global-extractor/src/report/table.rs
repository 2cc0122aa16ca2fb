//! Render test results as a markdown table and splice it into the README.

use crate::config::MarkerPair;
use crate::error::{self, BuildError, Result};
use crate::region;
use crate::testing::TestResults;
use std::path::Path;
use tracing::info;

const PASS_GLYPH: &str = "\u{2705}";
const FAIL_GLYPH: &str = "\u{274c}";

/// Two-column markdown table, one row per provider.
pub fn render_table(results: &TestResults) -> String {
    let mut table = String::from("| Extractor | Test Passed |\n| -------- | ------- |\n");
    for (name, status) in results.iter() {
        let glyph = if status.is_passed() { PASS_GLYPH } else { FAIL_GLYPH };
        table.push_str(&format!("| {name} | {glyph} |\n"));
    }
    table
}

/// Replace the table region of `doc`. The start marker keeps its line, the
/// table follows on the next, and the end marker starts the line after it.
pub fn splice_table(doc: &str, table: &str, markers: &MarkerPair) -> Option<String> {
    region::splice_between(doc, &markers.start, &markers.end, &format!("\n{table}"))
}

/// Rewrite the table region of the README at `path`. The file is left
/// untouched when either marker is missing.
pub fn update_readme(path: &Path, results: &TestResults, markers: &MarkerPair) -> Result<()> {
    let doc = error::read_to_string(path)?;
    let updated = splice_table(&doc, &render_table(results), markers)
        .ok_or_else(|| BuildError::MissingTableMarkers(path.to_path_buf()))?;
    error::write_file(path, &updated)?;
    info!("{} updated", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Markers;
    use crate::testing::TestStatus;

    fn results() -> TestResults {
        [("x", TestStatus::Passed), ("y", TestStatus::Failed)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_render_table() {
        assert_eq!(
            render_table(&results()),
            "| Extractor | Test Passed |\n| -------- | ------- |\n| x | \u{2705} |\n| y | \u{274c} |\n"
        );
    }

    #[test]
    fn test_update_readme_only_touches_table_region() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        let before = "# Extractors\n\nIntro text.\n\n<!-- EXTRACTORS_TABLE_START -->\n| old | table |\n<!-- EXTRACTORS_TABLE_END -->\n\n## Footer\n";
        std::fs::write(&path, before).unwrap();

        update_readme(&path, &results(), &Markers::default().table).unwrap();

        let after = std::fs::read_to_string(&path).unwrap();
        let expected = "# Extractors\n\nIntro text.\n\n<!-- EXTRACTORS_TABLE_START -->\n| Extractor | Test Passed |\n| -------- | ------- |\n| x | \u{2705} |\n| y | \u{274c} |\n<!-- EXTRACTORS_TABLE_END -->\n\n## Footer\n";
        assert_eq!(after, expected);

        let start = "<!-- EXTRACTORS_TABLE_START -->";
        let end = "<!-- EXTRACTORS_TABLE_END -->";
        assert_eq!(
            &after[..after.find(start).unwrap()],
            &before[..before.find(start).unwrap()]
        );
        assert_eq!(&after[after.find(end).unwrap()..], &before[before.find(end).unwrap()..]);
    }

    #[test]
    fn test_missing_markers_leave_readme_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        let before = "# Extractors\n<!-- EXTRACTORS_TABLE_START -->\nno end marker\n";
        std::fs::write(&path, before).unwrap();

        let err = update_readme(&path, &results(), &Markers::default().table).unwrap_err();
        assert!(matches!(err, BuildError::MissingTableMarkers(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_rerender_replaces_previous_table() {
        let markers = Markers::default().table;
        let doc = "<!-- EXTRACTORS_TABLE_START --><!-- EXTRACTORS_TABLE_END -->";
        let once = splice_table(doc, &render_table(&results()), &markers).unwrap();
        let twice = splice_table(&once, &render_table(&results()), &markers).unwrap();
        assert_eq!(once, twice);
    }
}

//! Environment readiness check.
//!
//! Verifies that the test runtime is installed and that every input the
//! pipeline reads (snippets, template, test provider list, README table
//! markers) is present and well-formed. Every failure includes a fix hint.

use crate::cli::output::{self, Styled};
use crate::config::BuildConfig;
use crate::extraction::bundle::{duplicate_declared_names, duplicate_provider_names};
use crate::extraction::loader::SnippetLoader;
use crate::extraction::{ExtractorRecord, ProviderFilter};
use crate::region;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;

/// State of the snippet directory.
enum SnippetScan {
    Missing,
    Unreadable(String),
    Loaded(Vec<ExtractorRecord>),
}

impl SnippetScan {
    fn records(&self) -> Option<&[ExtractorRecord]> {
        match self {
            SnippetScan::Loaded(records) => Some(records.as_slice()),
            _ => None,
        }
    }
}

/// What the doctor found out about the build inputs.
struct Findings {
    runtime_path: Option<PathBuf>,
    runtime_version: Option<String>,
    snippets: SnippetScan,
    template: Option<String>,
    missing_placeholders: Vec<String>,
    test_providers_present: bool,
    readme_has_table: Option<bool>,
}

impl Findings {
    fn gather(config: &BuildConfig) -> Self {
        let runtime_path = find_runtime(&config.runtime);
        let runtime_version = runtime_path.as_deref().and_then(runtime_version);

        let snippets = if config.snippet_dir.is_dir() {
            let loader = SnippetLoader::new(
                &config.snippet_dir,
                &config.snippet_extension,
                &config.markers.scheme,
            );
            match loader.load(&ProviderFilter::unrestricted()) {
                Ok(records) => SnippetScan::Loaded(records),
                Err(e) => SnippetScan::Unreadable(format!("{:#}", anyhow::Error::from(e))),
            }
        } else {
            SnippetScan::Missing
        };

        let template = std::fs::read_to_string(&config.template_path).ok();
        let missing_placeholders = template
            .as_deref()
            .map(|t| {
                config
                    .placeholders
                    .all()
                    .into_iter()
                    .filter(|p| !t.contains(p))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let table = &config.markers.table;
        let readme_has_table = std::fs::read_to_string(&config.readme_path)
            .ok()
            .map(|doc| region::extract_region(&doc, &table.start, &table.end).is_some());

        Self {
            runtime_path,
            runtime_version,
            snippets,
            template,
            missing_placeholders,
            test_providers_present: config.test_providers_path().exists(),
            readme_has_table,
        }
    }
}

/// Run the doctor diagnostic.
pub fn run(config: &BuildConfig) -> Result<()> {
    let findings = Findings::gather(config);
    if output::is_json() {
        return run_json(config, &findings);
    }

    let s = Styled::new();
    let mut ready = true;
    let mut has_warning = false;

    output::print_header(&s);

    // ── Runtime ─────────────────────────────────────────────────────────
    output::print_section(&s, "Runtime");
    match &findings.runtime_path {
        Some(path) => {
            let version = findings.runtime_version.as_deref().unwrap_or("unknown version");
            output::print_check(
                s.ok_sym(),
                "Test runtime:",
                &format!("{version} at {}", path.display()),
            );
        }
        None => {
            output::print_check(
                s.fail_sym(),
                "Test runtime:",
                &format!("`{}` NOT FOUND", config.runtime),
            );
            output::print_detail("Fix: install Node.js (https://nodejs.org/)");
            output::print_detail("Or set GLOBAL_EXTRACTOR_RUNTIME=/path/to/node");
            ready = false;
        }
    }
    eprintln!();

    // ── Sources ─────────────────────────────────────────────────────────
    output::print_section(&s, "Sources");
    match &findings.snippets {
        SnippetScan::Loaded(records) if !records.is_empty() => {
            output::print_check(
                s.ok_sym(),
                "Snippets:",
                &format!("{} in {}", records.len(), config.snippet_dir.display()),
            );
            let duplicates = duplicate_provider_names(records);
            if !duplicates.is_empty() {
                output::print_check(
                    s.warn_sym(),
                    "Providers:",
                    &format!("duplicated, will be dropped: {}", join(&duplicates)),
                );
                has_warning = true;
            }
            let classes = duplicate_declared_names(records);
            if !classes.is_empty() {
                output::print_check(
                    s.warn_sym(),
                    "Classes:",
                    &format!("declared more than once: {}", join(&classes)),
                );
                output::print_detail("Rename the class in one of the snippets.");
                has_warning = true;
            }
        }
        SnippetScan::Loaded(_) => {
            output::print_check(
                s.warn_sym(),
                "Snippets:",
                &format!("none with scheme markers in {}", config.snippet_dir.display()),
            );
            output::print_detail(&format!(
                "Wrap extractor code in {} ... {}",
                config.markers.scheme.start, config.markers.scheme.end
            ));
            has_warning = true;
        }
        SnippetScan::Unreadable(reason) => {
            output::print_check(s.fail_sym(), "Snippets:", reason);
            output::print_detail("Fix: check the directory's permissions");
            ready = false;
        }
        SnippetScan::Missing => {
            output::print_check(
                s.fail_sym(),
                "Snippets:",
                &format!("directory {} does not exist", config.snippet_dir.display()),
            );
            output::print_detail("Fix: pass --root pointing at the repository root");
            ready = false;
        }
    }

    match &findings.template {
        Some(_) if findings.missing_placeholders.is_empty() => {
            output::print_check(s.ok_sym(), "Template:", &display(&config.template_path));
        }
        Some(_) => {
            output::print_check(
                s.warn_sym(),
                "Template:",
                &format!("missing {}", findings.missing_placeholders.join(", ")),
            );
            has_warning = true;
        }
        None => {
            output::print_check(
                s.fail_sym(),
                "Template:",
                &format!("{} NOT FOUND", display(&config.template_path)),
            );
            ready = false;
        }
    }

    if findings.test_providers_present {
        output::print_check(s.ok_sym(), "Test list:", &display(&config.test_providers_path()));
    } else {
        output::print_check(
            s.warn_sym(),
            "Test list:",
            &format!("{} not found (harness gets no providers)", display(&config.test_providers_path())),
        );
        has_warning = true;
    }
    eprintln!();

    // ── Docs ────────────────────────────────────────────────────────────
    output::print_section(&s, "Docs");
    match findings.readme_has_table {
        Some(true) => output::print_check(s.ok_sym(), "README table:", "markers present"),
        Some(false) => {
            output::print_check(s.warn_sym(), "README table:", "markers missing");
            output::print_detail(&format!(
                "Add {} and {} on their own lines",
                config.markers.table.start, config.markers.table.end
            ));
            has_warning = true;
        }
        None => {
            output::print_check(
                s.warn_sym(),
                "README table:",
                &format!("{} not found", display(&config.readme_path)),
            );
            has_warning = true;
        }
    }

    if ready && !has_warning {
        output::print_status(&s, &s.green("READY"), "run 'global-extractor run'");
    } else if ready {
        output::print_status(&s, &s.yellow("READY"), "some warnings above");
    } else {
        output::print_status(&s, &s.red("NOT READY"), "fix issues above");
    }

    Ok(())
}

/// JSON output mode for doctor.
fn run_json(config: &BuildConfig, findings: &Findings) -> Result<()> {
    let records = findings.snippets.records();
    let snippet_names: Option<Vec<&str>> =
        records.map(|records| records.iter().map(|r| r.name.as_str()).collect());
    let snippet_error = match &findings.snippets {
        SnippetScan::Unreadable(reason) => Some(reason.as_str()),
        _ => None,
    };
    output::print_json(&serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "config": config,
        "runtime_path": findings.runtime_path.as_ref().map(|p| p.display().to_string()),
        "runtime_version": findings.runtime_version,
        "snippets": snippet_names,
        "snippet_error": snippet_error,
        "duplicate_providers": records.map(duplicate_provider_names),
        "duplicate_classes": records.map(duplicate_declared_names),
        "template_found": findings.template.is_some(),
        "missing_placeholders": findings.missing_placeholders,
        "test_providers_found": findings.test_providers_present,
        "readme_table": findings.readme_has_table,
    }));
    Ok(())
}

// ── Helper functions ────────────────────────────────────────────────────────

/// Resolve the runtime: an existing path is taken as-is, anything else is
/// looked up on PATH.
fn find_runtime(program: &str) -> Option<PathBuf> {
    let path = Path::new(program);
    if path.components().count() > 1 && path.exists() {
        return Some(path.to_path_buf());
    }
    which::which(program).ok()
}

/// Output of `<runtime> --version`, without a leading `v`.
fn runtime_version(path: &Path) -> Option<String> {
    let output = Command::new(path).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let raw = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let clean = raw.strip_prefix('v').unwrap_or(&raw).to_string();
    Some(if clean.is_empty() { raw } else { clean })
}

fn join(names: &std::collections::BTreeSet<String>) -> String {
    names.iter().cloned().collect::<Vec<_>>().join(", ")
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_on_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = BuildConfig::from_root(dir.path());
        let findings = Findings::gather(&config);
        assert!(matches!(findings.snippets, SnippetScan::Missing));
        assert!(findings.template.is_none());
        assert!(findings.missing_placeholders.is_empty());
        assert!(!findings.test_providers_present);
        assert_eq!(findings.readme_has_table, None);
    }

    #[test]
    fn test_gather_reports_missing_placeholders_and_markers() {
        let dir = tempfile::tempdir().unwrap();
        let config = BuildConfig::from_root(dir.path());
        std::fs::create_dir_all(&config.snippet_dir).unwrap();
        std::fs::write(
            config.snippet_dir.join("voe.js"),
            "/* SCHEME START */class Voe {}/* SCHEME END */",
        )
        .unwrap();
        std::fs::create_dir_all(config.template_path.parent().unwrap()).unwrap();
        std::fs::write(&config.template_path, "/* {HEADER} */\n/* {PROVIDER_CASES} */\n").unwrap();
        std::fs::write(&config.readme_path, "# no table here\n").unwrap();

        let findings = Findings::gather(&config);
        assert_eq!(findings.snippets.records().map(<[_]>::len), Some(1));
        assert_eq!(
            findings.missing_placeholders,
            vec![
                "/* {EXTRACTOR_FUNCTIONS} */",
                "/* {ALL_PROVIDERS} */",
                "/* {TEST_PROVIDERS} */"
            ]
        );
        assert_eq!(findings.readme_has_table, Some(false));
    }

    #[cfg(unix)]
    #[test]
    fn test_gather_reports_unlistable_snippet_dir() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let config = BuildConfig::from_root(dir.path());
        std::fs::create_dir_all(&config.snippet_dir).unwrap();
        std::fs::set_permissions(&config.snippet_dir, std::fs::Permissions::from_mode(0o000))
            .unwrap();
        // Root can list the directory regardless of its mode.
        let listable = std::fs::read_dir(&config.snippet_dir).is_ok();

        let findings = Findings::gather(&config);
        std::fs::set_permissions(&config.snippet_dir, std::fs::Permissions::from_mode(0o755))
            .unwrap();

        if listable {
            assert!(matches!(findings.snippets, SnippetScan::Loaded(_)));
        } else {
            match findings.snippets {
                SnippetScan::Unreadable(reason) => assert!(reason.contains("extractors")),
                _ => panic!("expected the listing error to be reported"),
            }
        }
    }

    #[test]
    fn test_find_runtime_rejects_missing_path() {
        assert!(find_runtime("/definitely/not/a/runtime").is_none());
    }
}

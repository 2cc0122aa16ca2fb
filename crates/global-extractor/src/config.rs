//! Build configuration: paths, marker literals, template placeholders and
//! test-runner timing.
//!
//! Everything a pipeline stage needs is carried by [`BuildConfig`] and passed
//! in explicitly. Defaults mirror the repository layout the extractors live
//! in:
//!
//! ```text
//! <root>/extractors/*.js
//! <root>/README.md
//! <root>/global-extractor/global_extractor_scheme.js
//! <root>/global-extractor/output/
//! <root>/global-extractor/test/
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Env var overriding the script runtime used for tests.
pub const RUNTIME_ENV: &str = "GLOBAL_EXTRACTOR_RUNTIME";
/// Env var overriding the results poll timeout, in whole seconds.
pub const POLL_TIMEOUT_ENV: &str = "GLOBAL_EXTRACTOR_POLL_TIMEOUT_SECS";

/// A pair of literal markers delimiting a region of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerPair {
    pub start: String,
    pub end: String,
}

impl MarkerPair {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}

/// Every marker pair the pipeline scans for.
#[derive(Debug, Clone, Serialize)]
pub struct Markers {
    /// Delimits the extractable scheme inside a snippet file.
    pub scheme: MarkerPair,
    /// Delimits build-excluded code inside a scheme.
    pub remove: MarkerPair,
    /// Delimits the harness region inside the template.
    pub test_scheme: MarkerPair,
    /// Delimits the status table inside the README.
    pub table: MarkerPair,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            scheme: MarkerPair::new("/* SCHEME START */", "/* SCHEME END */"),
            remove: MarkerPair::new("/* REMOVE_START */", "/* REMOVE_END */"),
            test_scheme: MarkerPair::new("/* TEST SCHEME START */", "/* TEST SCHEME END */"),
            table: MarkerPair::new(
                "<!-- EXTRACTORS_TABLE_START -->",
                "<!-- EXTRACTORS_TABLE_END -->",
            ),
        }
    }
}

/// Substitution placeholders expected in the template.
#[derive(Debug, Clone, Serialize)]
pub struct Placeholders {
    pub header: String,
    pub functions: String,
    pub providers: String,
    pub cases: String,
    pub test_providers: String,
}

impl Placeholders {
    /// All placeholders, in substitution order.
    pub fn all(&self) -> [&str; 5] {
        [
            self.header.as_str(),
            self.functions.as_str(),
            self.providers.as_str(),
            self.cases.as_str(),
            self.test_providers.as_str(),
        ]
    }
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            header: "/* {HEADER} */".into(),
            functions: "/* {EXTRACTOR_FUNCTIONS} */".into(),
            providers: "/* {ALL_PROVIDERS} */".into(),
            cases: "/* {PROVIDER_CASES} */".into(),
            test_providers: "/* {TEST_PROVIDERS} */".into(),
        }
    }
}

/// Values written into the distributable's header comment.
#[derive(Debug, Clone, Serialize)]
pub struct Attribution {
    pub name: String,
    pub description: String,
    pub author: String,
    pub license: String,
}

impl Default for Attribution {
    fn default() -> Self {
        Self {
            name: "global_extractor.js".into(),
            description: "Global extractor to be used in Sora Modules".into(),
            author: "Cufiy".into(),
            license: "MIT".into(),
        }
    }
}

/// Full configuration for one build/test cycle.
#[derive(Debug, Clone, Serialize)]
pub struct BuildConfig {
    pub root: PathBuf,
    pub snippet_dir: PathBuf,
    /// File extension (without the dot) a snippet file must carry.
    pub snippet_extension: String,
    pub template_path: PathBuf,
    pub output_dir: PathBuf,
    pub test_dir: PathBuf,
    pub readme_path: PathBuf,
    pub markers: Markers,
    pub placeholders: Placeholders,
    pub attribution: Attribution,
    /// Program used to execute the harness.
    pub runtime: String,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
}

impl BuildConfig {
    /// Default layout rooted at `root`.
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let tool_dir = root.join("global-extractor");
        Self {
            snippet_dir: root.join("extractors"),
            snippet_extension: "js".into(),
            template_path: tool_dir.join("global_extractor_scheme.js"),
            output_dir: tool_dir.join("output"),
            test_dir: tool_dir.join("test"),
            readme_path: root.join("README.md"),
            markers: Markers::default(),
            placeholders: Placeholders::default(),
            attribution: Attribution::default(),
            runtime: "node".into(),
            poll_interval: Duration::from_secs(1),
            poll_timeout: Duration::from_secs(20),
            root,
        }
    }

    /// Apply `GLOBAL_EXTRACTOR_*` environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(runtime) = std::env::var(RUNTIME_ENV) {
            if !runtime.trim().is_empty() {
                self.runtime = runtime.trim().to_string();
            }
        }
        if let Ok(raw) = std::env::var(POLL_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.poll_timeout = Duration::from_secs(secs),
                Err(_) => warn!("ignoring {POLL_TIMEOUT_ENV}={raw:?}: not a whole number of seconds"),
            }
        }
        self
    }

    /// Concatenated bundle script.
    pub fn bundle_script_path(&self) -> PathBuf {
        self.output_dir.join("extractors.js")
    }

    /// Structured name→snippet bundle.
    pub fn bundle_json_path(&self) -> PathBuf {
        self.output_dir.join("extractors.json")
    }

    /// Known-good distributable, written by filtered passes.
    pub fn distributable_path(&self) -> PathBuf {
        self.output_dir.join("global_extractor.js")
    }

    /// All-inclusive distributable, written by unfiltered passes.
    pub fn distributable_all_path(&self) -> PathBuf {
        self.output_dir.join("global_extractor_all.js")
    }

    /// Harness file handed to the test runtime.
    pub fn harness_path(&self) -> PathBuf {
        self.test_dir.join("global_extractor_test.js")
    }

    /// Optional newline-delimited list of test-only provider entries.
    pub fn test_providers_path(&self) -> PathBuf {
        self.test_dir.join("test_providers.txt")
    }

    /// Results file the test runtime writes.
    pub fn results_path(&self) -> PathBuf {
        self.test_dir.join("test_results.json")
    }
}

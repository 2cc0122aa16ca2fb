//! The build → test → rebuild driver.
//!
//! One cycle runs an unrestricted pass (producing the all-inclusive
//! distributable), tests the harness it wrote, refreshes the README table,
//! and finishes with a pass restricted to the providers that passed.

use crate::assembly::{self, Assembled};
use crate::config::BuildConfig;
use crate::extraction::bundle;
use crate::extraction::loader::SnippetLoader;
use crate::extraction::ProviderFilter;
use crate::report;
use crate::testing::{TestOrchestrator, TestResults, TestRunner};
use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Local build time as stamped into generated files.
pub fn build_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Outcome of one Loader → Builder → Assembler pass.
#[derive(Debug, Clone)]
pub struct PassSummary {
    pub providers: Vec<String>,
    pub assembled: Assembled,
}

/// Outcome of a full cycle. Stages that failed or were skipped are `None`.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub all: Option<PassSummary>,
    pub results: Option<TestResults>,
    pub filtered: Option<PassSummary>,
    pub elapsed: Duration,
}

/// Load, bundle and assemble once under `filter`.
pub fn build_pass(config: &BuildConfig, filter: &ProviderFilter) -> Result<PassSummary> {
    if filter.is_empty() {
        info!("global extractor build started (all providers)");
    } else {
        info!(
            "global extractor build started for {}",
            filter.names().collect::<Vec<_>>().join(", ")
        );
    }
    let timestamp = build_timestamp();

    let loader = SnippetLoader::new(
        &config.snippet_dir,
        &config.snippet_extension,
        &config.markers.scheme,
    );
    let records = loader.load(filter).context("loading extractor snippets")?;

    let built = bundle::build(records, config, &timestamp).context("building extractors")?;
    let assembled = assembly::assemble(&built, config, filter, &timestamp)
        .context("building global extractor")?;

    Ok(PassSummary {
        providers: built.bundle.names().map(String::from).collect(),
        assembled,
    })
}

pub struct Pipeline<R> {
    config: BuildConfig,
    orchestrator: TestOrchestrator<R>,
}

impl<R: TestRunner> Pipeline<R> {
    pub fn new(config: BuildConfig, runner: R) -> Self {
        let orchestrator = TestOrchestrator::from_config(runner, &config);
        Self {
            config,
            orchestrator,
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// [`build_pass`], logging instead of propagating a failure.
    pub fn try_build_pass(&self, filter: &ProviderFilter) -> Option<PassSummary> {
        match build_pass(&self.config, filter) {
            Ok(summary) => Some(summary),
            Err(e) => {
                error!("build failed: {e:#}");
                None
            }
        }
    }

    /// Run the harness and, when results arrive, refresh the README table.
    /// A missing table region is logged and does not discard the results.
    pub async fn test(&self) -> Result<Option<TestResults>> {
        let harness = self.config.harness_path();
        let Some(results) = self.orchestrator.run(&harness).await? else {
            return Ok(None);
        };

        if let Err(e) =
            report::update_readme(&self.config.readme_path, &results, &self.config.markers.table)
        {
            error!("README not updated: {:#}", anyhow::Error::from(e));
        }
        Ok(Some(results))
    }

    /// Full cycle: unrestricted build, test, then known-good build.
    pub async fn run(&self) -> RunSummary {
        let started = Instant::now();

        let all = self.try_build_pass(&ProviderFilter::unrestricted());

        let results = match self.test().await {
            Ok(results) => results,
            Err(e) => {
                error!("testing failed: {e:#}");
                None
            }
        };

        let filtered = match &results {
            None => {
                warn!("no test results available, skipping known-good build");
                None
            }
            Some(results) => {
                let passing = results.passing();
                if passing.is_empty() {
                    warn!("no extractors passed, skipping known-good build");
                    None
                } else {
                    info!("building global extractor with {} passing extractors", passing.len());
                    self.try_build_pass(&passing)
                }
            }
        };

        let elapsed = started.elapsed();
        info!("total time taken: {:.2} seconds", elapsed.as_secs_f64());

        RunSummary {
            all,
            results,
            filtered,
            elapsed,
        }
    }
}

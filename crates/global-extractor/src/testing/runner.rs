//! Run the harness through an external runtime and wait for its results file.

use super::results::TestResults;
use crate::config::BuildConfig;
use crate::error::{BuildError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Executes a harness file. Implementations are expected to cause the
/// results file to be written as a side effect.
#[async_trait]
pub trait TestRunner: Send + Sync {
    async fn run(&self, harness: &Path) -> Result<()>;
}

/// Runs the harness with a script runtime such as `node`.
#[derive(Debug, Clone)]
pub struct NodeRunner {
    program: String,
}

impl NodeRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl TestRunner for NodeRunner {
    async fn run(&self, harness: &Path) -> Result<()> {
        debug!("running {} {}", self.program, harness.display());
        let status = tokio::process::Command::new(&self.program)
            .arg(harness)
            .status()
            .await
            .map_err(|source| BuildError::Runner {
                program: self.program.clone(),
                source,
            })?;
        if !status.success() {
            warn!("{} exited with {status}", self.program);
        }
        Ok(())
    }
}

/// Invokes a [`TestRunner`] and polls for the results file.
pub struct TestOrchestrator<R> {
    runner: R,
    results_path: PathBuf,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl<R: TestRunner> TestOrchestrator<R> {
    pub fn new(runner: R, results_path: PathBuf, poll_interval: Duration, poll_timeout: Duration) -> Self {
        Self {
            runner,
            results_path,
            poll_interval,
            poll_timeout,
        }
    }

    pub fn from_config(runner: R, config: &BuildConfig) -> Self {
        Self::new(
            runner,
            config.results_path(),
            config.poll_interval,
            config.poll_timeout,
        )
    }

    /// Run the harness and collect its results.
    ///
    /// Returns `Ok(None)` when no results file shows up within the poll
    /// timeout. A results file left over from an earlier run is removed
    /// before the runner starts.
    pub async fn run(&self, harness: &Path) -> Result<Option<TestResults>> {
        info!("testing global extractor");

        if self.results_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.results_path) {
                warn!(
                    "could not remove stale results {}: {e}",
                    self.results_path.display()
                );
            }
        }

        if let Err(e) = self.runner.run(harness).await {
            warn!(error = ?e, "test runtime failed to start");
        }

        let started = Instant::now();
        while !self.results_path.exists() {
            if started.elapsed() > self.poll_timeout {
                warn!(
                    "timed out after {:?} waiting for {}",
                    self.poll_timeout,
                    self.results_path.display()
                );
                return Ok(None);
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        let results = TestResults::load(&self.results_path)?;
        info!(
            "{} of {} extractors passed",
            results.passed_count(),
            results.len()
        );
        Ok(Some(results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::results::TestStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Writes a fixed results document, optionally after a delay.
    struct FakeRunner {
        results_path: PathBuf,
        body: Option<&'static str>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl FakeRunner {
        fn writing(results_path: PathBuf, body: &'static str) -> Self {
            Self {
                results_path,
                body: Some(body),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn silent(results_path: PathBuf) -> Self {
            Self {
                results_path,
                body: None,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TestRunner for FakeRunner {
        async fn run(&self, _harness: &Path) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(body) = self.body {
                let path = self.results_path.clone();
                let delay = self.delay;
                // Write from a background task so the orchestrator has to poll.
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    std::fs::write(path, body).unwrap();
                });
            }
            Ok(())
        }
    }

    struct BrokenRunner;

    #[async_trait]
    impl TestRunner for BrokenRunner {
        async fn run(&self, _harness: &Path) -> Result<()> {
            Err(BuildError::Runner {
                program: "missing-runtime".into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }

    #[tokio::test]
    async fn test_returns_results_once_written() {
        let dir = tempfile::tempdir().unwrap();
        let results_path = dir.path().join("test_results.json");
        let mut runner = FakeRunner::writing(
            results_path.clone(),
            r#"{"speedfiles": "passed", "voe": "failed"}"#,
        );
        runner.delay = Duration::from_millis(30);

        let orchestrator = TestOrchestrator::new(
            runner,
            results_path,
            Duration::from_millis(10),
            Duration::from_secs(5),
        );
        let results = orchestrator
            .run(&dir.path().join("harness.js"))
            .await
            .unwrap()
            .expect("results should be available");

        assert_eq!(orchestrator.runner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            results.iter().collect::<Vec<_>>(),
            vec![("speedfiles", TestStatus::Passed), ("voe", TestStatus::Failed)]
        );
    }

    #[tokio::test]
    async fn test_times_out_without_results() {
        let dir = tempfile::tempdir().unwrap();
        let results_path = dir.path().join("test_results.json");
        let orchestrator = TestOrchestrator::new(
            FakeRunner::silent(results_path.clone()),
            results_path,
            Duration::from_millis(5),
            Duration::from_millis(40),
        );

        let outcome = orchestrator.run(&dir.path().join("harness.js")).await.unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_stale_results_are_not_reused() {
        let dir = tempfile::tempdir().unwrap();
        let results_path = dir.path().join("test_results.json");
        std::fs::write(&results_path, r#"{"stale": "passed"}"#).unwrap();

        let orchestrator = TestOrchestrator::new(
            FakeRunner::silent(results_path.clone()),
            results_path.clone(),
            Duration::from_millis(5),
            Duration::from_millis(40),
        );

        assert!(orchestrator.run(&dir.path().join("harness.js")).await.unwrap().is_none());
        assert!(!results_path.exists());
    }

    #[tokio::test]
    async fn test_runner_failure_still_polls() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = TestOrchestrator::new(
            BrokenRunner,
            dir.path().join("test_results.json"),
            Duration::from_millis(5),
            Duration::from_millis(20),
        );
        assert!(orchestrator.run(&dir.path().join("harness.js")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_results_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let results_path = dir.path().join("test_results.json");
        let orchestrator = TestOrchestrator::new(
            FakeRunner::writing(results_path.clone(), "not json"),
            results_path,
            Duration::from_millis(5),
            Duration::from_secs(5),
        );
        assert!(matches!(
            orchestrator.run(&dir.path().join("harness.js")).await,
            Err(BuildError::MalformedResults { .. })
        ));
    }

    #[tokio::test]
    async fn test_node_runner_reports_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let runner = NodeRunner::new("/definitely/not/a/runtime");
        match runner.run(&dir.path().join("harness.js")).await {
            Err(BuildError::Runner { program, .. }) => {
                assert_eq!(program, "/definitely/not/a/runtime");
            }
            other => panic!("expected a runner error, got {other:?}"),
        }
    }
}

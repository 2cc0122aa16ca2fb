//! `global-extractor test` — run the existing harness and refresh the README.

use crate::cli::output::{self, Styled};
use crate::config::BuildConfig;
use crate::pipeline::Pipeline;
use crate::testing::{NodeRunner, TestResults};
use anyhow::{bail, Result};
use std::time::Instant;

/// Test the harness written by the last build.
pub async fn run(config: &BuildConfig) -> Result<()> {
    let s = Styled::new();
    let harness = config.harness_path();
    if !harness.exists() {
        bail!(
            "no test harness at {}. Run `global-extractor build` first.",
            harness.display()
        );
    }

    let start = Instant::now();
    let pipeline = Pipeline::new(config.clone(), NodeRunner::new(config.runtime.clone()));
    let results = pipeline.test().await?;
    let elapsed = start.elapsed();

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "results": results,
            "passed": results.as_ref().map(TestResults::passed_count),
            "total": results.as_ref().map(TestResults::len),
            "timed_out": results.is_none(),
            "duration_ms": elapsed.as_millis() as u64,
        }));
        return Ok(());
    }

    if output::is_quiet() {
        return Ok(());
    }

    match results {
        Some(results) => print_results(&s, &results),
        None => eprintln!(
            "  {} No results at {} after {}s.",
            s.warn_sym(),
            config.results_path().display(),
            config.poll_timeout.as_secs()
        ),
    }
    Ok(())
}

/// One line per provider followed by a pass count.
pub fn print_results(s: &Styled, results: &TestResults) {
    for (name, status) in results.iter() {
        let symbol = if status.is_passed() {
            s.ok_sym()
        } else {
            s.fail_sym()
        };
        eprintln!("    {symbol} {name}");
    }
    let summary = format!("{} of {} passed", results.passed_count(), results.len());
    let label = if results.passed_count() == results.len() {
        s.green("PASSED")
    } else {
        s.red("FAILURES")
    };
    output::print_status(s, &label, &summary);
}

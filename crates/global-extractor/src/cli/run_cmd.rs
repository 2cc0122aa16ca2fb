//! `global-extractor run` — the full build → test → known-good build cycle.

use crate::cli::output::{self, Styled};
use crate::cli::test_cmd::print_results;
use crate::config::BuildConfig;
use crate::pipeline::{PassSummary, Pipeline};
use crate::testing::NodeRunner;
use anyhow::Result;

/// Run the whole cycle with the configured runtime.
pub async fn run(config: &BuildConfig) -> Result<()> {
    let s = Styled::new();
    let pipeline = Pipeline::new(config.clone(), NodeRunner::new(config.runtime.clone()));
    let summary = pipeline.run().await;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "all": summary.all.as_ref().map(pass_json),
            "results": summary.results,
            "filtered": summary.filtered.as_ref().map(pass_json),
            "duration_ms": summary.elapsed.as_millis() as u64,
        }));
        return Ok(());
    }

    if output::is_quiet() {
        return Ok(());
    }

    output::print_header(&s);
    output::print_section(&s, "All extractors");
    print_pass(&s, summary.all.as_ref());
    eprintln!();

    output::print_section(&s, "Tests");
    match &summary.results {
        Some(results) => print_results(&s, results),
        None => output::print_check(s.warn_sym(), "Results:", "none (timed out or failed)"),
    }
    eprintln!();

    output::print_section(&s, "Known-good");
    print_pass(&s, summary.filtered.as_ref());
    eprintln!();

    eprintln!(
        "  Total time: {}",
        s.yellow(&output::format_elapsed(summary.elapsed))
    );
    Ok(())
}

fn print_pass(s: &Styled, pass: Option<&PassSummary>) {
    match pass {
        Some(pass) => {
            output::print_check(
                s.ok_sym(),
                "Extractors:",
                &pass.providers.len().to_string(),
            );
            output::print_check(
                s.ok_sym(),
                "Written:",
                &pass.assembled.distributable_path.display().to_string(),
            );
        }
        None => {
            output::print_check(s.fail_sym(), "Build:", "skipped or failed");
            output::print_detail("See the log output above for details.");
        }
    }
}

fn pass_json(pass: &PassSummary) -> serde_json::Value {
    serde_json::json!({
        "variant": pass.assembled.variant.as_str(),
        "providers": pass.providers,
        "distributable": pass.assembled.distributable_path.display().to_string(),
    })
}

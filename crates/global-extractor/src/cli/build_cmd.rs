//! `global-extractor build` — one Loader → Builder → Assembler pass.

use crate::cli::output::{self, Styled};
use crate::config::BuildConfig;
use crate::extraction::ProviderFilter;
use crate::pipeline;
use anyhow::Result;
use std::time::Instant;

/// Build once, restricted to `only` when it is non-empty.
pub fn run(config: &BuildConfig, only: &[String]) -> Result<()> {
    let s = Styled::new();
    let start = Instant::now();

    let filter: ProviderFilter = only
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .collect();
    let summary = pipeline::build_pass(config, &filter)?;
    let elapsed = start.elapsed();

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "variant": summary.assembled.variant.as_str(),
            "providers": summary.providers,
            "distributable": summary.assembled.distributable_path.display().to_string(),
            "harness": summary.assembled.harness_path.display().to_string(),
            "duration_ms": elapsed.as_millis() as u64,
        }));
        return Ok(());
    }

    if !output::is_quiet() {
        eprintln!(
            "  {} Built {} extractor(s) into {} in {}",
            s.ok_sym(),
            s.cyan(&summary.providers.len().to_string()),
            summary.assembled.distributable_path.display(),
            s.yellow(&output::format_elapsed(elapsed)),
        );
        if summary.providers.is_empty() {
            eprintln!("  {} No extractor survived loading and deduplication.", s.warn_sym());
        }
    }

    Ok(())
}

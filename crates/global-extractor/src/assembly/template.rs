//! Placeholder substitution and distributable output.

use crate::config::{Attribution, BuildConfig};
use crate::error::{self, Result};
use crate::extraction::bundle::{Bundle, BuiltBundle, GENERATED_HEADER_LINES};
use crate::extraction::ProviderFilter;
use crate::region;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// First line of the all-inclusive distributable.
pub const ALL_EXTRACTORS_WARNING: &str = "/* WARNING: This file contains all the extractors, working and not working and is not recommended to be used. */\n";

/// Which distributable an assembly produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Restricted to an allow-list; written to `global_extractor.js`.
    Filtered,
    /// Every surviving extractor; written to `global_extractor_all.js`.
    All,
}

impl Variant {
    pub fn for_filter(filter: &ProviderFilter) -> Self {
        if filter.is_empty() {
            Variant::All
        } else {
            Variant::Filtered
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Filtered => "filtered",
            Variant::All => "all",
        }
    }
}

/// Files written by one assembly.
#[derive(Debug, Clone)]
pub struct Assembled {
    pub harness_path: PathBuf,
    pub distributable_path: PathBuf,
    pub variant: Variant,
}

/// Header comment placed at the top of the distributable.
pub fn render_header(attribution: &Attribution, timestamp: &str) -> String {
    let mut header = String::from(
        "/* Replace your extractStreamUrl function with the script below */\n\n",
    );
    header.push_str("/**\n");
    header.push_str(&format!(" * @name {}\n", attribution.name));
    header.push_str(&format!(" * @description {}\n", attribution.description));
    header.push_str(&format!(" * @author {}\n", attribution.author));
    header.push_str(&format!(" * @license {}\n", attribution.license));
    header.push_str(&format!(" * @date {timestamp}\n"));
    header.push_str(" * @note This file is automatically generated.\n");
    header.push_str(" */\n");
    header
}

/// Drop the bundle script's own generated header.
pub fn strip_generated_header(script: &str) -> String {
    script
        .split('\n')
        .skip(GENERATED_HEADER_LINES)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Comma-separated provider names, in bundle order.
pub fn provider_list(bundle: &Bundle) -> String {
    bundle.names().collect::<Vec<_>>().join(", ")
}

/// One `case` per provider dispatching to `<name>Extractor(html, url)`.
/// Failures are logged by the generated code and turn into `null`.
pub fn provider_cases(bundle: &Bundle) -> String {
    let mut cases = String::new();
    for name in bundle.names() {
        cases.push_str(&format!("    case \"{name}\":\n"));
        cases.push_str("      try {\n");
        cases.push_str(&format!("         return await {name}Extractor(html, url);\n"));
        cases.push_str("      } catch (error) {\n");
        cases.push_str(&format!(
            "         console.log(\"Error extracting stream URL from {name}:\", error);\n"
        ));
        cases.push_str("         return null;\n");
        cases.push_str("      }\n");
    }
    cases
}

/// Contents of the test provider list, one `\n`-terminated line per entry.
/// `None` when the list file does not exist.
pub fn read_test_providers(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = error::read_to_string(path)?;
    Ok(Some(raw.lines().map(|line| format!("{line}\n")).collect()))
}

/// Fill every placeholder of `template`. The test-provider placeholder is
/// left in place when `test_providers` is `None`.
pub fn substitute(
    template: &str,
    config: &BuildConfig,
    built: &BuiltBundle,
    test_providers: Option<&str>,
    timestamp: &str,
) -> String {
    let placeholders = &config.placeholders;
    for placeholder in [
        &placeholders.header,
        &placeholders.functions,
        &placeholders.providers,
        &placeholders.cases,
    ] {
        if !template.contains(placeholder.as_str()) {
            warn!("template is missing placeholder {placeholder}");
        }
    }

    let mut content = template.replace(
        &placeholders.header,
        &render_header(&config.attribution, timestamp),
    );
    content = content.replace(&placeholders.functions, &strip_generated_header(&built.script));
    content = content.replace(&placeholders.providers, &provider_list(&built.bundle));
    content = content.replace(&placeholders.cases, &provider_cases(&built.bundle));
    if let Some(block) = test_providers {
        content = content.replace(&placeholders.test_providers, block);
    }
    content
}

/// Assemble the harness and one distributable from a built bundle.
pub fn assemble(
    built: &BuiltBundle,
    config: &BuildConfig,
    filter: &ProviderFilter,
    timestamp: &str,
) -> Result<Assembled> {
    info!("building global extractor");
    let template = error::read_to_string(&config.template_path)?;

    let test_providers = read_test_providers(&config.test_providers_path())?;
    if test_providers.is_none() {
        info!(
            "{} not found, skipping test providers",
            config.test_providers_path().display()
        );
    }

    let content = substitute(&template, config, built, test_providers.as_deref(), timestamp);

    let harness_path = config.harness_path();
    error::write_file(&harness_path, &content)?;

    let test_scheme = &config.markers.test_scheme;
    let stripped = region::remove_region(&content, &test_scheme.start, &test_scheme.end);

    let variant = Variant::for_filter(filter);
    let distributable_path = match variant {
        Variant::Filtered => {
            let path = config.distributable_path();
            error::write_file(&path, &stripped)?;
            path
        }
        Variant::All => {
            let path = config.distributable_all_path();
            error::write_file(&path, format!("{ALL_EXTRACTORS_WARNING}{stripped}"))?;
            path
        }
    };

    info!("wrote {}", distributable_path.display());
    Ok(Assembled {
        harness_path,
        distributable_path,
        variant,
    })
}

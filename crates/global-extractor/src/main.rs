//! `global-extractor` binary.
//!
//! ```text
//! global-extractor [--root DIR] [run]        build all, test, build known-good
//! global-extractor build [--only a,b]        one build pass
//! global-extractor test                      run the last harness, refresh README
//! global-extractor doctor                    check runtime and inputs
//! global-extractor completions <shell>
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use global_extractor::cli::{build_cmd, doctor, output, run_cmd, test_cmd};
use global_extractor::BuildConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "global-extractor", version, about)]
struct Cli {
    /// Repository root holding `extractors/`, `global-extractor/` and `README.md`.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Only print errors.
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Machine-readable output on stdout, JSON logs on stderr.
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging.
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every extractor, test the harness, then build the known-good set.
    Run(TestArgs),
    /// Run a single build pass.
    Build {
        /// Restrict the build to these providers (comma separated).
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
    },
    /// Run the harness from the last build and refresh the README table.
    Test(TestArgs),
    /// Check the runtime and build inputs.
    Doctor,
    /// Print shell completions.
    Completions {
        shell: Shell,
    },
}

#[derive(clap::Args, Default)]
struct TestArgs {
    /// Program used to run the harness.
    #[arg(long)]
    runtime: Option<String>,

    /// Seconds to wait for the results file.
    #[arg(long)]
    timeout: Option<u64>,
}

impl TestArgs {
    fn apply(&self, config: &mut BuildConfig) {
        if let Some(runtime) = &self.runtime {
            config.runtime = runtime.clone();
        }
        if let Some(secs) = self.timeout {
            config.poll_timeout = Duration::from_secs(secs);
        }
    }
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("global_extractor={level}").parse().context("invalid log directive")?);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.quiet {
        std::env::set_var(output::QUIET_ENV, "1");
    }
    if cli.json {
        std::env::set_var(output::JSON_ENV, "1");
    }
    if cli.no_color {
        std::env::set_var(output::NO_COLOR_ENV, "1");
    }

    if let Some(Commands::Completions { shell }) = &cli.command {
        clap_complete::generate(
            *shell,
            &mut Cli::command(),
            "global-extractor",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    init_tracing(&cli)?;

    let mut config = BuildConfig::from_root(&cli.root).with_env_overrides();
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;

    match cli.command.unwrap_or(Commands::Run(TestArgs::default())) {
        Commands::Run(args) => {
            args.apply(&mut config);
            runtime.block_on(run_cmd::run(&config))
        }
        Commands::Build { only } => build_cmd::run(&config, &only),
        Commands::Test(args) => {
            args.apply(&mut config);
            runtime.block_on(test_cmd::run(&config))
        }
        Commands::Doctor => doctor::run(&config),
        Commands::Completions { .. } => Ok(()),
    }
}

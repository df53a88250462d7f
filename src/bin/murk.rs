//! murk CLI binary entry point.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use murk_core::config::{seed_chars, Options};
use murk_core::error::MurkError;

/// Source-to-source obfuscating renamer for typed package bundles.
#[derive(Parser)]
#[command(name = "murk")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Typed-package bundles produced by the frontend (JSON).
    #[arg(required = true)]
    bundles: Vec<PathBuf>,

    /// Path to the output directory.
    #[arg(long = "out-dir", short = 'o')]
    out_dir: PathBuf,

    /// Overwrite existing output files.
    #[arg(long = "overwrite", short = 'f')]
    overwrite: bool,

    /// Obfuscate exported names in internal packages.
    #[arg(long = "obfuscate-internal-exports", visible_alias = "oie")]
    obfuscate_internal_exports: bool,

    /// Keep names from obfuscating: Name | pkg.Name | path/pkg.Name,
    /// comma-separated or repeated.
    #[arg(long = "keep")]
    keep: Vec<String>,

    /// Seeds for generated names; each character of the value is one seed.
    /// Defaults to ASCII alphanumerics.
    #[arg(long = "seeds")]
    seeds: Option<String>,

    /// File containing space-separated seeds to add.
    #[arg(long = "seed-file")]
    seed_file: Option<PathBuf>,

    /// Include test code.
    #[arg(long = "include-tests", short = 't')]
    include_tests: bool,

    /// Enable verbose mode.
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Enable debug mode.
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.debug);

    let opts = match build_options(&cli) {
        Ok(opts) => opts,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(e.exit_code().code());
        }
    };

    match murk::pipeline::run(&opts, &cli.bundles) {
        Ok(_) => {
            tracing::info!("done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::from(e.exit_code().code())
        }
    }
}

fn build_options(cli: &Cli) -> Result<Options, MurkError> {
    let mut opts = Options::new(&cli.out_dir);
    opts.overwrite = cli.overwrite;
    opts.obfuscate_internal_exports = cli.obfuscate_internal_exports;
    opts.include_tests = cli.include_tests;
    opts.seed_file = cli.seed_file.clone();
    if let Some(seeds) = &cli.seeds {
        opts.seeds = seed_chars(seeds);
    }
    for pattern in &cli.keep {
        opts.keep
            .add_list(pattern)
            .map_err(|e| MurkError::invalid_args(e.to_string()))?;
    }
    Ok(opts)
}

/// Initialize the tracing subscriber; `RUST_LOG` overrides the flags.
fn init_tracing(verbose: bool, debug: bool) {
    use tracing_subscriber::EnvFilter;

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "error"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

use anyhow::*;
use chunkfont::{
    config::{ChunkConfig, DEFAULT_CONFIG},
    FontReport, HarfbuzzBackend, PyftsubsetBackend,
};
use clap::{Parser, ValueEnum};
use std::{io, path::PathBuf, process::ExitCode};
use tracing::{error, info};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Backend {
    /// Subset fonts in-process with HarfBuzz.
    Harfbuzz,
    /// Subset fonts by running fonttools' `pyftsubset`.
    Pyftsubset,
}

/// Splits fonts into small webfont subsets grouped by character, and writes a stylesheet using
/// them.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The font files to split, or directories containing them.
    fonts: Vec<PathBuf>,

    /// The directory to write subsets and `stylesheet.css` to.
    #[arg(short, long, required_unless_present = "write_default_config")]
    out: Option<PathBuf>,

    /// The configuration file to use. `.json` files are read as JSON, anything else as TOML.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the directory containing the classifiers' reference tables.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// How to subset fonts.
    #[arg(long, value_enum, default_value_t = Backend::Harfbuzz)]
    backend: Backend,

    /// Whether to enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Writes the default configuration to a file and exits.
    #[arg(long)]
    write_default_config: Option<PathBuf>,
}

fn log_report(reports: &[FontReport]) {
    for report in reports {
        info!(
            "{} ({}): {} characters, {} groups, {} chunks, {} dropped",
            report.font_family,
            report.file_name,
            report.characters,
            report.buckets,
            report.chunks,
            report.dropped,
        );
    }
}

async fn run(args: Args) -> Result<()> {
    if let Some(path) = &args.write_default_config {
        ensure!(!path.exists(), "'{}' already exists.", path.display());
        std::fs::write(path, DEFAULT_CONFIG)?;
        info!("Created configuration at {}.", path.display());
        return Ok(());
    }
    let Some(out) = &args.out else {
        bail!("No output directory given.");
    };

    let mut config = match &args.config {
        Some(path) => ChunkConfig::load(path)?,
        None => ChunkConfig::default_config()?,
    };
    if let Some(assets) = args.assets {
        config.assets_dir = assets;
    }

    let paths = chunkfont::find_font_files(&args.fonts)?;
    ensure!(!paths.is_empty(), "No font files given.");
    let fonts = chunkfont::load_fonts(&paths)?;

    let ctx = match args.backend {
        Backend::Harfbuzz => chunkfont::split_fonts(&config, &HarfbuzzBackend, &fonts, out).await?,
        Backend::Pyftsubset => {
            let backend = PyftsubsetBackend::probe().await?;
            chunkfont::split_fonts(&config, &backend, &fonts, out).await?
        }
    };

    log_report(ctx.reports());
    info!("Done transforming fonts!");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    let filter = if args.verbose { chunkfont_common::FILTER_SPEC } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(args).await {
        Result::Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

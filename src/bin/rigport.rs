//! Command line driver.
//!
//! Usage:
//!   rigport --bundle-dir dumps --out out
//!   rigport --config import.json --name Hero --name Sword --fail-fast
//!
//! Writes the extracted files under the output directory, plus
//! `scene.json` (the reconstructed scene) and `report.json` (the batch report).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;

use rigport::{BatchImporter, BundleSource, ImportConfig, MemoryHost, MemoryProvider};

#[derive(Parser, Debug)]
#[command(name = "rigport")]
#[command(version, about = "Rebuild skeletons, skinned meshes, textures and audio from decoded asset graphs")]
struct Cli {
    /// JSON import config; explicit flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// A single decoded graph dump
    #[arg(long, conflicts_with = "bundle_dir")]
    bundle_file: Option<PathBuf>,

    /// Directory searched recursively for decoded graph dumps
    #[arg(long)]
    bundle_dir: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Only import objects with this name (repeatable)
    #[arg(short, long = "name")]
    names: Vec<String>,

    /// Abort on the first failing object
    #[arg(long)]
    fail_fast: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    config.validate()?;

    let provider = match &config.bundle_source {
        BundleSource::File(path) => MemoryProvider::load_file(path),
        BundleSource::Directory(path) => MemoryProvider::load_dir(path),
    }
    .with_context(|| format!("Failed to load {}", config.bundle_source.path().display()))?;

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;

    let mut host = MemoryHost::new();
    let report = BatchImporter::new(&provider, &mut host, &config).run()?;

    write_json(&config.output_dir.join("scene.json"), &host.summary())?;
    write_json(&config.output_dir.join("report.json"), &report)?;

    for (kind, count) in report.failure_counts() {
        log::warn!("{count} object(s) failed with {kind:?}");
    }
    println!(
        "Imported {} object(s), skipped {}, failed {}",
        report.imported.len(),
        report.skipped,
        report.failures.len()
    );
    Ok(())
}

fn build_config(cli: &Cli) -> Result<ImportConfig> {
    let source = match (&cli.bundle_file, &cli.bundle_dir) {
        (Some(file), _) => Some(BundleSource::File(file.clone())),
        (None, Some(dir)) => Some(BundleSource::Directory(dir.clone())),
        (None, None) => None,
    };

    let mut config = match (&cli.config, source) {
        (Some(path), source) => {
            let mut config = ImportConfig::load(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            if let Some(source) = source {
                config.bundle_source = source;
            }
            config
        }
        (None, Some(source)) => ImportConfig::new(source, "out"),
        (None, None) => bail!("either --config, --bundle-file or --bundle-dir is required"),
    };

    if let Some(out) = &cli.out {
        config = config.with_output_dir(out);
    }
    if !cli.names.is_empty() {
        config = config.with_names(cli.names.iter().cloned());
    }
    if cli.fail_fast {
        config = config.with_continue_on_error(false);
    }
    Ok(config)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

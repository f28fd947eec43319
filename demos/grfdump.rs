//! grfdump - load a set of NewGRFs and print what they define.
//!
//! Usage:
//!   grfdump a.grf b.grf              - Load files in order, no parameters
//!   grfdump --config newgrf.json     - Load the files and settings of a config
//!
//! Set `RUST_LOG=grfkit=debug` for a record-by-record trace.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use grfkit::config::LoadConfig;
use grfkit::diagnostics::Severity;
use grfkit::loader::Loader;
use grfkit::registry::GrfFile;
use grfkit::source::{DiskFiles, LoadedSprite};

#[derive(Parser, Debug)]
#[command(name = "grfdump", version, about = "Decode NewGRF pseudo-sprites", long_about = None)]
struct Cli {
    /// JSON load configuration; file paths are relative to its directory
    #[arg(short, long, conflicts_with = "files")]
    config: Option<PathBuf>,

    /// NewGRF files to load, in order
    files: Vec<String>,

    /// Also list station specs and generic strings
    #[arg(short, long)]
    detailed: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();

    let cli = Cli::parse();
    let (root, config) = match &cli.config {
        Some(path) => {
            let config = LoadConfig::from_file(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let root = path.parent().unwrap_or(Path::new(".")).to_path_buf();
            (root, config)
        }
        None if cli.files.is_empty() => bail!("no NewGRF files given"),
        None => {
            let config = cli
                .files
                .iter()
                .fold(LoadConfig::default(), |cfg, f| cfg.with_file(f.as_str(), &[]));
            (PathBuf::from("."), config)
        }
    };

    let mut loader = Loader::new(DiskFiles::new(root), config);
    let mut sprites: Vec<LoadedSprite> = Vec::new();
    loader.load_with(&mut sprites).context("loading NewGRFs")?;

    for file in loader.registry().iter() {
        print_file(file, cli.detailed);
    }

    let data = loader.data();
    println!();
    println!("sprite groups:  {}", data.groups.len());
    println!("custom stations: {}", data.custom_stations.len());
    println!("sounds:         {}", data.sounds.len());
    println!("raw sprites:    {}", sprites.len());

    let diag = loader.diagnostics();
    if !diag.entries().is_empty() {
        println!();
        for d in diag.entries() {
            println!("{d}");
        }
    }
    println!(
        "\n{} notices, {} warnings, {} errors, {} fatal",
        diag.count(Severity::Notice),
        diag.count(Severity::Warning),
        diag.count(Severity::Error),
        diag.count(Severity::Fatal),
    );
    Ok(())
}

fn print_file(file: &GrfFile, detailed: bool) {
    println!(
        "{}  [{:08X}] v{} {:?}{}",
        file.filename,
        file.grfid,
        file.version,
        file.status,
        if file.is_unsafe { " (unsafe)" } else { "" }
    );
    if !file.name.is_empty() {
        println!("  name:        {}", file.name);
    }
    if !file.description.is_empty() {
        println!("  description: {}", file.description);
    }
    if file.params.end() > 0 {
        println!("  params:      {:?}", file.params.defined());
    }
    for label in &file.labels {
        println!(
            "  label {:#04X} at record {} (offset {:#X})",
            label.id, label.record, label.position
        );
    }
    if !detailed {
        return;
    }
    for (id, station) in file.stations.iter().enumerate() {
        if let Some(station) = station {
            println!(
                "  station {id}: {} ({} cargo groups)",
                station.name.as_deref().unwrap_or("<unnamed>"),
                station.groups.len()
            );
        }
    }
    for (id, text) in &file.generic_strings {
        println!("  string {id:#06X}: {text}");
    }
}

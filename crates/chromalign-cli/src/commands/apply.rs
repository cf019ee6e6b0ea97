use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;

use chromalign_core::channel::Transform;
use chromalign_core::io::{export_aligned, load_channels};

#[derive(Args)]
pub struct ApplyArgs {
    /// Input images: one multi-page TIFF, one RGB image, or one file per channel
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// TOML file with one [[transform]] table per channel
    #[arg(short, long)]
    pub transforms: PathBuf,

    /// Output path for the aligned multi-page TIFF
    #[arg(short, long)]
    pub output: PathBuf,
}

/// On-disk transform list:
///
/// ```toml
/// [[transform]]
/// dx = 1.5
/// dy = -2.0
/// angle_deg = 0.25
/// ```
#[derive(Deserialize)]
struct TransformFile {
    #[serde(default)]
    transform: Vec<Transform>,
}

pub fn run(args: &ApplyArgs) -> Result<()> {
    let set = load_channels(&args.files)?;

    let text = std::fs::read_to_string(&args.transforms)
        .with_context(|| format!("reading {}", args.transforms.display()))?;
    let file: TransformFile = toml::from_str(&text)
        .with_context(|| format!("parsing {}", args.transforms.display()))?;

    let report = export_aligned(&set, &file.transform, &args.output)?;

    println!(
        "Wrote {} pages to {} ({})",
        report.pages,
        report.path.display(),
        report.description
    );
    Ok(())
}

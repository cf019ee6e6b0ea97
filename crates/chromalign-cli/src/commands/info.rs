use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use chromalign_core::io::load_channels;

#[derive(Args)]
pub struct InfoArgs {
    /// Input images: one multi-page TIFF, one RGB image, or one file per channel
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let set = load_channels(&args.files)?;

    println!("Channels:    {}", set.len());
    println!("Dimensions:  {}x{}", set.width(), set.height());
    for (index, channel) in set.channels().iter().enumerate() {
        println!(
            "  channel {index}: {} bit, range [{:.4}, {:.4}]",
            channel.original_bit_depth,
            channel.data.iter().cloned().fold(f32::INFINITY, f32::min),
            channel
                .data
                .iter()
                .cloned()
                .fold(f32::NEG_INFINITY, f32::max),
        );
    }
    if let Some(description) = set.description() {
        println!("Description: {description}");
    }
    for path in set.source_paths() {
        println!("Source:      {}", path.display());
    }

    Ok(())
}

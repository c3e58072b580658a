// Renders every catalog effect for one image, side by side on disk

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use tracing::info;

use filter_booth::{
    config::Config,
    effects::{EffectKind, EffectRegistry},
    video::{Frame, Scratch, StillImageSource, StreamConstraints, TestPatternSource, VideoSource},
};

#[derive(Parser)]
#[command(name = "preview", version, about = "Render every filter effect for one image")]
struct Cli {
    /// Source image (default: one frame of the test pattern)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory the PNG previews are written to
    #[arg(short, long, default_value = "preview")]
    output_dir: PathBuf,

    /// Configuration file for effect parameters (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.validate()?;

    let source_frame = read_one_frame(&cli)?;
    info!("Source frame: {}", source_frame.geometry());
    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("creating {}", cli.output_dir.display()))?;

    // Every catalog entry, resolved by name exactly as the booth would
    let registry = EffectRegistry::new();
    let catalog = config.catalog();
    let jobs: Vec<(String, EffectKind)> = catalog
        .iter()
        .map(|filter| (filter.name.clone(), registry.resolve(&filter.name)))
        .collect();

    jobs.par_iter().try_for_each(|(name, kind)| -> Result<()> {
        let mut frame = source_frame.clone();
        let mut scratch = Scratch::new();
        kind.apply(&mut frame, &config.effects, &mut scratch);

        let stem: Vec<&str> = name
            .split(|c: char| !c.is_alphanumeric())
            .filter(|part| !part.is_empty())
            .collect();
        let file_name = format!("{}.png", stem.join("-").to_lowercase());
        let path = cli.output_dir.join(file_name);
        frame.save_png(&path)?;
        info!("{:<14} -> {}", name, path.display());
        Ok(())
    })?;

    println!("Rendered {} previews into {}", jobs.len(), cli.output_dir.display());
    Ok(())
}

fn read_one_frame(cli: &Cli) -> Result<Frame> {
    let mut source: Box<dyn VideoSource> = match &cli.input {
        Some(path) => Box::new(StillImageSource::new(path)),
        None => Box::new(TestPatternSource::new()),
    };

    source.open(&StreamConstraints::basic())?;
    let mut frame = Frame::new_blank(0, 0);
    let read = source.read_frame(&mut frame);
    source.close();
    read?;
    Ok(frame)
}

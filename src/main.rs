use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use filter_booth::{
    config::Config,
    effects::{EffectRegistry, FilterCatalog},
    pipeline::{ActiveFilter, CaptureController, DirectoryPhotoStore, FrameLoop, Surface},
    video::{StillImageSource, TestPatternSource, VideoSource},
};

#[derive(Parser)]
#[command(
    name = "filter-booth",
    version,
    about = "Run a live filter over a video source and save a snapshot",
    long_about = "Filter Booth reads frames from an image, a synthetic test pattern or a webcam, applies the selected filter at display rate, then captures the filtered frame and stores it as a photo."
)]
struct Cli {
    /// Image file to use as the video source (default: webcam if built with
    /// the `camera` feature, otherwise a test pattern)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Use the synthetic test pattern even when a webcam is available
    #[arg(long, conflicts_with = "input")]
    test_pattern: bool,

    /// Filter to apply, by catalog id or exact name ("Black & White")
    #[arg(short, long, default_value = "Normal")]
    filter: String,

    /// Number of frames to process before capturing
    #[arg(short = 'n', long, default_value_t = 30)]
    frames: u64,

    /// Directory photos are stored in (overrides the configuration)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Optional photo description
    #[arg(short, long)]
    description: Option<String>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List the filter catalog and exit
    #[arg(long)]
    list_filters: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Filter Booth v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    if let Some(dir) = &cli.output_dir {
        config.capture.output_dir = dir.clone();
    }
    config.validate()?;

    let catalog = config.catalog();
    if cli.list_filters {
        print_catalog(&catalog);
        return Ok(());
    }

    let filter_id = resolve_filter(&catalog, &cli.filter)?;
    let selection = Arc::new(ActiveFilter::new(EffectRegistry::new().bind(&catalog)));
    let kind = selection.select_filter(&filter_id);
    info!("Using filter {} (id {}) -> {}", cli.filter, filter_id, kind);

    let surface = Arc::new(Surface::new());
    let mut loop_config = config.loop_config();
    loop_config.max_frames = Some(cli.frames.max(1));

    // Acquisition may sleep through retries, keep it off the async workers
    let source = open_source(&cli, &config);
    let params = config.effects.clone();
    let loop_selection = Arc::clone(&selection);
    let loop_surface = Arc::clone(&surface);
    let stats = tokio::task::spawn_blocking(move || -> Result<_> {
        let mut frame_loop =
            FrameLoop::start(source, loop_config, params, loop_selection, loop_surface)
                .map_err(|e| anyhow::anyhow!("{} ({})", e.user_message(), e))?;
        info!("Stream geometry: {}", frame_loop.geometry());
        Ok(frame_loop.join())
    })
    .await
    .context("frame loop task failed")??;

    info!(
        "Processed {} frames ({} dropped, {} read errors)",
        stats.frames_processed, stats.frames_dropped, stats.read_errors
    );
    if stats.frames_processed < cli.frames {
        warn!("Video stream ended after {} of {} frames", stats.frames_processed, cli.frames);
    }

    // Capture the last presented frame and store it
    let capture = CaptureController::new(surface, selection)
        .with_jpeg_quality(config.capture.jpeg_quality);
    let photo = capture.capture(cli.description.as_deref())?;

    let store = Arc::new(
        DirectoryPhotoStore::new(&config.capture.output_dir, catalog)
            .with_prefix(config.capture.file_prefix.clone()),
    );
    let stored = capture.submit(store, photo)?.wait().await?;

    info!("Photo saved to: {:?}", stored.image_path);
    Ok(())
}

/// Video source factory for the frame loop thread
fn open_source(cli: &Cli, config: &Config) -> impl FnOnce() -> Box<dyn VideoSource> + Send + 'static {
    let input = cli.input.clone();
    let test_pattern = cli.test_pattern;
    let device_index = config.camera.device_index;

    move || -> Box<dyn VideoSource> {
        if let Some(path) = input {
            return Box::new(StillImageSource::new(path));
        }
        if test_pattern {
            return Box::new(TestPatternSource::new());
        }
        camera_or_pattern(device_index)
    }
}

#[cfg(feature = "camera")]
fn camera_or_pattern(device_index: u32) -> Box<dyn VideoSource> {
    Box::new(filter_booth::video::NokhwaSource::new(device_index))
}

#[cfg(not(feature = "camera"))]
fn camera_or_pattern(_device_index: u32) -> Box<dyn VideoSource> {
    info!("Built without the camera feature, using the test pattern");
    Box::new(TestPatternSource::new())
}

/// Accept either a catalog id or an exact filter name
fn resolve_filter(catalog: &FilterCatalog, filter: &str) -> Result<String> {
    if let Some(descriptor) = catalog.get(filter) {
        return Ok(descriptor.id.clone());
    }
    if let Some(descriptor) = catalog.find_by_name(filter) {
        return Ok(descriptor.id.clone());
    }
    bail!("Unknown filter: {} (use --list-filters to see the catalog)", filter)
}

fn print_catalog(catalog: &FilterCatalog) {
    println!("{:<4} {:<16} {:<10} DESCRIPTION", "ID", "NAME", "CATEGORY");
    for filter in catalog.iter() {
        println!(
            "{:<4} {:<16} {:<10} {}",
            filter.id,
            filter.name,
            filter.category.as_deref().unwrap_or("-"),
            filter.description.as_deref().unwrap_or("")
        );
    }
}

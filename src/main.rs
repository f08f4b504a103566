//! LED matrix display
//!
//! Plays a color cycle, a single image, or a folder of animation frames on
//! an RGB LED matrix until Ctrl+C.
//!
//! ## Usage
//! ```sh
//! sudo ./target/release/matrix-display --led-rows 32 --led-cols 64 play sample
//! sudo ./target/release/matrix-display cycle
//! sudo ./target/release/matrix-display show path/to/image.png
//! ./target/release/matrix-display list
//! ```
//!
//! Exit status is 0 after a clean shutdown and 1 after any error.

use clap::{Parser, Subcommand};
use matrix_display::animation::{AnimationLoop, StopReason};
use matrix_display::color_cycle::ColorCycle;
use matrix_display::driver::{MemoryPanel, Panel};
#[cfg(feature = "hardware")]
use matrix_display::hardware::RpiPanel;
use matrix_display::sequence::{EndPolicy, ImageSequence, SequenceOptions};
use matrix_display::source::FrameSource;
use matrix_display::{Error, PanelConfig, media, setup_signal_handler};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Drive an RGB LED matrix panel
#[derive(Parser)]
#[command(name = "matrix-display")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    mode: Mode,

    #[command(flatten)]
    panel: PanelConfig,

    /// JSON file with panel settings; replaces the --led-* flags
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Render into memory instead of the LED hardware
    #[arg(long, global = true)]
    headless: bool,

    /// Directory holding one sub-folder per animation
    #[arg(long, global = true, default_value = "animations")]
    animations_dir: PathBuf,

    /// Delay between images, in milliseconds
    #[arg(long, global = true, default_value_t = 100)]
    frame_delay_ms: u64,
}

#[derive(Subcommand)]
enum Mode {
    #[command(flatten)]
    Playback(Playback),
    /// List the available animations
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Modes that drive the panel.
#[derive(Subcommand)]
enum Playback {
    /// Sweep the whole panel through the hue circle
    Cycle,
    /// Play the frames of <animations-dir>/<NAME> in file name order
    Play {
        /// Animation folder name
        name: String,
        /// Stop after the last frame instead of looping
        #[arg(long)]
        once: bool,
        /// Shrink frames larger than the panel
        #[arg(long)]
        fit: bool,
    },
    /// Show one image until interrupted
    Show {
        /// Image file (PNG or JPEG)
        path: PathBuf,
        /// Draw the image as-is instead of shrinking it to the panel
        #[arg(long)]
        no_fit: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_ansi(false) // Disable ANSI color codes for systemd/journald
        .compact()
        .init();

    exit_status(run(Args::parse()))
}

/// 0 after a clean shutdown or an exhausted one-shot source, 1 after any error.
fn exit_status(result: Result<(), Error>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Error> {
    let playback = match args.mode {
        Mode::List { json } => return list(&args.animations_dir, json),
        Mode::Playback(playback) => playback,
    };

    let panel = match &args.config {
        Some(path) => PanelConfig::from_json_file(path)?,
        None => {
            args.panel.validate()?;
            args.panel
        }
    };
    let pacing = Duration::from_millis(args.frame_delay_ms);

    tracing::info!("Matrix display v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Panel: {}x{} (chain {}, parallel {})",
        panel.cols,
        panel.rows,
        panel.chain,
        panel.parallel
    );

    let running = setup_signal_handler()?;
    let dir = &args.animations_dir;

    let swaps = if args.headless {
        play(playback, dir, &panel, pacing, &running, MemoryPanel::configure)?
    } else {
        play(playback, dir, &panel, pacing, &running, open_hardware)?
    };

    tracing::info!("Shutting down cleanly after {} frames.", swaps);
    Ok(())
}

/// Build the frame source for `playback` and whether its last frame is held
/// until interrupted.
fn resolve_source(
    playback: Playback,
    animations_dir: &Path,
    panel: &PanelConfig,
    pacing: Duration,
) -> Result<(FrameSource, bool), Error> {
    Ok(match playback {
        Playback::Cycle => (FrameSource::from(ColorCycle::new()), false),
        Playback::Play { name, once, fit } => {
            let dir = media::animation_dir(animations_dir, &name);
            let options = SequenceOptions {
                end: if once { EndPolicy::Stop } else { EndPolicy::Loop },
                fit,
                pacing,
            };
            let sequence = ImageSequence::load(&dir, panel, options)?;
            (FrameSource::from(sequence), false)
        }
        Playback::Show { path, no_fit } => {
            let options = SequenceOptions {
                fit: !no_fit,
                pacing,
                ..SequenceOptions::single_image()
            };
            let sequence = ImageSequence::single(&path, panel, options)?;
            (FrameSource::from(sequence), true)
        }
    })
}

/// Resolve the source, then open the panel with `open` and play until the
/// source runs out or `running` goes false. Returns the number of swaps.
///
/// The panel is opened only after the source resolved, so a bad animation
/// name never touches the hardware.
fn play<P: Panel>(
    playback: Playback,
    animations_dir: &Path,
    panel: &PanelConfig,
    pacing: Duration,
    running: &AtomicBool,
    open: impl FnOnce(&PanelConfig) -> Result<P, Error>,
) -> Result<u64, Error> {
    let (mut source, hold) = resolve_source(playback, animations_dir, panel, pacing)?;

    let mut animation = AnimationLoop::new(open(panel)?);
    let reason = animation.run(&mut source, running)?;

    if reason == StopReason::Exhausted && hold {
        animation.hold_until_interrupted(running);
    }
    Ok(animation.swap_count())
}

#[cfg(feature = "hardware")]
fn open_hardware(panel: &PanelConfig) -> Result<RpiPanel, Error> {
    RpiPanel::configure(panel)
}

#[cfg(not(feature = "hardware"))]
fn open_hardware(_panel: &PanelConfig) -> Result<MemoryPanel, Error> {
    Err(Error::DriverInit(
        "built without the 'hardware' feature; rebuild with --features hardware or pass --headless"
            .to_string(),
    ))
}

fn list(root: &Path, json: bool) -> Result<(), Error> {
    let animations = media::list_animations(root);

    if json {
        println!("{}", serde_json::to_string_pretty(&animations)?);
        return Ok(());
    }

    if animations.is_empty() {
        println!("No animations found in {}", root.display());
    }
    for entry in &animations {
        println!("{:<24} {:>5} frames", entry.name, entry.frame_count);
    }
    Ok(())
}

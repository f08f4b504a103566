//! Drive an RGB LED matrix with color cycles, still images and frame
//! animations.
//!
//! The crate is split into small pieces:
//! - `config`: panel geometry and driver tuning
//! - `driver` / `hardware`: the panel capability trait and its backends
//! - `color_cycle`, `sequence`, `source`: where frames come from
//! - `media`: finding animation folders and their frames on disk
//! - `animation`: the double-buffered, fixed-pacing render loop
//!
//! Shared helpers (color type, shutdown signal) live here.

pub mod animation;
pub mod color_cycle;
pub mod config;
pub mod driver;
pub mod error;
#[cfg(feature = "hardware")]
pub mod hardware;
pub mod media;
pub mod sequence;
pub mod source;

pub use config::PanelConfig;
pub use error::Error;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ── Color ──────────────────────────────────────────────────────────

/// Our own color type, decoupled from the hardware crate.
///
/// This lets us test frame logic on any machine without `rpi-led-matrix`.
/// At the hardware boundary, we convert via `Into<LedColor>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<image::Rgb<u8>> for Color {
    fn from(pixel: image::Rgb<u8>) -> Self {
        Self::new(pixel[0], pixel[1], pixel[2])
    }
}

/// Convert our Color to the hardware crate's LedColor at the boundary.
#[cfg(feature = "hardware")]
impl From<Color> for rpi_led_matrix::LedColor {
    fn from(c: Color) -> Self {
        rpi_led_matrix::LedColor {
            red: c.r,
            green: c.g,
            blue: c.b,
        }
    }
}

// ── Shutdown signal ────────────────────────────────────────────────

/// Set up a Ctrl+C / SIGTERM handler that sets `running` to false.
///
/// The animation loop polls the flag once per tick, so shutdown latency is
/// bounded by one pacing interval.
pub fn setup_signal_handler() -> Result<Arc<AtomicBool>, Error> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    Ok(running)
}

/// Check if the main loop should keep running.
pub fn is_running(running: &AtomicBool) -> bool {
    running.load(Ordering::SeqCst)
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn color_new() {
        let c = Color::new(10, 20, 30);
        assert_eq!((c.r, c.g, c.b), (10, 20, 30));
    }

    #[test]
    fn color_from_rgb_pixel() {
        assert_eq!(Color::from(image::Rgb([1, 2, 3])), Color::new(1, 2, 3));
    }

    #[test]
    fn is_running_reads_flag() {
        let flag = AtomicBool::new(true);
        assert!(is_running(&flag));
        flag.store(false, Ordering::SeqCst);
        assert!(!is_running(&flag));
    }
}

//! Error type shared by every module of the crate.
//!
//! ## Rust concepts
//! - `thiserror` derives `Display` and `std::error::Error` from attributes
//! - `#[from]` generates `From` impls so `?` converts foreign errors for us

use std::path::PathBuf;

/// Everything that can go wrong between reading the config and swapping
/// the last frame.
///
/// Operator shutdown is deliberately absent: it is a normal way for the
/// animation loop to finish, not a failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `PanelConfig` field is out of range or malformed.
    #[error("invalid panel config: {field} = {value} ({reason})")]
    Config {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// The native driver rejected the options or the hardware is unavailable.
    #[error("LED driver initialization failed: {0}")]
    DriverInit(String),

    /// The requested animation folder is missing or is not a directory.
    #[error("animation directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// The animation folder exists but contains no frame images.
    #[error("no image files found in {}", .0.display())]
    EmptyAnimation(PathBuf),

    /// A frame file disappeared between listing and loading.
    #[error("frame file missing: {}", .0.display())]
    MissingFrameFile(PathBuf),

    /// A whole pass over the frame queue produced nothing to display.
    #[error("none of the {count} frames in {} could be loaded", .dir.display())]
    NoPlayableFrames { dir: PathBuf, count: usize },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

impl Error {
    /// Whether the animation loop may skip past this error and keep going.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::MissingFrameFile(_) | Error::Image(_))
    }
}

//! Image frames read from disk, one per tick.
//!
//! Frames are decoded lazily so a long animation never has to fit in memory.
//! A file that vanished or fails to decode is logged and skipped; only a
//! whole pass with nothing playable stops playback.

use crate::{Error, PanelConfig, media};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, RgbImage};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default delay between two images of a sequence.
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

/// What happens after the last frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EndPolicy {
    /// Start over at the first frame.
    #[default]
    Loop,
    /// Report exhaustion; the animation loop stops.
    Stop,
}

/// Per-mode playback settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequenceOptions {
    pub end: EndPolicy,
    /// Shrink frames larger than the panel, keeping aspect ratio.
    pub fit: bool,
    /// Delay between frames.
    pub pacing: Duration,
}

impl SequenceOptions {
    /// Animation playback: loop forever, frames drawn as-is.
    pub fn animation() -> Self {
        Self {
            end: EndPolicy::Loop,
            fit: false,
            pacing: DEFAULT_FRAME_DELAY,
        }
    }

    /// Single image display: one frame, shrunk to fit.
    pub fn single_image() -> Self {
        Self {
            end: EndPolicy::Stop,
            fit: true,
            pacing: DEFAULT_FRAME_DELAY,
        }
    }
}

/// Ordered queue of frame files with a play cursor.
#[derive(Debug)]
pub struct ImageSequence {
    dir: PathBuf,
    paths: Vec<PathBuf>,
    index: usize,
    bounds: (u32, u32),
    options: SequenceOptions,
}

impl ImageSequence {
    /// Scan an animation folder once and prepare to play it.
    pub fn load(dir: &Path, panel: &PanelConfig, options: SequenceOptions) -> Result<Self, Error> {
        let paths = media::frame_paths(dir)?;
        tracing::info!("Found {} frames in {}", paths.len(), dir.display());
        Ok(Self::from_paths(dir.to_path_buf(), paths, panel, options))
    }

    /// A one-frame sequence showing a single image file.
    pub fn single(
        path: &Path,
        panel: &PanelConfig,
        options: SequenceOptions,
    ) -> Result<Self, Error> {
        if !path.is_file() {
            return Err(Error::MissingFrameFile(path.to_path_buf()));
        }
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self::from_paths(dir, vec![path.to_path_buf()], panel, options))
    }

    fn from_paths(
        dir: PathBuf,
        paths: Vec<PathBuf>,
        panel: &PanelConfig,
        options: SequenceOptions,
    ) -> Self {
        Self {
            dir,
            paths,
            index: 0,
            bounds: (panel.width(), panel.height()),
            options,
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Position of the next frame to be loaded.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn options(&self) -> &SequenceOptions {
        &self.options
    }

    /// Load the frame under the cursor and advance.
    ///
    /// Returns `Ok(None)` once a `Stop` sequence has played its last frame.
    pub fn next_frame(&mut self) -> Result<Option<RgbImage>, Error> {
        let mut skipped = 0;

        loop {
            if self.index >= self.paths.len() {
                match self.options.end {
                    EndPolicy::Loop => self.index = 0,
                    EndPolicy::Stop => return Ok(None),
                }
            }

            let path = &self.paths[self.index];
            self.index += 1;

            let bounds = self.options.fit.then_some(self.bounds);
            match load_frame(path, bounds) {
                Ok(img) => return Ok(Some(img)),
                Err(e) if e.is_recoverable() => {
                    tracing::warn!("Skipping frame {}: {}", path.display(), e);
                    skipped += 1;
                    if skipped >= self.paths.len() {
                        return Err(Error::NoPlayableFrames {
                            dir: self.dir.clone(),
                            count: self.paths.len(),
                        });
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Decode one frame as 8-bit RGB, optionally shrinking it into `bounds`.
pub fn load_frame(path: &Path, bounds: Option<(u32, u32)>) -> Result<RgbImage, Error> {
    let reader = ImageReader::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::MissingFrameFile(path.to_path_buf()),
        _ => Error::Io(e),
    })?;
    let img = reader.decode()?;

    let img = match bounds {
        Some((width, height)) => shrink_to_fit(img, width, height),
        None => img,
    };
    Ok(img.to_rgb8())
}

/// Scale `img` down to fit within `width` x `height`. Never enlarges.
pub fn shrink_to_fit(img: DynamicImage, width: u32, height: u32) -> DynamicImage {
    if img.width() <= width && img.height() <= height {
        return img;
    }
    img.resize(width, height, FilterType::Lanczos3)
}

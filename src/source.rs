//! Where frames come from.
//!
//! ## Rust concepts
//! - `enum` with data variants: one `FrameSource` type covers every mode,
//!   picked once at startup, and `match` forwards each call to the variant

use crate::color_cycle::{self, ColorCycle};
use crate::driver::Panel;
use crate::sequence::ImageSequence;
use crate::{Color, Error};
use image::RgbImage;
use std::time::Duration;

/// One frame worth of pixels, ready to be written to a buffer.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    /// Every pixel the same color.
    Solid(Color),
    /// An image drawn from the top-left corner.
    Image(RgbImage),
}

impl Frame {
    /// Paint this frame into an off-screen buffer of `panel`.
    pub fn draw<P: Panel>(&self, panel: &P, buffer: &mut P::Buffer) {
        match self {
            Frame::Solid(color) => panel.fill_solid(buffer, *color),
            Frame::Image(img) => panel.set_image(buffer, img),
        }
    }
}

/// The active animation.
#[derive(Debug)]
pub enum FrameSource {
    ColorCycle(ColorCycle),
    ImageSequence(ImageSequence),
}

impl FrameSource {
    /// Produce the next frame, or `None` once a finite source is exhausted.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, Error> {
        match self {
            FrameSource::ColorCycle(cycle) => Ok(Some(Frame::Solid(cycle.next_color()))),
            FrameSource::ImageSequence(seq) => Ok(seq.next_frame()?.map(Frame::Image)),
        }
    }

    /// Fixed delay between two frames.
    pub fn pacing(&self) -> Duration {
        match self {
            FrameSource::ColorCycle(_) => color_cycle::PACING,
            FrameSource::ImageSequence(seq) => seq.options().pacing,
        }
    }

    /// Short name used in log lines.
    pub fn describe(&self) -> &'static str {
        match self {
            FrameSource::ColorCycle(_) => "color cycle",
            FrameSource::ImageSequence(seq) if seq.paths().len() == 1 => "image",
            FrameSource::ImageSequence(_) => "image sequence",
        }
    }
}

impl From<ColorCycle> for FrameSource {
    fn from(cycle: ColorCycle) -> Self {
        FrameSource::ColorCycle(cycle)
    }
}

impl From<ImageSequence> for FrameSource {
    fn from(seq: ImageSequence) -> Self {
        FrameSource::ImageSequence(seq)
    }
}

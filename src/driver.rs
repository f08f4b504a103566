//! The panel capability set the animation loop is written against.
//!
//! The native driver owns the real frame buffers. We only ever ask it for an
//! off-screen buffer, paint into it, and hand it back in exchange for the one
//! that was visible. [`Panel`] captures exactly that, so the loop can run
//! against the hardware (`hardware::RpiPanel`) or against [`MemoryPanel`].

use crate::{Color, Error, PanelConfig};
use image::RgbImage;

/// What the animation loop needs from a display backend.
pub trait Panel {
    /// Off-screen pixel buffer owned by the backend.
    type Buffer;

    /// Hand out a fresh off-screen buffer.
    fn create_frame_buffer(&mut self) -> Result<Self::Buffer, Error>;

    /// Paint every pixel of `buffer` with `color`.
    fn fill_solid(&self, buffer: &mut Self::Buffer, color: Color);

    /// Clear `buffer` and draw `image` at the origin, clipped to the panel.
    fn set_image(&self, buffer: &mut Self::Buffer, image: &RgbImage);

    /// Show `buffer` at the next vertical sync and return the buffer that was
    /// visible until now, to be used as the next off-screen target.
    fn swap_on_sync(&mut self, buffer: Self::Buffer) -> Self::Buffer;

    /// Display surface size as `(width, height)`.
    fn size(&self) -> (u32, u32);
}

// ── In-memory backend ──────────────────────────────────────────────

/// Pixel grid standing in for one of the driver's frame canvases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl MemoryBuffer {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(self.offset(x, y)).copied()
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    fn set(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            let offset = self.offset(x, y);
            self.pixels[offset] = color;
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Software double-buffered panel.
///
/// Behaves like the hardware backend from the loop's point of view: two
/// buffers, one visible, exchanged on swap. Used by the tests and by
/// `--headless` runs on machines without a panel attached.
#[derive(Debug)]
pub struct MemoryPanel {
    width: u32,
    height: u32,
    visible: MemoryBuffer,
    spare: Option<MemoryBuffer>,
    swaps: u64,
}

impl MemoryPanel {
    /// Validate `config` and allocate the visible and off-screen buffers.
    pub fn configure(config: &PanelConfig) -> Result<Self, Error> {
        config.validate()?;
        let (width, height) = (config.width(), config.height());
        tracing::debug!("Memory panel: {}x{}", width, height);
        Ok(Self {
            width,
            height,
            visible: MemoryBuffer::new(width, height),
            spare: Some(MemoryBuffer::new(width, height)),
            swaps: 0,
        })
    }

    /// What the panel is currently showing.
    pub fn visible(&self) -> &MemoryBuffer {
        &self.visible
    }

    /// Number of completed swaps.
    pub fn swap_count(&self) -> u64 {
        self.swaps
    }
}

impl Panel for MemoryPanel {
    type Buffer = MemoryBuffer;

    fn create_frame_buffer(&mut self) -> Result<MemoryBuffer, Error> {
        // The driver hands out the same off-screen canvas on every call
        // until it is swapped in; a second one is a fresh allocation.
        Ok(self
            .spare
            .take()
            .unwrap_or_else(|| MemoryBuffer::new(self.width, self.height)))
    }

    fn fill_solid(&self, buffer: &mut MemoryBuffer, color: Color) {
        buffer.pixels.fill(color);
    }

    fn set_image(&self, buffer: &mut MemoryBuffer, image: &RgbImage) {
        buffer.pixels.fill(Color::BLACK);
        for (x, y, pixel) in image.enumerate_pixels() {
            buffer.set(x, y, (*pixel).into());
        }
    }

    fn swap_on_sync(&mut self, buffer: MemoryBuffer) -> MemoryBuffer {
        self.swaps += 1;
        std::mem::replace(&mut self.visible, buffer)
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

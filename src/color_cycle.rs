//! Procedural hue sweep: red → yellow → green → cyan → blue → magenta → red.
//!
//! The whole state is one counter, `continuum`, in `0..765`. Each tick bumps
//! it by one (wrapping) and maps it to a solid color by splitting the range
//! into three 256-wide segments.

use crate::Color;
use std::time::Duration;

/// Length of one full sweep, in ticks.
pub const CYCLE_LENGTH: u16 = 3 * 255;

/// Delay between color steps.
pub const PACING: Duration = Duration::from_millis(5);

/// Advance the phase by one tick, wrapping at [`CYCLE_LENGTH`].
///
/// Any `u16` is accepted; out-of-range phases are reduced first.
pub fn advance(phase: u16) -> u16 {
    (phase % CYCLE_LENGTH + 1) % CYCLE_LENGTH
}

/// Color shown at a given phase, taken modulo [`CYCLE_LENGTH`].
pub fn color_at(continuum: u16) -> Color {
    let continuum = continuum % CYCLE_LENGTH;
    // Segment bounds are inclusive at 255 and 511, so the middle segment
    // starts at 256 and the last one at 512.
    match continuum {
        0..=255 => {
            let c = continuum as u8;
            Color::new(c, 0, 255 - c)
        }
        256..=511 => {
            let c = (continuum - 256) as u8;
            Color::new(255 - c, c, 0)
        }
        _ => {
            let c = (continuum - 512) as u8;
            Color::new(0, 255 - c, c)
        }
    }
}

/// Pure step function: advance, then color the new phase.
pub fn next_frame(phase: u16) -> (Color, u16) {
    let next = advance(phase);
    (color_at(next), next)
}

/// Stateful wrapper owning the phase counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColorCycle {
    phase: u16,
}

impl ColorCycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an arbitrary phase (taken modulo the cycle length).
    pub fn with_phase(phase: u16) -> Self {
        Self {
            phase: phase % CYCLE_LENGTH,
        }
    }

    pub fn phase(&self) -> u16 {
        self.phase
    }

    /// Restart the sweep from phase 0.
    pub fn reset(&mut self) {
        self.phase = 0;
    }

    pub fn next_color(&mut self) -> Color {
        let (color, phase) = next_frame(self.phase);
        self.phase = phase;
        color
    }
}

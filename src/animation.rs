//! The render loop: pace, pull a frame, paint off-screen, swap on vsync.
//!
//! ```text
//! Idle ──run()──▶ Running ──shutdown flag──▶ Stopped(Interrupted)
//!                    │    ──source empty───▶ Stopped(Exhausted)
//!                    └────driver/source error──▶ Faulted
//! ```
//!
//! The loop is single-threaded. Its only suspension point is the pacing
//! sleep, which is not cancellable; the shutdown flag is checked right after
//! waking, before anything is written, so a stop request takes effect within
//! one pacing interval and never interrupts a fill or a swap.
//!
//! ## Rust concepts
//! - Generic struct over a trait (`AnimationLoop<P: Panel>`) with an
//!   associated buffer type
//! - `loop` as an expression: `break value` hands the stop reason out
//! - Moving a buffer into `swap_on_sync` and getting the other one back

use crate::driver::Panel;
use crate::source::FrameSource;
use crate::{Error, is_running};
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::{Duration, Instant};

/// How often `hold_until_interrupted` looks at the shutdown flag.
const HOLD_POLL: Duration = Duration::from_millis(100);

/// Only the first few slow ticks are logged individually.
const MAX_SLOW_TICK_WARNINGS: u32 = 5;

/// Why a run ended without an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The operator asked to shut down.
    Interrupted,
    /// A finite source played its last frame.
    Exhausted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped(StopReason),
    Faulted,
}

/// Owns the panel and its off-screen buffer across ticks.
pub struct AnimationLoop<P: Panel> {
    panel: P,
    buffer: Option<P::Buffer>,
    state: LoopState,
    swaps: u64,
}

impl<P: Panel> AnimationLoop<P> {
    pub fn new(panel: P) -> Self {
        Self {
            panel,
            buffer: None,
            state: LoopState::Idle,
            swaps: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Buffer swaps completed over the lifetime of this loop.
    pub fn swap_count(&self) -> u64 {
        self.swaps
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// Play `source` until it runs out or `running` goes false.
    ///
    /// Errors from the driver or the source move the loop to `Faulted` and
    /// are returned as-is; nothing is retried.
    pub fn run(
        &mut self,
        source: &mut FrameSource,
        running: &AtomicBool,
    ) -> Result<StopReason, Error> {
        let mut buffer = match self.buffer.take() {
            Some(buffer) => buffer,
            None => match self.panel.create_frame_buffer() {
                Ok(buffer) => buffer,
                Err(e) => {
                    self.state = LoopState::Faulted;
                    tracing::error!("Could not get an off-screen buffer: {}", e);
                    return Err(e);
                }
            },
        };

        self.state = LoopState::Running;
        let pacing = source.pacing();
        let slow_threshold = pacing * 2;
        let mut slow_ticks = 0u32;
        let start_swaps = self.swaps;

        let (width, height) = self.panel.size();
        tracing::info!(
            "Playing {} on {}x{} (every {}ms)",
            source.describe(),
            width,
            height,
            pacing.as_millis()
        );

        let reason = loop {
            thread::sleep(pacing);
            if !is_running(running) {
                break StopReason::Interrupted;
            }

            let tick_start = Instant::now();
            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break StopReason::Exhausted,
                Err(e) => {
                    self.buffer = Some(buffer);
                    self.state = LoopState::Faulted;
                    tracing::error!(
                        "Playback failed after {} frames: {}",
                        self.swaps - start_swaps,
                        e
                    );
                    return Err(e);
                }
            };

            frame.draw(&self.panel, &mut buffer);
            buffer = self.panel.swap_on_sync(buffer);
            self.swaps += 1;

            let tick_time = tick_start.elapsed();
            if tick_time > slow_threshold {
                slow_ticks += 1;
                if slow_ticks <= MAX_SLOW_TICK_WARNINGS {
                    tracing::warn!(
                        "Frame {} took {}ms (pacing: {}ms)",
                        self.swaps - start_swaps,
                        tick_time.as_millis(),
                        pacing.as_millis()
                    );
                }
            }
        };

        self.buffer = Some(buffer);
        self.state = LoopState::Stopped(reason);

        let played = self.swaps - start_swaps;
        if slow_ticks > 0 {
            tracing::warn!("{} of {} frames were slow", slow_ticks, played);
        }
        tracing::info!("Playback stopped ({:?}) after {} frames", reason, played);

        Ok(reason)
    }

    /// Keep the last swapped frame on the panel until shutdown is requested.
    pub fn hold_until_interrupted(&self, running: &AtomicBool) {
        tracing::info!("Holding last frame. Press Ctrl+C to exit.");
        while is_running(running) {
            thread::sleep(HOLD_POLL);
        }
    }
}

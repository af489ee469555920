//! Frame timing overlay
//!
//! Optional diagnostic layer drawn into every presented frame: a bar
//! whose length tracks the frame interval, plus a periodic FPS log
//! line. Toggled by `[diagnostics] frame_meter` in the config; never
//! part of the swap contract.

use glow::HasContext;
use log::debug;
use std::ffi::c_void;
use std::time::Instant;

// Meter geometry (pixels from the top-left corner)
const METER_MARGIN: i32 = 8;
const METER_WIDTH: i32 = 200;
const METER_HEIGHT: i32 = 12;

// Bar spans the full width at this frame interval
const METER_FULL_SCALE_MS: f32 = 33.3;

// Log cadence in frames
const LOG_INTERVAL_FRAMES: u32 = 120;

/// Frame interval meter rendered with bare scissor/clear calls
pub struct FrameMeter {
    gl: glow::Context,
    frames: u32,
    last_frame: Instant,
    interval_ms: f32,
}

impl FrameMeter {
    pub fn new(mut loader: impl FnMut(&str) -> *const c_void) -> Self {
        let gl = unsafe { glow::Context::from_loader_function(|name| loader(name)) };
        Self {
            gl,
            frames: 0,
            last_frame: Instant::now(),
            interval_ms: 0.0,
        }
    }

    /// Draw the meter into the current context's draw surface
    pub fn render(&mut self, width: i32, height: i32) {
        let now = Instant::now();
        let interval = now.duration_since(self.last_frame).as_secs_f32() * 1000.0;
        self.last_frame = now;
        // Smooth a little so the bar is readable
        self.interval_ms = if self.frames == 0 {
            interval
        } else {
            self.interval_ms * 0.9 + interval * 0.1
        };
        self.frames += 1;

        if width <= 0 || height <= 0 {
            return;
        }

        let fill = ((self.interval_ms / METER_FULL_SCALE_MS) * METER_WIDTH as f32)
            .clamp(1.0, METER_WIDTH as f32) as i32;
        // green under ~60Hz, yellow under ~30Hz, red beyond
        let (r, g, b) = if self.interval_ms < 16.7 {
            (0.2, 0.8, 0.2)
        } else if self.interval_ms < METER_FULL_SCALE_MS {
            (0.9, 0.8, 0.1)
        } else {
            (0.9, 0.2, 0.2)
        };

        let top = height - METER_MARGIN - METER_HEIGHT;
        unsafe {
            self.gl.enable(glow::SCISSOR_TEST);

            // backdrop
            self.gl.scissor(METER_MARGIN, top, METER_WIDTH, METER_HEIGHT);
            self.gl.clear_color(0.0, 0.0, 0.0, 0.5);
            self.gl.clear(glow::COLOR_BUFFER_BIT);

            // interval bar
            self.gl
                .scissor(METER_MARGIN + 1, top + 1, fill - 1, METER_HEIGHT - 2);
            self.gl.clear_color(r, g, b, 0.9);
            self.gl.clear(glow::COLOR_BUFFER_BIT);

            self.gl.disable(glow::SCISSOR_TEST);
        }

        if self.frames % LOG_INTERVAL_FRAMES == 0 {
            debug!(
                "frame {}: interval {:.1} ms ({:.1} fps)",
                self.frames,
                self.interval_ms,
                1000.0 / self.interval_ms.max(0.001)
            );
        }
    }
}

//! DRM output configuration and scanout resources
//!
//! Mode selection, framebuffer lifetime, and the hardware cursor plane.

use anyhow::{anyhow, bail, Context, Result};
use drm::buffer::{Buffer, DrmFourcc};
use drm::control::dumbbuffer::DumbBuffer;
use drm::control::{connector, crtc, framebuffer, Device as ControlDevice, Mode};
use log::{debug, info};
use std::rc::Rc;

use super::card::Card;
use crate::constants::CURSOR_BUFFER_SIZE;

/// Output configuration for one connector/CRTC pair
#[derive(Clone)]
pub struct DisplayConfig {
    pub connector_handle: connector::Handle,
    pub crtc_handle: crtc::Handle,
    pub mode: Mode,
    pub width: u32,
    pub height: u32,
}

impl DisplayConfig {
    /// Detect the connected output and pick its preferred mode
    pub fn detect(card: &Card) -> Result<Self> {
        let (connector_handle, connector_info) = card.find_connected_connector()?;

        info!(
            "Connector: {:?}, type: {:?}",
            connector_handle,
            connector_info.interface()
        );

        let (crtc_handle, _crtc_info) = card.find_crtc_for_connector(&connector_info)?;
        info!("CRTC: {:?}", crtc_handle);

        let modes = connector_info.modes();
        if modes.is_empty() {
            bail!("No available display modes");
        }

        let mode = modes
            .iter()
            .find(|m| {
                m.mode_type()
                    .contains(drm::control::ModeTypeFlags::PREFERRED)
            })
            .or_else(|| modes.first())
            .cloned()
            .ok_or_else(|| anyhow!("Failed to select display mode"))?;

        let (width, height) = mode.size();
        info!("Display mode: {}x{} @ {}Hz", width, height, mode.vrefresh());

        Ok(Self {
            connector_handle,
            crtc_handle,
            mode,
            width: width as u32,
            height: height as u32,
        })
    }
}

/// DRM framebuffer wrapped around a scanout-capable buffer object
pub struct Framebuffer {
    card: Rc<Card>,
    handle: framebuffer::Handle,
}

impl Framebuffer {
    /// Register a framebuffer for a GBM buffer object
    pub fn from_bo<T>(card: Rc<Card>, bo: &gbm::BufferObject<T>) -> Result<Self> {
        let handle = card
            .add_framebuffer(bo, 24, 32)
            .context("Failed to add framebuffer")?;
        debug!("Framebuffer created: {:?}", handle);
        Ok(Self { card, handle })
    }

    pub fn handle(&self) -> framebuffer::Handle {
        self.handle
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        let _ = self.card.destroy_framebuffer(self.handle);
    }
}

/// Attach a framebuffer to the CRTC, setting the display mode
pub fn set_crtc(card: &Card, config: &DisplayConfig, fb: &Framebuffer) -> Result<()> {
    card.set_crtc(
        config.crtc_handle,
        Some(fb.handle()),
        (0, 0),
        &[config.connector_handle],
        Some(config.mode),
    )
    .context("Failed to set display mode")?;
    Ok(())
}

// Arrow glyph for the cursor plane. 'X' = outline, 'o' = fill,
// anything else is transparent.
const CURSOR_ARROW: &[&str] = &[
    "X            ",
    "XX           ",
    "XoX          ",
    "XooX         ",
    "XoooX        ",
    "XooooX       ",
    "XoooooX      ",
    "XooooooX     ",
    "XoooooooX    ",
    "XooooooooX   ",
    "XoooooooooX  ",
    "XooooooooooX ",
    "XooooooXXXXXX",
    "XoooXooX     ",
    "XooX XooX    ",
    "XoX  XooX    ",
    "XX    XooX   ",
    "X     XooX   ",
    "       XX    ",
];

const CURSOR_OUTLINE: u32 = 0xFF00_0000;
const CURSOR_FILL: u32 = 0xFFFF_FFFF;

/// Hardware cursor plane backed by a dumb buffer
pub struct CursorPlane {
    card: Rc<Card>,
    crtc: crtc::Handle,
    // Some until Drop hands the buffer back to the kernel
    buffer: Option<DumbBuffer>,
    visible: bool,
}

impl CursorPlane {
    /// Allocate the cursor buffer and paint the arrow glyph into it
    pub fn new(card: Rc<Card>, crtc: crtc::Handle) -> Result<Self> {
        let size = CURSOR_BUFFER_SIZE;
        let mut buffer = card
            .create_dumb_buffer((size, size), DrmFourcc::Argb8888, 32)
            .context("Failed to create cursor buffer")?;

        {
            let pitch = buffer.pitch() as usize;
            let mut mapping = card
                .map_dumb_buffer(&mut buffer)
                .context("Failed to map cursor buffer")?;
            let pixels = mapping.as_mut();
            pixels.fill(0);
            for (row, line) in CURSOR_ARROW.iter().enumerate() {
                for (col, ch) in line.chars().enumerate() {
                    let argb = match ch {
                        'X' => CURSOR_OUTLINE,
                        'o' => CURSOR_FILL,
                        _ => continue,
                    };
                    let offset = row * pitch + col * 4;
                    pixels[offset..offset + 4].copy_from_slice(&argb.to_le_bytes());
                }
            }
        }

        Ok(Self {
            card,
            crtc,
            buffer: Some(buffer),
            visible: false,
        })
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Install the cursor buffer on the CRTC and place it
    pub fn show(&mut self, x: f64, y: f64) -> Result<()> {
        if let Some(buffer) = &self.buffer {
            self.card
                .set_cursor(self.crtc, buffer)
                .context("Failed to set cursor plane")?;
            self.visible = true;
        }
        self.move_to(x, y)
    }

    /// Move the cursor plane; no-op while hidden
    pub fn move_to(&mut self, x: f64, y: f64) -> Result<()> {
        if !self.visible {
            return Ok(());
        }
        self.card
            .move_cursor(self.crtc, (x as i32, y as i32))
            .context("Failed to move cursor plane")?;
        Ok(())
    }

    /// Remove the cursor buffer from the CRTC
    pub fn hide(&mut self) -> Result<()> {
        if self.visible {
            self.card
                .clear_cursor(self.crtc)
                .context("Failed to clear cursor plane")?;
            self.visible = false;
        }
        Ok(())
    }
}

impl Drop for CursorPlane {
    fn drop(&mut self) {
        if self.visible {
            let _ = self.card.clear_cursor(self.crtc);
        }
        if let Some(buffer) = self.buffer.take() {
            let _ = self.card.destroy_dumb_buffer(buffer);
        }
    }
}

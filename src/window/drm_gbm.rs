//! DRM-GBM native window
//!
//! Owns one DRM output end to end: card, connector/CRTC/mode, GBM
//! surface, EGL render surface, and the hardware cursor plane. Frames
//! are presented by locking the swapped front buffer and attaching it
//! to the CRTC; the previous buffer is retired on the next swap.

use anyhow::{anyhow, Context, Result};
use gbm::{BufferObjectFlags, Format};
use log::{error, warn};
use std::cell::RefCell;
use std::rc::Rc;

use crate::constants::CURSOR_NAME_NONE;
use crate::drm::{set_crtc, Card, CursorPlane, DisplayConfig, Framebuffer};
use crate::surface::{EglContext, EglSurface, SurfaceError};

use super::{DrmNativeWindow, NativeWindow, RenderSurface, INVALID_DIMENSION};

/// Native window over one DRM-GBM output
pub struct GbmNativeWindow {
    // gbm_surface references the device; keep it declared first
    gbm_surface: Option<Rc<gbm::Surface<std::fs::File>>>,
    gbm: gbm::Device<std::fs::File>,
    cursor: Option<CursorPlane>,
    cursor_name: String,
    display: DisplayConfig,
    card: Rc<Card>,
    valid: bool,
}

impl NativeWindow for GbmNativeWindow {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn width(&self) -> i32 {
        if !self.valid {
            return INVALID_DIMENSION;
        }
        self.display.width as i32
    }

    fn height(&self) -> i32 {
        if !self.valid {
            return INVALID_DIMENSION;
        }
        self.display.height as i32
    }

    fn resize(&mut self, _width: u32, _height: u32) -> Result<()> {
        Err(anyhow!("resizing a DRM output is not supported"))
    }
}

impl DrmNativeWindow for GbmNativeWindow {
    type Surface = GbmRenderSurface;

    fn open(device_path: &str) -> Result<Self> {
        let card = Rc::new(Card::open(device_path)?);
        let display = DisplayConfig::detect(&card)?;
        let gbm = gbm::Device::new(card.dup_fd()?)
            .map_err(|e| anyhow!("Failed to create GBM device: {:?}", e))?;

        // A missing cursor plane degrades to an invisible cursor, not a
        // failed window.
        let cursor = match CursorPlane::new(card.clone(), display.crtc_handle) {
            Ok(plane) => Some(plane),
            Err(e) => {
                warn!("Cursor plane unavailable: {:#}", e);
                None
            }
        };

        Ok(Self {
            gbm_surface: None,
            gbm,
            cursor,
            cursor_name: String::new(),
            display,
            card,
            valid: true,
        })
    }

    fn create_render_surface(&mut self, frame_meter: bool) -> Result<Self::Surface> {
        let surface = self
            .gbm
            .create_surface::<std::fs::File>(
                self.display.width,
                self.display.height,
                Format::Argb8888,
                BufferObjectFlags::SCANOUT | BufferObjectFlags::RENDERING,
            )
            .map_err(|e| anyhow!("Failed to create GBM surface: {:?}", e))?;
        let gbm_surface = Rc::new(surface);

        let egl_context = EglContext::new(&self.gbm).context("Failed to initialize EGL")?;
        let egl_surface = egl_context
            .create_window_surface(&gbm_surface, frame_meter)
            .context("Failed to create the EGL window surface")?;

        self.gbm_surface = Some(gbm_surface.clone());

        Ok(GbmRenderSurface {
            egl_surface,
            egl_context,
            scanout: RefCell::new(Scanout {
                card: self.card.clone(),
                gbm_surface,
                display: self.display.clone(),
                front: None,
            }),
        })
    }

    fn show_cursor(&mut self, x: f64, y: f64) {
        if let Some(cursor) = self.cursor.as_mut() {
            if let Err(e) = cursor.show(x, y) {
                warn!("Failed to show cursor: {:#}", e);
            }
        }
    }

    fn dismiss_cursor(&mut self) {
        if let Some(cursor) = self.cursor.as_mut() {
            if let Err(e) = cursor.hide() {
                warn!("Failed to dismiss cursor: {:#}", e);
            }
        }
    }

    fn move_cursor(&mut self, x: f64, y: f64) {
        if let Some(cursor) = self.cursor.as_mut() {
            if let Err(e) = cursor.move_to(x, y) {
                warn!("Failed to move cursor: {:#}", e);
            }
        }
    }

    fn update_cursor(&mut self, cursor_name: &str, x: f64, y: f64) {
        if cursor_name == self.cursor_name {
            return;
        }
        self.cursor_name = cursor_name.to_string();
        // single-glyph plane: every named cursor selects the arrow
        if cursor_name == CURSOR_NAME_NONE {
            self.dismiss_cursor();
        } else {
            self.show_cursor(x, y);
        }
    }
}

// Scanout state for one output: the buffer currently on the CRTC stays
// locked until the next present replaces it.
struct Scanout {
    card: Rc<Card>,
    gbm_surface: Rc<gbm::Surface<std::fs::File>>,
    display: DisplayConfig,
    front: Option<(Framebuffer, gbm::BufferObject<std::fs::File>)>,
}

impl Scanout {
    fn present(&mut self) -> Result<()> {
        let bo = unsafe { self.gbm_surface.lock_front_buffer() }
            .map_err(|e| anyhow!("Failed to lock front buffer: {:?}", e))?;
        let fb = Framebuffer::from_bo(self.card.clone(), &bo)?;
        set_crtc(&self.card, &self.display, &fb)?;
        // the previous frame's buffer is released here
        self.front = Some((fb, bo));
        Ok(())
    }
}

/// Render target for a DRM-GBM output: EGL surface plus the CRTC
/// scanout path run on every swap.
pub struct GbmRenderSurface {
    // dropped before the context that created it
    egl_surface: EglSurface,
    #[allow(dead_code)]
    egl_context: EglContext,
    scanout: RefCell<Scanout>,
}

impl GbmRenderSurface {
    /// Load GL function pointers for the surface's contexts
    pub fn get_proc_address(&self, name: &str) -> *const std::ffi::c_void {
        self.egl_surface.get_proc_address(name)
    }
}

impl RenderSurface for GbmRenderSurface {
    fn is_valid(&self) -> bool {
        self.egl_surface.is_valid()
    }

    fn make_current(&self) -> Result<(), SurfaceError> {
        self.egl_surface.make_current()
    }

    fn make_resource_current(&self) -> Result<(), SurfaceError> {
        self.egl_surface.make_resource_current()
    }

    fn swap_buffers(&self) -> Result<(), SurfaceError> {
        self.egl_surface.swap_buffers()?;
        self.scanout.borrow_mut().present().map_err(|e| {
            error!("Failed to present frame: {:#}", e);
            SurfaceError::Scanout(format!("{:#}", e))
        })
    }
}

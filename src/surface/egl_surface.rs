//! EGL surface wrapper
//!
//! Owns one (surface, display, context, resource context) tuple.
//! Binding and presenting report typed failures carrying the EGL error
//! so callers can log the platform cause.

use khronos_egl as egl;
use log::error;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::context::EglInstance;
use super::diagnostics::FrameMeter;

/// EGL operation failure with the underlying platform error
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("surface has already been released")]
    Released,
    #[error("failed to make the EGL context current: {0}")]
    MakeCurrent(egl::Error),
    #[error("failed to swap the EGL buffers: {0}")]
    SwapBuffers(egl::Error),
    #[error("failed to present the frame: {0}")]
    Scanout(String),
}

/// One native rendering surface bound to a primary and a resource
/// context.
///
/// All methods take `&self`; the wrapper changes thread-local EGL state
/// and is part of the crate's single-thread contract.
pub struct EglSurface {
    instance: Rc<EglInstance>,
    display: egl::Display,
    // None once released; release happens exactly once
    surface: Cell<Option<egl::Surface>>,
    context: egl::Context,
    resource_context: egl::Context,
    // Lazily constructed on the first swap when enabled
    frame_meter: RefCell<Option<FrameMeter>>,
    frame_meter_enabled: bool,
}

impl EglSurface {
    pub(crate) fn new(
        instance: Rc<EglInstance>,
        display: egl::Display,
        surface: egl::Surface,
        context: egl::Context,
        resource_context: egl::Context,
        frame_meter_enabled: bool,
    ) -> Self {
        Self {
            instance,
            display,
            surface: Cell::new(Some(surface)),
            context,
            resource_context,
            frame_meter: RefCell::new(None),
            frame_meter_enabled,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.surface.get().is_some()
    }

    /// Bind the primary context to the surface on the calling thread
    pub fn make_current(&self) -> Result<(), SurfaceError> {
        self.bind(self.context)
    }

    /// Bind the resource context to the surface on the calling thread
    pub fn make_resource_current(&self) -> Result<(), SurfaceError> {
        self.bind(self.resource_context)
    }

    fn bind(&self, context: egl::Context) -> Result<(), SurfaceError> {
        let surface = self.surface.get().ok_or(SurfaceError::Released)?;
        self.instance
            .make_current(self.display, Some(surface), Some(surface), Some(context))
            .map_err(SurfaceError::MakeCurrent)
    }

    /// Present the back buffer.
    ///
    /// When the frame meter is enabled, the overlay is drawn on the
    /// resource context first and the primary context restored before
    /// presenting.
    pub fn swap_buffers(&self) -> Result<(), SurfaceError> {
        let surface = self.surface.get().ok_or(SurfaceError::Released)?;

        if self.frame_meter_enabled {
            self.render_overlay(surface);
        }

        self.instance
            .swap_buffers(self.display, surface)
            .map_err(SurfaceError::SwapBuffers)
    }

    // Frame meter pass on the resource context. Overlay failures are
    // logged and never fail the swap.
    fn render_overlay(&self, surface: egl::Surface) {
        if let Err(e) = self.make_resource_current() {
            error!("Skipping frame meter: {}", e);
            return;
        }

        let width = self
            .instance
            .query_surface(self.display, surface, egl::WIDTH)
            .unwrap_or(0);
        let height = self
            .instance
            .query_surface(self.display, surface, egl::HEIGHT)
            .unwrap_or(0);

        let mut slot = self.frame_meter.borrow_mut();
        let meter = slot.get_or_insert_with(|| {
            let instance = self.instance.clone();
            FrameMeter::new(move |name| {
                instance
                    .get_proc_address(name)
                    .map(|f| f as *const std::ffi::c_void)
                    .unwrap_or(std::ptr::null())
            })
        });
        meter.render(width, height);

        if let Err(e) = self.make_current() {
            error!("Failed to restore primary context after overlay: {}", e);
        }
    }

    /// Load GL function pointers for the bound context
    pub fn get_proc_address(&self, name: &str) -> *const std::ffi::c_void {
        self.instance
            .get_proc_address(name)
            .map(|f| f as *const std::ffi::c_void)
            .unwrap_or(std::ptr::null())
    }
}

impl Drop for EglSurface {
    fn drop(&mut self) {
        if let Some(surface) = self.surface.take() {
            if let Err(e) = self.instance.destroy_surface(self.display, surface) {
                error!("Failed to destroy EGL surface: {}", e);
            }
        }
    }
}

//! Window backends
//!
//! The native-window and render-surface capability traits, the host
//! binding contract, and the DRM implementation. The concrete backend
//! is chosen at build time via cargo features.

pub mod binding;
pub mod drm;

#[cfg(feature = "drm-gbm")]
pub mod drm_gbm;

pub use binding::{BindingDelegate, PhysicalWindowBounds, WindowBindingHandler, WindowMode};
pub use drm::DrmWindowBinding;

#[cfg(feature = "drm-gbm")]
pub use drm_gbm::GbmNativeWindow;

use anyhow::Result;

use crate::surface::SurfaceError;

/// Geometry sentinel returned while a window is invalid
pub const INVALID_DIMENSION: i32 = -1;

/// Platform-specific drawable handle
pub trait NativeWindow {
    fn is_valid(&self) -> bool;

    /// Width in pixels, or -1 while the window is invalid
    fn width(&self) -> i32;

    /// Height in pixels, or -1 while the window is invalid
    fn height(&self) -> i32;

    /// Backend-defined resize
    fn resize(&mut self, width: u32, height: u32) -> Result<()>;
}

/// Render target handed to the host each frame
pub trait RenderSurface {
    fn is_valid(&self) -> bool;

    /// Bind the primary context on the calling thread
    fn make_current(&self) -> Result<(), SurfaceError>;

    /// Bind the resource context on the calling thread
    fn make_resource_current(&self) -> Result<(), SurfaceError>;

    /// Present the back buffer
    fn swap_buffers(&self) -> Result<(), SurfaceError>;
}

/// DRM-capable native window: discovery, surface materialization, and
/// the hardware cursor plane.
pub trait DrmNativeWindow: NativeWindow + Sized {
    type Surface: RenderSurface;

    /// Open the DRM device at `device_path` and bring up one output
    fn open(device_path: &str) -> Result<Self>;

    /// Materialize the render surface bound to this window.
    /// `frame_meter` enables the diagnostic overlay in the swap path.
    fn create_render_surface(&mut self, frame_meter: bool) -> Result<Self::Surface>;

    /// Show the cursor plane at the given position
    fn show_cursor(&mut self, x: f64, y: f64);

    /// Remove the cursor plane
    fn dismiss_cursor(&mut self);

    /// Move the visible cursor plane
    fn move_cursor(&mut self, x: f64, y: f64);

    /// Restyle the cursor by name and reposition it
    fn update_cursor(&mut self, cursor_name: &str, x: f64, y: f64);
}

/// Binding type compiled for this build's display backend
#[cfg(feature = "drm-gbm")]
pub type PlatformWindowBinding = DrmWindowBinding<GbmNativeWindow>;

#[cfg(not(any(feature = "drm-gbm")))]
compile_error!("a display backend feature must be enabled (drm-gbm)");

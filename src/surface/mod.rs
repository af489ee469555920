//! Render surface management
//!
//! EGL bootstrap (GBM platform), the surface wrapper handed to the
//! host, and the optional frame timing overlay.

pub mod context;
pub mod diagnostics;
pub mod egl_surface;

pub use context::EglContext;
pub use egl_surface::{EglSurface, SurfaceError};

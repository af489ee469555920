//! plinth - display and input binding for embedded Linux platform hosts
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Host main loop               │
//! ├──────────────────────────────────────────────┤
//! │  DispatchEvent → libinput pump → delegate    │
//! │                                              │
//! │  RenderSurfaceTarget → make current / swap   │
//! │                          ↓                   │
//! │               DRM/KMS scanout                │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The host owns the loop; the binding never blocks it. One
//! `dispatch_event()` call runs one zero-timeout poll pass and drains
//! the libinput queue, delivering normalized events to the installed
//! [`BindingDelegate`]. The compiled backend is selected at build time
//! (`drm-gbm` feature).

pub mod config;
pub mod constants;
pub mod drm;
pub mod input;
pub mod surface;
pub mod window;

pub use config::Config;
pub use input::{PointerButton, PointerState};
pub use surface::{EglSurface, SurfaceError};
pub use window::{
    BindingDelegate, DrmWindowBinding, NativeWindow, PhysicalWindowBounds, RenderSurface,
    WindowBindingHandler, WindowMode,
};

#[cfg(feature = "drm-gbm")]
pub use window::{GbmNativeWindow, PlatformWindowBinding};

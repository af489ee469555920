//! DRM/KMS display management

pub mod card;
pub mod display;

pub use card::Card;
pub use display::{set_crtc, CursorPlane, DisplayConfig, Framebuffer};

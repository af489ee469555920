//! Input handling
//!
//! libinput device access and the translation tables shared by the
//! event pump: pointer button mapping and scroll delta resolution.

pub mod pointer;

pub use pointer::PointerState;

use input::LibinputInterface;
use log::warn;
use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::OwnedFd;
use std::path::Path;

use crate::constants::WHEEL_CLICK_SCALE;

/// libinput mouse button codes (linux/input-event-codes.h)
pub const BTN_LEFT: u32 = 0x110;
pub const BTN_RIGHT: u32 = 0x111;
pub const BTN_MIDDLE: u32 = 0x112;
pub const BTN_FORWARD: u32 = 0x115;
pub const BTN_BACK: u32 = 0x116;

/// Mouse button identity forwarded to the delegate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    Back,
    Forward,
}

/// Map a libinput button code to a delegate button.
/// Codes outside the supported set return None and must be dropped by
/// the caller (with an error report).
pub fn map_pointer_button(code: u32) -> Option<PointerButton> {
    match code {
        BTN_LEFT => Some(PointerButton::Primary),
        BTN_RIGHT => Some(PointerButton::Secondary),
        BTN_MIDDLE => Some(PointerButton::Middle),
        BTN_BACK => Some(PointerButton::Back),
        BTN_FORWARD => Some(PointerButton::Forward),
        _ => None,
    }
}

/// Resolve a wheel scroll delta from a v120-normalized axis value.
///
/// libinput reports wheel movement in 1/120th notch steps; one full
/// click is 120. The click count is scaled by [`WHEEL_CLICK_SCALE`] for
/// compatibility with consumers that predate fractional-degree wheel
/// reporting.
pub fn wheel_scroll_delta(value_v120: f64) -> f64 {
    WHEEL_CLICK_SCALE * (value_v120 / 120.0)
}

/// LibinputInterface implementation for direct device access.
///
/// Stateless open/close capability handed to the libinput context;
/// scoped entirely to device fd lifecycle.
pub struct RestrictedOpen;

impl LibinputInterface for RestrictedOpen {
    fn open_restricted(&mut self, path: &Path, flags: i32) -> std::result::Result<OwnedFd, i32> {
        let file = OpenOptions::new()
            .read(true)
            .write((flags & libc::O_WRONLY != 0) || (flags & libc::O_RDWR != 0))
            .custom_flags((flags & !libc::O_WRONLY & !libc::O_RDWR & !libc::O_RDONLY) | libc::O_CLOEXEC)
            .open(path)
            .map_err(|e| {
                warn!("Cannot open device: {:?}: {}", path, e);
                e.raw_os_error().unwrap_or(-libc::ENOENT)
            })?;
        Ok(OwnedFd::from(file))
    }

    fn close_restricted(&mut self, fd: OwnedFd) {
        drop(fd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_map_covers_supported_set() {
        assert_eq!(map_pointer_button(BTN_LEFT), Some(PointerButton::Primary));
        assert_eq!(map_pointer_button(BTN_RIGHT), Some(PointerButton::Secondary));
        assert_eq!(map_pointer_button(BTN_MIDDLE), Some(PointerButton::Middle));
        assert_eq!(map_pointer_button(BTN_BACK), Some(PointerButton::Back));
        assert_eq!(map_pointer_button(BTN_FORWARD), Some(PointerButton::Forward));
    }

    #[test]
    fn unsupported_buttons_are_unmapped() {
        // BTN_SIDE / BTN_EXTRA and arbitrary codes
        assert_eq!(map_pointer_button(0x113), None);
        assert_eq!(map_pointer_button(0x114), None);
        assert_eq!(map_pointer_button(0), None);
    }

    #[test]
    fn wheel_clicks_scale_by_ten() {
        // three full clicks -> 30
        assert_eq!(wheel_scroll_delta(360.0), 30.0);
        assert_eq!(wheel_scroll_delta(-120.0), -10.0);
        // high-resolution half click
        assert_eq!(wheel_scroll_delta(60.0), 5.0);
    }
}

//! Global constants for plinth
//!
//! Consolidates device discovery, input translation, and cursor
//! constants to eliminate magic numbers throughout the codebase.

// ============================================================================
// Device Discovery
// ============================================================================

/// Environment variable that overrides the DRM device path
pub const DRM_DEVICE_ENV_KEY: &str = "PLINTH_DRM_DEVICE";

/// DRM device used when the environment override is unset or empty
pub const DRM_DEVICE_DEFAULT: &str = "/dev/dri/card0";

/// udev seat the libinput context is bound to
pub const SEAT_ID: &str = "seat0";

// ============================================================================
// Input Translation
// ============================================================================

/// Wheel clicks have been reported as fractional degrees since libinput
/// 0.8; older consumers expect multiples of 10 per click, so discrete
/// click counts are scaled by this factor.
pub const WHEEL_CLICK_SCALE: f64 = 10.0;

/// Scroll offset multiplier forwarded to the delegate with every scroll
pub const SCROLL_OFFSET_MULTIPLIER: i32 = 20;

// ============================================================================
// Cursor Plane
// ============================================================================

/// Width and height of the DRM cursor plane buffer in pixels.
/// 64x64 is accepted by every KMS driver.
pub const CURSOR_BUFFER_SIZE: u32 = 64;

/// Cursor name that dismisses the cursor plane
pub const CURSOR_NAME_NONE: &str = "none";

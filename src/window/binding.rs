//! Host-facing binding contract
//!
//! One polymorphic seam joins every display backend to the host: the
//! host drives [`WindowBindingHandler`] from its main loop and receives
//! normalized window/input events through [`BindingDelegate`].

use crate::input::PointerButton;

use super::RenderSurface;

/// Physical bounds of a window in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalWindowBounds {
    pub width: u32,
    pub height: u32,
}

/// Surface sizing policy, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    /// Adopt the native output resolution
    Fullscreen,
    /// Fixed surface size; unsupported on the DRM backend
    Normal,
}

/// Receiver of normalized window and input events.
///
/// Every call is made synchronously from within the dispatching stack;
/// nothing is queued across dispatch passes.
pub trait BindingDelegate {
    /// The surface size changed (fullscreen mode adoption, resize)
    fn on_window_size_changed(&mut self, width: u32, height: u32);

    /// Raw evdev key code with press/release state
    fn on_key(&mut self, keycode: u16, pressed: bool);

    /// Absolute pointer position in surface pixels
    fn on_pointer_move(&mut self, x: f64, y: f64);

    /// Mouse button pressed at the current pointer position
    fn on_pointer_down(&mut self, x: f64, y: f64, button: PointerButton);

    /// Mouse button released at the current pointer position
    fn on_pointer_up(&mut self, x: f64, y: f64, button: PointerButton);

    /// Scroll at the current pointer position. `dx`/`dy` are the
    /// resolved axis deltas; `multiplier` is the fixed scroll offset
    /// factor the host applies.
    fn on_scroll(&mut self, x: f64, y: f64, dx: f64, dy: f64, multiplier: i32);

    /// Touch contact began on a seat slot
    fn on_touch_down(&mut self, time: u32, slot: u32, x: f64, y: f64);

    /// Touch contact ended
    fn on_touch_up(&mut self, time: u32, slot: u32);

    /// Touch contact moved
    fn on_touch_motion(&mut self, time: u32, slot: u32, x: f64, y: f64);

    /// The whole touch sequence was cancelled
    fn on_touch_cancel(&mut self);
}

/// Backend-independent window binding consumed by the host.
///
/// Exactly one implementation is compiled per build; the backend is a
/// build-time selection, not a runtime choice.
pub trait WindowBindingHandler {
    type Surface: RenderSurface;

    /// Pump pending window and input events. Must be called on every
    /// iteration of the host main loop; never blocks.
    fn dispatch_event(&mut self) -> bool;

    /// Materialize the native window and its render surface.
    /// Returns false with a logged diagnostic on failure.
    fn create_render_surface(&mut self, width: u32, height: u32) -> bool;

    /// Release the render surface (before the native window)
    fn destroy_render_surface(&mut self);

    /// The surface the host renders into, while one exists
    fn render_surface_target(&self) -> Option<&Self::Surface>;

    /// Install the delegate receiving window/input events. Events
    /// dispatched before this call update internal state only.
    fn set_view(&mut self, view: Box<dyn BindingDelegate>);

    /// Scale factor of the backing window
    fn dpi_scale(&self) -> f64;

    /// Bounds of the backing window in physical pixels
    fn physical_window_bounds(&self) -> PhysicalWindowBounds;

    /// Restyle the cursor by name ("none" dismisses it)
    fn update_cursor(&mut self, cursor_name: &str);

    /// Show or hide the virtual keyboard. Backends without one accept
    /// the call and do nothing.
    fn update_virtual_keyboard_status(&mut self, show: bool);

    /// Current clipboard contents
    fn clipboard_data(&self) -> &str;

    /// Replace the clipboard contents
    fn set_clipboard_data(&mut self, data: String);
}

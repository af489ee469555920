//! DRM window binding
//!
//! The core backend: multiplexes a libinput device/event stream with
//! the render-surface lifecycle and a hardware cursor plane under a
//! single-threaded, non-blocking event pump. The host calls
//! `dispatch_event()` from its own main loop on every iteration; one
//! call runs at most one zero-timeout poll pass and drains the libinput
//! queue completely before returning.

use anyhow::{anyhow, bail, Context, Result};
use input::event::keyboard::{KeyState, KeyboardEventTrait};
use input::event::pointer::{Axis, ButtonState, PointerScrollEvent};
use input::event::touch::{TouchEventPosition, TouchEventSlot, TouchEventTrait};
use input::event::{DeviceEvent, Event, EventTrait, KeyboardEvent, PointerEvent, TouchEvent};
use input::{DeviceCapability, Libinput};
use log::{error, info, warn};
use nix::sys::epoll::{Epoll, EpollCreateFlags, EpollEvent, EpollFlags, EpollTimeout};
use std::os::unix::io::{AsRawFd, BorrowedFd};

use crate::constants::{
    DRM_DEVICE_DEFAULT, DRM_DEVICE_ENV_KEY, SCROLL_OFFSET_MULTIPLIER, SEAT_ID,
};
use crate::input::{map_pointer_button, wheel_scroll_delta, PointerState, RestrictedOpen};

use super::binding::{BindingDelegate, PhysicalWindowBounds, WindowBindingHandler, WindowMode};
use super::{DrmNativeWindow, NativeWindow, RenderSurface};

/// Lifecycle of one binding instance.
///
/// `Invalid` is terminal: the instance cannot recover and the caller
/// must construct a fresh binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindingState {
    AwaitingSurface,
    Active,
    Invalid,
}

/// Window binding over a DRM output, generic over the native-window
/// backend compiled into this build.
pub struct DrmWindowBinding<W: DrmNativeWindow> {
    state: BindingState,
    mode: WindowMode,
    show_cursor: bool,
    frame_meter: bool,

    current_width: i32,
    current_height: i32,
    dpi_scale: f64,

    pointer: PointerState,
    pending_cursor_add: bool,
    display_valid: bool,
    clipboard: String,

    delegate: Option<Box<dyn BindingDelegate>>,

    // Declaration order is the teardown order: the render surface holds
    // a back-reference into window resources and must drop first.
    render_surface: Option<W::Surface>,
    native_window: Option<W>,

    libinput: Option<Libinput>,
    poller: Option<Epoll>,
}

impl<W: DrmNativeWindow> DrmWindowBinding<W> {
    /// Construct the binding and discover the input stack.
    ///
    /// Never panics or aborts: a discovery failure leaves the instance
    /// permanently invalid, which callers must check with
    /// [`DrmWindowBinding::is_valid`] before use.
    pub fn new(mode: WindowMode, width: u32, height: u32, show_cursor: bool) -> Self {
        let mut binding = Self::empty(mode, width, height, show_cursor);
        match Self::init_input() {
            Ok((libinput, poller)) => {
                binding.libinput = Some(libinput);
                binding.poller = Some(poller);
            }
            Err(e) => {
                error!("Input discovery failed, binding is invalid: {:#}", e);
                binding.state = BindingState::Invalid;
            }
        }
        binding
    }

    fn empty(mode: WindowMode, width: u32, height: u32, show_cursor: bool) -> Self {
        Self {
            state: BindingState::AwaitingSurface,
            mode,
            show_cursor,
            frame_meter: false,
            current_width: width as i32,
            current_height: height as i32,
            dpi_scale: 1.0,
            pointer: PointerState::new(width as i32, height as i32),
            pending_cursor_add: false,
            display_valid: false,
            clipboard: String::new(),
            delegate: None,
            render_surface: None,
            native_window: None,
            libinput: None,
            poller: None,
        }
    }

    /// Test-only constructor that skips input discovery
    #[cfg(test)]
    fn new_detached(mode: WindowMode, width: u32, height: u32, show_cursor: bool) -> Self {
        Self::empty(mode, width, height, show_cursor)
    }

    // udev-backed libinput context bound to the seat, its fd registered
    // with a level-triggered poller.
    fn init_input() -> Result<(Libinput, Epoll)> {
        let mut libinput = Libinput::new_with_udev(RestrictedOpen);
        libinput
            .udev_assign_seat(SEAT_ID)
            .map_err(|_| anyhow!("Failed to assign seat {} to the libinput context", SEAT_ID))?;

        let poller =
            Epoll::new(EpollCreateFlags::EPOLL_CLOEXEC).context("Failed to create input poller")?;
        let fd = unsafe { BorrowedFd::borrow_raw(libinput.as_raw_fd()) };
        poller
            .add(
                fd,
                EpollEvent::new(
                    EpollFlags::EPOLLIN | EpollFlags::EPOLLRDHUP | EpollFlags::EPOLLPRI,
                    0,
                ),
            )
            .context("Failed to register the input fd with the poller")?;

        Ok((libinput, poller))
    }

    /// True while every component of the binding is live and valid
    pub fn is_valid(&self) -> bool {
        self.display_valid
            && self.native_window.as_ref().map_or(false, |w| w.is_valid())
            && self.render_surface.as_ref().map_or(false, |s| s.is_valid())
    }

    /// Enable the frame timing overlay for surfaces created afterwards
    pub fn set_frame_meter(&mut self, enabled: bool) {
        self.frame_meter = enabled;
    }

    fn try_create_render_surface(&mut self, width: u32, height: u32) -> Result<()> {
        match self.state {
            BindingState::Invalid => bail!("binding is invalid and must be recreated"),
            BindingState::Active => bail!("render surface already exists; destroy it first"),
            BindingState::AwaitingSurface => {}
        }

        let device_path = resolve_device_path();
        let mut window =
            W::open(&device_path).context("Failed to create the native window")?;
        self.display_valid = true;

        let surface = match window.create_render_surface(self.frame_meter) {
            Ok(surface) => surface,
            Err(e) => {
                // keep the window allocated; destroy_render_surface or
                // the destructor releases it
                self.native_window = Some(window);
                return Err(e.context("Failed to bind the native window to the render surface"));
            }
        };

        if self.mode == WindowMode::Fullscreen {
            self.current_width = window.width();
            self.current_height = window.height();
            info!(
                "Display output resolution: {}x{}",
                self.current_width, self.current_height
            );
            self.pointer.set_bounds(self.current_width, self.current_height);
            if let Some(delegate) = self.delegate.as_deref_mut() {
                delegate.on_window_size_changed(
                    self.current_width.max(0) as u32,
                    self.current_height.max(0) as u32,
                );
            }
        } else {
            error!(
                "Fixed-size surfaces ({}x{}) are not supported on this backend",
                width, height
            );
        }

        self.native_window = Some(window);
        self.render_surface = Some(surface);
        self.state = BindingState::Active;

        // A pointer device hot-plugged before the surface existed left
        // its cursor-show pending; apply it now.
        if self.pending_cursor_add {
            let (x, y) = self.pointer.position();
            if let Some(window) = self.native_window.as_mut() {
                window.show_cursor(x, y);
            }
            self.pending_cursor_add = false;
        }

        Ok(())
    }

    // One full drain of the libinput queue, with the cursor plane moved
    // at most once per pass.
    fn pump_input(&mut self) {
        let drained: Vec<Event> = {
            let Some(libinput) = self.libinput.as_mut() else {
                return;
            };
            if let Err(e) = libinput.dispatch() {
                error!("Failed to dispatch libinput events: {}", e);
                return;
            }
            libinput.by_ref().collect()
        };

        let previous = self.pointer.position();
        for event in drained {
            self.handle_event(event);
        }
        self.sync_cursor_after_pass(previous);
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Device(DeviceEvent::Added(added)) => {
                let has_pointer = added.device().has_capability(DeviceCapability::Pointer);
                self.on_pointer_device_added(has_pointer);
            }
            Event::Device(DeviceEvent::Removed(removed)) => {
                let has_pointer = removed.device().has_capability(DeviceCapability::Pointer);
                self.on_pointer_device_removed(has_pointer);
            }
            Event::Keyboard(KeyboardEvent::Key(key)) => {
                self.on_key(key.key() as u16, key.key_state() == KeyState::Pressed);
            }
            Event::Pointer(PointerEvent::Motion(motion)) => {
                self.on_pointer_motion(motion.dx(), motion.dy());
            }
            Event::Pointer(PointerEvent::MotionAbsolute(motion)) => {
                let x = motion.absolute_x_transformed(self.current_width.max(0) as u32);
                let y = motion.absolute_y_transformed(self.current_height.max(0) as u32);
                self.on_pointer_motion_absolute(x, y);
            }
            Event::Pointer(PointerEvent::Button(button)) => {
                self.on_pointer_button(button.button(), button.button_state() == ButtonState::Pressed);
            }
            Event::Pointer(PointerEvent::ScrollWheel(scroll)) => {
                for axis in [Axis::Vertical, Axis::Horizontal] {
                    if scroll.has_axis(axis) {
                        self.on_scroll(axis, wheel_scroll_delta(scroll.scroll_value_v120(axis)));
                    }
                }
            }
            Event::Pointer(PointerEvent::ScrollFinger(scroll)) => {
                for axis in [Axis::Vertical, Axis::Horizontal] {
                    if scroll.has_axis(axis) {
                        self.on_scroll(axis, scroll.scroll_value(axis));
                    }
                }
            }
            Event::Pointer(PointerEvent::ScrollContinuous(scroll)) => {
                for axis in [Axis::Vertical, Axis::Horizontal] {
                    if scroll.has_axis(axis) {
                        self.on_scroll(axis, scroll.scroll_value(axis));
                    }
                }
            }
            // Superseded by the scroll events above; handling both
            // would double-report every wheel notch.
            Event::Pointer(PointerEvent::Axis(_)) => {}
            Event::Pointer(other) => {
                error!("Not expected pointer event: {:?}", other);
            }
            Event::Touch(TouchEvent::Down(touch)) => {
                let x = touch.x_transformed(self.current_width.max(0) as u32);
                let y = touch.y_transformed(self.current_height.max(0) as u32);
                self.on_touch_down(touch.time(), touch.seat_slot(), x, y);
            }
            Event::Touch(TouchEvent::Motion(touch)) => {
                let x = touch.x_transformed(self.current_width.max(0) as u32);
                let y = touch.y_transformed(self.current_height.max(0) as u32);
                self.on_touch_motion(touch.time(), touch.seat_slot(), x, y);
            }
            Event::Touch(TouchEvent::Up(touch)) => {
                self.on_touch_up(touch.time(), touch.seat_slot());
            }
            Event::Touch(TouchEvent::Cancel(_)) => {
                self.on_touch_cancel();
            }
            // batching marker, no state change
            Event::Touch(TouchEvent::Frame(_)) => {}
            _ => {}
        }
    }

    // Move the cursor plane once per pass when the drained events
    // changed the pointer position.
    fn sync_cursor_after_pass(&mut self, previous: (f64, f64)) {
        let position = self.pointer.position();
        if self.show_cursor && position != previous {
            if let Some(window) = self.native_window.as_mut() {
                window.move_cursor(position.0, position.1);
            }
        }
    }

    fn on_pointer_device_added(&mut self, has_pointer: bool) {
        if !self.show_cursor || !has_pointer {
            return;
        }
        let (x, y) = self.pointer.position();
        match self.native_window.as_mut() {
            Some(window) => window.show_cursor(x, y),
            // No surface yet; applied by the next create_render_surface
            None => self.pending_cursor_add = true,
        }
    }

    fn on_pointer_device_removed(&mut self, has_pointer: bool) {
        if self.show_cursor && has_pointer {
            self.pending_cursor_add = false;
            if let Some(window) = self.native_window.as_mut() {
                window.dismiss_cursor();
            }
        }
    }

    fn on_key(&mut self, keycode: u16, pressed: bool) {
        if let Some(delegate) = self.delegate.as_deref_mut() {
            delegate.on_key(keycode, pressed);
        }
    }

    fn on_pointer_motion(&mut self, dx: f64, dy: f64) {
        let (x, y) = self.pointer.apply_delta(dx, dy);
        if let Some(delegate) = self.delegate.as_deref_mut() {
            delegate.on_pointer_move(x, y);
        }
    }

    fn on_pointer_motion_absolute(&mut self, x: f64, y: f64) {
        let (x, y) = self.pointer.set_position(x, y);
        if let Some(delegate) = self.delegate.as_deref_mut() {
            delegate.on_pointer_move(x, y);
        }
    }

    fn on_pointer_button(&mut self, code: u32, pressed: bool) {
        let Some(button) = map_pointer_button(code) else {
            error!("Not expected button input: {:#x}", code);
            return;
        };
        let (x, y) = self.pointer.position();
        if let Some(delegate) = self.delegate.as_deref_mut() {
            if pressed {
                delegate.on_pointer_down(x, y, button);
            } else {
                delegate.on_pointer_up(x, y, button);
            }
        }
    }

    fn on_scroll(&mut self, axis: Axis, delta: f64) {
        let (x, y) = self.pointer.position();
        if let Some(delegate) = self.delegate.as_deref_mut() {
            let (dx, dy) = match axis {
                Axis::Horizontal => (delta, 0.0),
                Axis::Vertical => (0.0, delta),
            };
            delegate.on_scroll(x, y, dx, dy, SCROLL_OFFSET_MULTIPLIER);
        }
    }

    fn on_touch_down(&mut self, time: u32, slot: u32, x: f64, y: f64) {
        if let Some(delegate) = self.delegate.as_deref_mut() {
            delegate.on_touch_down(time, slot, x, y);
        }
    }

    fn on_touch_motion(&mut self, time: u32, slot: u32, x: f64, y: f64) {
        if let Some(delegate) = self.delegate.as_deref_mut() {
            delegate.on_touch_motion(time, slot, x, y);
        }
    }

    fn on_touch_up(&mut self, time: u32, slot: u32) {
        if let Some(delegate) = self.delegate.as_deref_mut() {
            delegate.on_touch_up(time, slot);
        }
    }

    fn on_touch_cancel(&mut self) {
        if let Some(delegate) = self.delegate.as_deref_mut() {
            delegate.on_touch_cancel();
        }
    }
}

impl<W: DrmNativeWindow> WindowBindingHandler for DrmWindowBinding<W> {
    type Surface = W::Surface;

    fn dispatch_event(&mut self) -> bool {
        let ready = {
            let Some(poller) = self.poller.as_ref() else {
                return true;
            };
            let mut events = [EpollEvent::empty(); 1];
            // zero timeout: one non-blocking pass, never stalls the host
            match poller.wait(&mut events, EpollTimeout::from(0u8)) {
                Ok(count) => count,
                Err(e) => {
                    error!("Input poll failed: {}", e);
                    return true;
                }
            }
        };
        if ready > 0 {
            self.pump_input();
        }
        true
    }

    fn create_render_surface(&mut self, width: u32, height: u32) -> bool {
        match self.try_create_render_surface(width, height) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to create the render surface: {:#}", e);
                false
            }
        }
    }

    fn destroy_render_surface(&mut self) {
        // the surface holds a back-reference into window resources;
        // release it before the window
        self.render_surface = None;
        self.native_window = None;
        self.display_valid = false;
        if self.state == BindingState::Active {
            self.state = BindingState::AwaitingSurface;
        }
    }

    fn render_surface_target(&self) -> Option<&Self::Surface> {
        self.render_surface.as_ref()
    }

    fn set_view(&mut self, view: Box<dyn BindingDelegate>) {
        self.delegate = Some(view);
    }

    fn dpi_scale(&self) -> f64 {
        self.dpi_scale
    }

    fn physical_window_bounds(&self) -> PhysicalWindowBounds {
        PhysicalWindowBounds {
            width: self.current_width.max(0) as u32,
            height: self.current_height.max(0) as u32,
        }
    }

    fn update_cursor(&mut self, cursor_name: &str) {
        if self.show_cursor {
            let (x, y) = self.pointer.position();
            if let Some(window) = self.native_window.as_mut() {
                window.update_cursor(cursor_name, x, y);
            }
        }
    }

    fn update_virtual_keyboard_status(&mut self, _show: bool) {
        // no virtual keyboard on this backend
    }

    fn clipboard_data(&self) -> &str {
        &self.clipboard
    }

    fn set_clipboard_data(&mut self, data: String) {
        self.clipboard = data;
    }
}

/// Resolve the DRM device path from the environment override, falling
/// back to the default device with a warning.
fn resolve_device_path() -> String {
    match std::env::var(DRM_DEVICE_ENV_KEY) {
        Ok(path) if !path.is_empty() => path,
        _ => {
            warn!(
                "{} is not set, using {}",
                DRM_DEVICE_ENV_KEY, DRM_DEVICE_DEFAULT
            );
            DRM_DEVICE_DEFAULT.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{PointerButton, BTN_LEFT};
    use serial_test::serial;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum CursorOp {
        Show(f64, f64),
        Dismiss,
        Move(f64, f64),
        Update(String, f64, f64),
    }

    thread_local! {
        static OPENED_PATHS: RefCell<Vec<String>> = RefCell::new(Vec::new());
        static CURSOR_OPS: RefCell<Vec<CursorOp>> = RefCell::new(Vec::new());
        static MOCK_OUTPUT_SIZE: Cell<(i32, i32)> = Cell::new((1920, 1080));
        static MOCK_SURFACE_VALID: Cell<bool> = Cell::new(true);
    }

    fn cursor_ops() -> Vec<CursorOp> {
        CURSOR_OPS.with(|ops| ops.borrow().clone())
    }

    fn reset_mocks() {
        OPENED_PATHS.with(|p| p.borrow_mut().clear());
        CURSOR_OPS.with(|o| o.borrow_mut().clear());
        MOCK_OUTPUT_SIZE.with(|s| s.set((1920, 1080)));
        MOCK_SURFACE_VALID.with(|v| v.set(true));
    }

    struct MockWindow {
        width: i32,
        height: i32,
    }

    impl NativeWindow for MockWindow {
        fn is_valid(&self) -> bool {
            true
        }
        fn width(&self) -> i32 {
            self.width
        }
        fn height(&self) -> i32 {
            self.height
        }
        fn resize(&mut self, width: u32, height: u32) -> Result<()> {
            self.width = width as i32;
            self.height = height as i32;
            Ok(())
        }
    }

    struct MockSurface {
        valid: bool,
    }

    impl RenderSurface for MockSurface {
        fn is_valid(&self) -> bool {
            self.valid
        }
        fn make_current(&self) -> std::result::Result<(), crate::surface::SurfaceError> {
            Ok(())
        }
        fn make_resource_current(&self) -> std::result::Result<(), crate::surface::SurfaceError> {
            Ok(())
        }
        fn swap_buffers(&self) -> std::result::Result<(), crate::surface::SurfaceError> {
            Ok(())
        }
    }

    impl DrmNativeWindow for MockWindow {
        type Surface = MockSurface;

        fn open(device_path: &str) -> Result<Self> {
            OPENED_PATHS.with(|p| p.borrow_mut().push(device_path.to_string()));
            let (width, height) = MOCK_OUTPUT_SIZE.with(|s| s.get());
            Ok(Self { width, height })
        }

        fn create_render_surface(&mut self, _frame_meter: bool) -> Result<Self::Surface> {
            Ok(MockSurface {
                valid: MOCK_SURFACE_VALID.with(|v| v.get()),
            })
        }

        fn show_cursor(&mut self, x: f64, y: f64) {
            CURSOR_OPS.with(|o| o.borrow_mut().push(CursorOp::Show(x, y)));
        }

        fn dismiss_cursor(&mut self) {
            CURSOR_OPS.with(|o| o.borrow_mut().push(CursorOp::Dismiss));
        }

        fn move_cursor(&mut self, x: f64, y: f64) {
            CURSOR_OPS.with(|o| o.borrow_mut().push(CursorOp::Move(x, y)));
        }

        fn update_cursor(&mut self, cursor_name: &str, x: f64, y: f64) {
            CURSOR_OPS.with(|o| {
                o.borrow_mut()
                    .push(CursorOp::Update(cursor_name.to_string(), x, y))
            });
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum DelegateCall {
        SizeChanged(u32, u32),
        Key(u16, bool),
        PointerMove(f64, f64),
        PointerDown(f64, f64, PointerButton),
        PointerUp(f64, f64, PointerButton),
        Scroll(f64, f64, f64, f64, i32),
        TouchDown(u32, u32, f64, f64),
        TouchUp(u32, u32),
        TouchCancel,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Rc<RefCell<Vec<DelegateCall>>>,
    }

    impl BindingDelegate for Recorder {
        fn on_window_size_changed(&mut self, width: u32, height: u32) {
            self.calls
                .borrow_mut()
                .push(DelegateCall::SizeChanged(width, height));
        }
        fn on_key(&mut self, keycode: u16, pressed: bool) {
            self.calls.borrow_mut().push(DelegateCall::Key(keycode, pressed));
        }
        fn on_pointer_move(&mut self, x: f64, y: f64) {
            self.calls.borrow_mut().push(DelegateCall::PointerMove(x, y));
        }
        fn on_pointer_down(&mut self, x: f64, y: f64, button: PointerButton) {
            self.calls
                .borrow_mut()
                .push(DelegateCall::PointerDown(x, y, button));
        }
        fn on_pointer_up(&mut self, x: f64, y: f64, button: PointerButton) {
            self.calls
                .borrow_mut()
                .push(DelegateCall::PointerUp(x, y, button));
        }
        fn on_scroll(&mut self, x: f64, y: f64, dx: f64, dy: f64, multiplier: i32) {
            self.calls
                .borrow_mut()
                .push(DelegateCall::Scroll(x, y, dx, dy, multiplier));
        }
        fn on_touch_down(&mut self, time: u32, slot: u32, x: f64, y: f64) {
            self.calls
                .borrow_mut()
                .push(DelegateCall::TouchDown(time, slot, x, y));
        }
        fn on_touch_up(&mut self, time: u32, slot: u32) {
            self.calls.borrow_mut().push(DelegateCall::TouchUp(time, slot));
        }
        fn on_touch_motion(&mut self, _time: u32, _slot: u32, _x: f64, _y: f64) {}
        fn on_touch_cancel(&mut self) {
            self.calls.borrow_mut().push(DelegateCall::TouchCancel);
        }
    }

    fn binding_with_recorder(
        mode: WindowMode,
        show_cursor: bool,
    ) -> (DrmWindowBinding<MockWindow>, Rc<RefCell<Vec<DelegateCall>>>) {
        let mut binding = DrmWindowBinding::<MockWindow>::new_detached(mode, 100, 100, show_cursor);
        let recorder = Recorder::default();
        let calls = recorder.calls.clone();
        binding.set_view(Box::new(recorder));
        (binding, calls)
    }

    #[test]
    #[serial]
    fn default_device_path_is_used_when_env_unset() {
        reset_mocks();
        std::env::remove_var(DRM_DEVICE_ENV_KEY);
        let (mut binding, _) = binding_with_recorder(WindowMode::Fullscreen, false);
        assert!(binding.create_render_surface(0, 0));
        let opened = OPENED_PATHS.with(|p| p.borrow().clone());
        assert_eq!(opened, vec![DRM_DEVICE_DEFAULT.to_string()]);
        assert!(binding.is_valid());
    }

    #[test]
    #[serial]
    fn env_override_selects_the_device() {
        reset_mocks();
        std::env::set_var(DRM_DEVICE_ENV_KEY, "/dev/dri/card7");
        let (mut binding, _) = binding_with_recorder(WindowMode::Fullscreen, false);
        assert!(binding.create_render_surface(0, 0));
        std::env::remove_var(DRM_DEVICE_ENV_KEY);
        let opened = OPENED_PATHS.with(|p| p.borrow().clone());
        assert_eq!(opened, vec!["/dev/dri/card7".to_string()]);
    }

    #[test]
    #[serial]
    fn destroy_then_create_restores_an_active_binding() {
        reset_mocks();
        std::env::remove_var(DRM_DEVICE_ENV_KEY);
        let (mut binding, _) = binding_with_recorder(WindowMode::Fullscreen, false);
        assert!(binding.create_render_surface(0, 0));
        assert!(binding.is_valid());

        binding.destroy_render_surface();
        assert!(!binding.is_valid());
        assert!(binding.render_surface_target().is_none());

        assert!(binding.create_render_surface(0, 0));
        assert!(binding.is_valid());
        assert!(binding.render_surface_target().is_some());
    }

    #[test]
    #[serial]
    fn second_create_without_destroy_is_rejected() {
        reset_mocks();
        std::env::remove_var(DRM_DEVICE_ENV_KEY);
        let (mut binding, _) = binding_with_recorder(WindowMode::Fullscreen, false);
        assert!(binding.create_render_surface(0, 0));
        assert!(!binding.create_render_surface(0, 0));
        // the live surface is untouched
        assert!(binding.is_valid());
    }

    #[test]
    #[serial]
    fn validity_is_conjunctive() {
        reset_mocks();
        std::env::remove_var(DRM_DEVICE_ENV_KEY);

        // no surface yet
        let (binding, _) = binding_with_recorder(WindowMode::Fullscreen, false);
        assert!(!binding.is_valid());

        // surface present but invalid
        MOCK_SURFACE_VALID.with(|v| v.set(false));
        let (mut binding, _) = binding_with_recorder(WindowMode::Fullscreen, false);
        assert!(binding.create_render_surface(0, 0));
        assert!(!binding.is_valid());
    }

    #[test]
    #[serial]
    fn fullscreen_adopts_the_output_resolution() {
        reset_mocks();
        std::env::remove_var(DRM_DEVICE_ENV_KEY);
        MOCK_OUTPUT_SIZE.with(|s| s.set((2560, 1440)));
        let (mut binding, calls) = binding_with_recorder(WindowMode::Fullscreen, false);
        assert!(binding.create_render_surface(0, 0));
        assert_eq!(
            binding.physical_window_bounds(),
            PhysicalWindowBounds {
                width: 2560,
                height: 1440
            }
        );
        assert_eq!(
            calls.borrow().as_slice(),
            &[DelegateCall::SizeChanged(2560, 1440)]
        );
    }

    #[test]
    #[serial]
    fn cursor_show_is_deferred_until_surface_creation() {
        reset_mocks();
        std::env::remove_var(DRM_DEVICE_ENV_KEY);
        let (mut binding, _) = binding_with_recorder(WindowMode::Fullscreen, true);

        // pointer hot-plug before any surface exists
        binding.on_pointer_device_added(true);
        assert!(cursor_ops().is_empty());

        assert!(binding.create_render_surface(0, 0));
        assert_eq!(cursor_ops(), vec![CursorOp::Show(0.0, 0.0)]);
    }

    #[test]
    #[serial]
    fn cursor_shows_immediately_when_surface_exists() {
        reset_mocks();
        std::env::remove_var(DRM_DEVICE_ENV_KEY);
        let (mut binding, _) = binding_with_recorder(WindowMode::Fullscreen, true);
        assert!(binding.create_render_surface(0, 0));
        binding.on_pointer_device_added(true);
        assert_eq!(cursor_ops(), vec![CursorOp::Show(0.0, 0.0)]);

        binding.on_pointer_device_removed(true);
        assert_eq!(
            cursor_ops(),
            vec![CursorOp::Show(0.0, 0.0), CursorOp::Dismiss]
        );
    }

    #[test]
    fn non_pointer_devices_do_not_touch_the_cursor() {
        reset_mocks();
        let (mut binding, _) = binding_with_recorder(WindowMode::Fullscreen, true);
        binding.on_pointer_device_added(false);
        assert!(!binding.pending_cursor_add);
        assert!(cursor_ops().is_empty());
    }

    #[test]
    fn unmapped_button_is_dropped_and_processing_continues() {
        reset_mocks();
        let (mut binding, calls) = binding_with_recorder(WindowMode::Fullscreen, false);

        binding.on_pointer_button(0x999, true);
        assert!(calls.borrow().is_empty());

        binding.on_pointer_button(BTN_LEFT, true);
        assert_eq!(
            calls.borrow().as_slice(),
            &[DelegateCall::PointerDown(0.0, 0.0, PointerButton::Primary)]
        );
    }

    #[test]
    #[serial]
    fn relative_motion_is_clamped_and_cursor_move_coalesced() {
        reset_mocks();
        std::env::remove_var(DRM_DEVICE_ENV_KEY);
        MOCK_OUTPUT_SIZE.with(|s| s.set((100, 100)));
        let (mut binding, calls) = binding_with_recorder(WindowMode::Fullscreen, true);
        assert!(binding.create_render_surface(0, 0));
        CURSOR_OPS.with(|o| o.borrow_mut().clear());
        calls.borrow_mut().clear();

        // one pump pass with two motion events
        let previous = binding.pointer.position();
        binding.on_pointer_motion(5.0, 5.0);
        binding.on_pointer_motion(-3.0, -3.0);
        binding.sync_cursor_after_pass(previous);

        // the delegate saw each step, the cursor moved once
        assert_eq!(
            calls.borrow().as_slice(),
            &[
                DelegateCall::PointerMove(5.0, 5.0),
                DelegateCall::PointerMove(2.0, 2.0),
            ]
        );
        assert_eq!(cursor_ops(), vec![CursorOp::Move(2.0, 2.0)]);
    }

    #[test]
    fn unchanged_position_moves_no_cursor() {
        reset_mocks();
        let (mut binding, _) = binding_with_recorder(WindowMode::Fullscreen, true);
        let previous = binding.pointer.position();
        binding.sync_cursor_after_pass(previous);
        assert!(cursor_ops().is_empty());
    }

    #[test]
    fn scroll_forwards_axis_deltas_with_the_offset_multiplier() {
        reset_mocks();
        let (mut binding, calls) = binding_with_recorder(WindowMode::Fullscreen, false);

        // three wheel clicks on the vertical axis
        binding.on_scroll(Axis::Vertical, wheel_scroll_delta(360.0));
        binding.on_scroll(Axis::Horizontal, 1.5);

        assert_eq!(
            calls.borrow().as_slice(),
            &[
                DelegateCall::Scroll(0.0, 0.0, 0.0, 30.0, SCROLL_OFFSET_MULTIPLIER),
                DelegateCall::Scroll(0.0, 0.0, 1.5, 0.0, SCROLL_OFFSET_MULTIPLIER),
            ]
        );
    }

    #[test]
    fn events_without_a_delegate_still_update_state() {
        reset_mocks();
        let mut binding =
            DrmWindowBinding::<MockWindow>::new_detached(WindowMode::Fullscreen, 100, 100, false);
        binding.on_pointer_motion(5.0, 7.0);
        binding.on_key(30, true);
        binding.on_touch_cancel();
        assert_eq!(binding.pointer.position(), (5.0, 7.0));
    }

    #[test]
    fn key_and_touch_events_are_forwarded() {
        reset_mocks();
        let (mut binding, calls) = binding_with_recorder(WindowMode::Fullscreen, false);
        binding.on_key(30, true);
        binding.on_key(30, false);
        binding.on_touch_down(10, 0, 50.0, 60.0);
        binding.on_touch_up(12, 0);
        binding.on_touch_cancel();
        assert_eq!(
            calls.borrow().as_slice(),
            &[
                DelegateCall::Key(30, true),
                DelegateCall::Key(30, false),
                DelegateCall::TouchDown(10, 0, 50.0, 60.0),
                DelegateCall::TouchUp(12, 0),
                DelegateCall::TouchCancel,
            ]
        );
    }

    #[test]
    fn clipboard_data_roundtrips() {
        reset_mocks();
        let (mut binding, _) = binding_with_recorder(WindowMode::Fullscreen, false);
        assert_eq!(binding.clipboard_data(), "");
        binding.set_clipboard_data("copied text".to_string());
        assert_eq!(binding.clipboard_data(), "copied text");
    }

    #[test]
    #[serial]
    fn cursor_restyle_uses_the_current_position() {
        reset_mocks();
        let (mut binding, _) = binding_with_recorder(WindowMode::Fullscreen, true);
        assert!(binding.create_render_surface(0, 0));
        binding.on_pointer_motion(10.0, 20.0);
        binding.update_cursor("text");
        assert!(cursor_ops().contains(&CursorOp::Update("text".to_string(), 10.0, 20.0)));
    }
}

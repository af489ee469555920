//! plinth demo host
//!
//! Stands in for the engine host: constructs the compiled backend
//! binding, installs a logging delegate, and drives the frame loop the
//! way a real host does — one `dispatch_event()` per iteration, then
//! make-current, render, swap.

use anyhow::{bail, Result};
use glow::HasContext;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use plinth::{
    BindingDelegate, Config, PlatformWindowBinding, PointerButton, RenderSurface,
    WindowBindingHandler, WindowMode,
};

/// Set by SIGTERM/SIGINT handlers
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

fn shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::Relaxed)
}

extern "C" fn shutdown_signal_handler(_signo: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::Relaxed);
}

fn setup_signal_handlers() {
    unsafe {
        libc::signal(
            libc::SIGTERM,
            shutdown_signal_handler as *const () as libc::sighandler_t,
        );
        libc::signal(
            libc::SIGINT,
            shutdown_signal_handler as *const () as libc::sighandler_t,
        );
    }
}

/// Delegate that logs every normalized event
struct EventLogger;

impl BindingDelegate for EventLogger {
    fn on_window_size_changed(&mut self, width: u32, height: u32) {
        info!("window size: {}x{}", width, height);
    }
    fn on_key(&mut self, keycode: u16, pressed: bool) {
        info!("key {} {}", keycode, if pressed { "down" } else { "up" });
    }
    fn on_pointer_move(&mut self, x: f64, y: f64) {
        debug!("pointer move ({:.0}, {:.0})", x, y);
    }
    fn on_pointer_down(&mut self, x: f64, y: f64, button: PointerButton) {
        info!("pointer down {:?} at ({:.0}, {:.0})", button, x, y);
    }
    fn on_pointer_up(&mut self, x: f64, y: f64, button: PointerButton) {
        info!("pointer up {:?} at ({:.0}, {:.0})", button, x, y);
    }
    fn on_scroll(&mut self, x: f64, y: f64, dx: f64, dy: f64, multiplier: i32) {
        info!(
            "scroll ({:.1}, {:.1}) x{} at ({:.0}, {:.0})",
            dx, dy, multiplier, x, y
        );
    }
    fn on_touch_down(&mut self, time: u32, slot: u32, x: f64, y: f64) {
        info!("touch down slot {} at ({:.0}, {:.0}) t={}", slot, x, y, time);
    }
    fn on_touch_up(&mut self, time: u32, slot: u32) {
        info!("touch up slot {} t={}", slot, time);
    }
    fn on_touch_motion(&mut self, _time: u32, slot: u32, x: f64, y: f64) {
        debug!("touch move slot {} ({:.0}, {:.0})", slot, x, y);
    }
    fn on_touch_cancel(&mut self) {
        info!("touch cancel");
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    setup_signal_handlers();

    let config = Config::load()?;
    let mode = if config.window.fullscreen {
        WindowMode::Fullscreen
    } else {
        WindowMode::Normal
    };

    let mut binding = PlatformWindowBinding::new(
        mode,
        config.window.width,
        config.window.height,
        config.window.show_cursor,
    );
    binding.set_frame_meter(config.diagnostics.frame_meter);
    binding.set_view(Box::new(EventLogger));

    if !binding.create_render_surface(config.window.width, config.window.height) {
        bail!("failed to create the render surface");
    }
    if !binding.is_valid() {
        bail!("window binding is invalid");
    }

    let bounds = binding.physical_window_bounds();
    info!("presenting at {}x{}", bounds.width, bounds.height);

    // GL entry points come from the surface's own loader
    let gl = {
        let surface = binding
            .render_surface_target()
            .ok_or_else(|| anyhow::anyhow!("no render surface"))?;
        surface.make_current()?;
        unsafe { glow::Context::from_loader_function(|name| surface.get_proc_address(name)) }
    };

    while !shutdown_requested() {
        binding.dispatch_event();

        let Some(surface) = binding.render_surface_target() else {
            break;
        };
        surface.make_current()?;
        unsafe {
            gl.clear_color(0.06, 0.06, 0.08, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT);
        }
        surface.swap_buffers()?;

        // crude frame pacing; scanout here is not vsync-driven
        std::thread::sleep(Duration::from_millis(16));
    }

    info!("shutting down");
    binding.destroy_render_surface();
    Ok(())
}

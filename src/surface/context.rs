//! EGL bootstrap
//!
//! Dynamic libEGL loading and GBM-platform display/context setup.

use anyhow::{anyhow, Context, Result};
use gbm::AsRaw;
use khronos_egl as egl;
use log::info;
use std::ffi::c_void;
use std::rc::Rc;

use super::egl_surface::EglSurface;

// EGL_PLATFORM_GBM_KHR (EGL extension)
const EGL_PLATFORM_GBM_KHR: egl::Enum = 0x31D7;

/// EGL instance type (dynamic loading)
pub type EglInstance = egl::Instance<egl::Dynamic<libloading::Library, egl::EGL1_5>>;

/// EGL display/context bundle for one output
///
/// Owns the display connection and both rendering contexts; window
/// surfaces created from it must be dropped before the bundle.
pub struct EglContext {
    instance: Rc<EglInstance>,
    display: egl::Display,
    config: egl::Config,
    context: egl::Context,
    resource_context: egl::Context,
}

impl EglContext {
    /// Initialize EGL on the GBM platform
    pub fn new(gbm_device: &gbm::Device<std::fs::File>) -> Result<Self> {
        // Load EGL library
        let lib = unsafe {
            libloading::Library::new("libEGL.so.1")
                .or_else(|_| libloading::Library::new("libEGL.so"))
                .context("Failed to load EGL library")?
        };

        let instance: EglInstance = unsafe {
            egl::DynamicInstance::<egl::EGL1_5>::load_required_from(lib)
                .context("Failed to create EGL instance")?
        };

        // Get display with GBM platform
        let display = unsafe {
            instance
                .get_platform_display(
                    EGL_PLATFORM_GBM_KHR,
                    gbm_device.as_raw() as *mut c_void,
                    &[egl::ATTRIB_NONE],
                )
                .context("Failed to get EGL display")?
        };

        instance
            .initialize(display)
            .context("Failed to initialize EGL")?;

        if let Ok(version) = instance.query_string(Some(display), egl::VERSION) {
            info!("EGL version: {}", version.to_string_lossy());
        }

        instance
            .bind_api(egl::OPENGL_ES_API)
            .context("Failed to bind OpenGL ES API")?;

        // Choose config (try ES3, fall back to ES2)
        let config = Self::choose_config(&instance, display, egl::OPENGL_ES3_BIT)
            .or_else(|_| Self::choose_config(&instance, display, egl::OPENGL_ES2_BIT))
            .context("Failed to choose EGL config")?;

        let context_attribs_es3 = [egl::CONTEXT_CLIENT_VERSION, 3, egl::NONE];
        let context_attribs_es2 = [egl::CONTEXT_CLIENT_VERSION, 2, egl::NONE];
        let context = instance
            .create_context(display, config, None, &context_attribs_es3)
            .or_else(|_| instance.create_context(display, config, None, &context_attribs_es2))
            .context("Failed to create EGL context")?;

        // Second context shared with the primary, for resource uploads
        // and the diagnostics overlay
        let resource_context = instance
            .create_context(display, config, Some(context), &context_attribs_es3)
            .or_else(|_| {
                instance.create_context(display, config, Some(context), &context_attribs_es2)
            })
            .context("Failed to create shared EGL context")?;

        info!("EGL context created");

        Ok(Self {
            instance: Rc::new(instance),
            display,
            config,
            context,
            resource_context,
        })
    }

    /// Create a window surface over a GBM surface and wrap it together
    /// with this bundle's contexts.
    pub fn create_window_surface(
        &self,
        gbm_surface: &gbm::Surface<std::fs::File>,
        frame_meter: bool,
    ) -> Result<EglSurface> {
        // Try the platform entry point first, fall back to the legacy one
        let surface = unsafe {
            self.instance
                .create_platform_window_surface(
                    self.display,
                    self.config,
                    gbm_surface.as_raw() as *mut c_void,
                    &[egl::ATTRIB_NONE],
                )
                .or_else(|_| {
                    self.instance.create_window_surface(
                        self.display,
                        self.config,
                        gbm_surface.as_raw() as egl::NativeWindowType,
                        None,
                    )
                })
                .context("Failed to create EGL surface")?
        };

        Ok(EglSurface::new(
            self.instance.clone(),
            self.display,
            surface,
            self.context,
            self.resource_context,
            frame_meter,
        ))
    }

    /// Choose an EGL config for the given renderable type
    fn choose_config(
        instance: &EglInstance,
        display: egl::Display,
        renderable_type: egl::Int,
    ) -> Result<egl::Config> {
        let config_attribs = [
            egl::SURFACE_TYPE,
            egl::WINDOW_BIT,
            egl::RED_SIZE,
            8,
            egl::GREEN_SIZE,
            8,
            egl::BLUE_SIZE,
            8,
            egl::ALPHA_SIZE,
            8,
            egl::DEPTH_SIZE,
            0,
            egl::RENDERABLE_TYPE,
            renderable_type,
            egl::NONE,
        ];

        instance
            .choose_first_config(display, &config_attribs)
            .context("choose_first_config failed")?
            .ok_or_else(|| anyhow!("No suitable EGL config found"))
    }
}

impl Drop for EglContext {
    fn drop(&mut self) {
        let _ = self.instance.make_current(self.display, None, None, None);
        let _ = self
            .instance
            .destroy_context(self.display, self.resource_context);
        let _ = self.instance.destroy_context(self.display, self.context);
        let _ = self.instance.terminate(self.display);
    }
}

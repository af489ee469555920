//! DRM card access
//!
//! Opens a DRM device node and enumerates the connectors, CRTCs, and
//! encoders needed to bring up one output.

use anyhow::{anyhow, Context, Result};
use drm::control::{connector, crtc, encoder, Device as ControlDevice, ResourceHandles};
use drm::Device as BasicDevice;
use log::{debug, info};
use std::fs::{File, OpenOptions};
use std::os::unix::io::{AsFd, AsRawFd, BorrowedFd, FromRawFd, RawFd};
use std::path::Path;

/// DRM card wrapper
pub struct Card {
    file: File,
    resources: ResourceHandles,
}

// Trait implementations required by the drm crate
impl AsFd for Card {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

impl BasicDevice for Card {}
impl ControlDevice for Card {}

impl Card {
    /// Open a DRM device node
    ///
    /// # Arguments
    /// * `path` - Device path (e.g., "/dev/dri/card0")
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening DRM device: {}", path.display());

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("Cannot open DRM device {}", path.display()))?;

        // Temporary wrapper so resources can be probed before Self exists
        struct TempDevice<'a>(&'a File);
        impl AsFd for TempDevice<'_> {
            fn as_fd(&self) -> BorrowedFd<'_> {
                self.0.as_fd()
            }
        }
        impl BasicDevice for TempDevice<'_> {}
        impl ControlDevice for TempDevice<'_> {}

        let temp = TempDevice(&file);
        let resources = temp
            .resource_handles()
            .context("Failed to get DRM resources")?;

        info!(
            "DRM resources: connectors={}, crtcs={}, encoders={}",
            resources.connectors().len(),
            resources.crtcs().len(),
            resources.encoders().len()
        );

        Ok(Self { file, resources })
    }

    /// Get connector info
    pub fn connector_info(&self, handle: connector::Handle) -> Result<connector::Info> {
        ControlDevice::get_connector(self, handle, false)
            .with_context(|| format!("Failed to get connector {:?} info", handle))
    }

    /// Get encoder info
    pub fn encoder_info(&self, handle: encoder::Handle) -> Result<encoder::Info> {
        ControlDevice::get_encoder(self, handle)
            .with_context(|| format!("Failed to get encoder {:?} info", handle))
    }

    /// Get CRTC info
    pub fn crtc_info(&self, handle: crtc::Handle) -> Result<crtc::Info> {
        ControlDevice::get_crtc(self, handle)
            .with_context(|| format!("Failed to get CRTC {:?} info", handle))
    }

    /// Get RawFd (needed for GBM/EGL)
    pub fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    /// Duplicate the card fd and return it as a File (for the GBM device)
    pub fn dup_fd(&self) -> Result<File> {
        let fd = unsafe { libc::dup(self.file.as_raw_fd()) };
        if fd < 0 {
            return Err(anyhow!(
                "fd dup failed: {}",
                std::io::Error::last_os_error()
            ));
        }
        Ok(unsafe { File::from_raw_fd(fd) })
    }

    /// Find a connected connector
    pub fn find_connected_connector(&self) -> Result<(connector::Handle, connector::Info)> {
        for &handle in self.resources.connectors() {
            let info = self.connector_info(handle)?;
            if info.state() == connector::State::Connected {
                debug!("Found connected connector: {:?}", handle);
                return Ok((handle, info));
            }
        }
        Err(anyhow!("No connected connector found"))
    }

    /// Find a CRTC that can drive the given connector
    pub fn find_crtc_for_connector(
        &self,
        connector: &connector::Info,
    ) -> Result<(crtc::Handle, crtc::Info)> {
        // The encoder currently attached wins
        if let Some(encoder_handle) = connector.current_encoder() {
            let encoder = self.encoder_info(encoder_handle)?;
            if let Some(crtc_handle) = encoder.crtc() {
                let crtc = self.crtc_info(crtc_handle)?;
                return Ok((crtc_handle, crtc));
            }
        }

        // Otherwise take the first CRTC any of its encoders supports
        for &encoder_handle in connector.encoders() {
            let encoder = self.encoder_info(encoder_handle)?;
            let possible = encoder.possible_crtcs();
            let filtered = self.resources.filter_crtcs(possible);

            for crtc_handle in filtered {
                let crtc = self.crtc_info(crtc_handle)?;
                return Ok((crtc_handle, crtc));
            }
        }

        Err(anyhow!("No CRTC found for connector"))
    }
}

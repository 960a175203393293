//! Input backend seam and scoped device ownership
//!
//! [`InputBackend`] is the narrow set of operations the sampler needs from an
//! input library. [`DeviceSession`] owns one backend and guarantees that the
//! device and the subsystem are released exactly once, whichever way the
//! sampler exits.

use std::fmt;

use tracing::{debug, info, warn};

use super::error::SamplerError;

/// Index of an analog channel in the device's native axis layout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AxisIndex(pub usize);

impl AxisIndex {
    pub const X: AxisIndex = AxisIndex(0);
    pub const Y: AxisIndex = AxisIndex(1);
    pub const TRIGGER: AxisIndex = AxisIndex(5);
}

impl fmt::Display for AxisIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "axis {}", self.0)
    }
}

/// Identity of the opened device, for logging
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub id: String,
}

/// Operations consumed from the underlying input library
pub trait InputBackend: fmt::Debug {
    /// Start the input subsystem
    fn initialize(&mut self) -> Result<(), SamplerError>;

    /// Open the first device the subsystem discovered
    fn open_first_device(&mut self) -> Result<DeviceInfo, SamplerError>;

    /// Make the latest hardware levels available to `read_axis`; never blocks
    fn refresh_state(&mut self) -> Result<(), SamplerError>;

    /// Current level of one axis in the native signed 16-bit range
    fn read_axis(&self, axis: AxisIndex) -> Result<i16, SamplerError>;

    fn close(&mut self);

    fn shutdown_subsystem(&mut self);
}

/// Exclusive owner of one backend with guaranteed release
#[derive(Debug)]
pub struct DeviceSession {
    backend: Box<dyn InputBackend>,
    subsystem_up: bool,
    device_open: bool,
}

impl DeviceSession {
    pub fn new(backend: Box<dyn InputBackend>) -> Self {
        Self {
            backend,
            subsystem_up: false,
            device_open: false,
        }
    }

    /// Start the subsystem and open the first device
    ///
    /// On failure whatever was acquired stays tracked, so `shutdown` (or
    /// dropping the session) still releases it.
    pub fn open(&mut self) -> Result<DeviceInfo, SamplerError> {
        if self.device_open {
            warn!("Device session already open, refusing to open a second device");
            return Err(SamplerError::DeviceUnavailable(
                "a device is already open in this session".to_string(),
            ));
        }

        debug!("Initializing input subsystem");
        self.backend.initialize()?;
        self.subsystem_up = true;

        debug!("Opening first available device");
        let device = self.backend.open_first_device()?;
        self.device_open = true;
        info!("Opened device: {} ({})", device.name, device.id);
        Ok(device)
    }

    pub fn refresh(&mut self) -> Result<(), SamplerError> {
        if !self.device_open {
            return Err(SamplerError::DeviceReadError(
                "no device is open".to_string(),
            ));
        }
        self.backend.refresh_state()
    }

    pub fn read_axis(&self, axis: AxisIndex) -> Result<i16, SamplerError> {
        if !self.device_open {
            return Err(SamplerError::DeviceReadError(format!(
                "cannot read {} without an open device",
                axis
            )));
        }
        self.backend.read_axis(axis)
    }

    /// Close the device, then stop the subsystem; repeated calls do nothing
    pub fn shutdown(&mut self) {
        if self.device_open {
            debug!("Closing input device");
            self.backend.close();
            self.device_open = false;
        }
        if self.subsystem_up {
            debug!("Shutting down input subsystem");
            self.backend.shutdown_subsystem();
            self.subsystem_up = false;
            info!("Input subsystem released");
        }
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

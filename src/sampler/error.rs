//! Error definitions for the sampler subsystem

use thiserror::Error;

/// Errors raised while acquiring or reading the input device
///
/// None of these are recoverable: the sampler releases the device and the
/// process ends.
#[derive(Debug, Error)]
pub enum SamplerError {
    /// The input subsystem could not be started
    #[error("Failed to initialize input subsystem: {0}")]
    SubsystemInitError(String),

    /// No input device was present at open time
    #[error("No input device available: {0}")]
    DeviceUnavailable(String),

    /// The open device disappeared or could not be read
    #[error("Failed to read input device: {0}")]
    DeviceReadError(String),

    /// The console sink rejected a reading
    #[error("Failed to emit reading: {0}")]
    ReportError(#[from] std::io::Error),
}

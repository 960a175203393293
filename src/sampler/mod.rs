//! Sampler subsystem for joystick input
//!
//! Polls one device and turns its raw axes into readings:
//!
//! 1. [`backend`] - Input library seam and scoped device ownership
//! 2. [`gilrs_backend`] - gilrs implementation of the seam
//! 3. [`reading`] - Deadzone and trigger transforms
//! 4. [`input_sampler`] - Sampling state machine and report loop
//! 5. [`sampler_handle`] - Thread placement and lifecycle
//!
//! # Architecture
//!
//! ```text
//! Gamepad ──► Backend ──► InputSampler ──► stdout
//!             (raw axes)  (Reading, only when changed)
//! ```

pub mod backend;
pub mod error;
pub mod gilrs_backend;
pub mod input_sampler;
pub mod reading;
pub mod sampler_handle;

#[cfg(test)]
pub(crate) mod scripted_backend;

pub use sampler_handle::SamplerHandle;

use chrono::Local;
use statum::{machine, state};
use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::backend::{AxisIndex, DeviceSession, InputBackend};
use super::error::SamplerError;
use super::reading::Reading;
use crate::config::SamplerSettings;

// Sampler lifecycle states
#[state]
#[derive(Debug, Clone)]
pub enum SamplerState {
    Initializing,
    Sampling,
}

#[machine]
#[derive(Debug)]
pub struct InputSampler<S: SamplerState> {
    // Owns the backend; releases it on drop
    session: DeviceSession,

    settings: SamplerSettings,

    // Last reading written to the sink
    previous: Reading,
}

impl<S: SamplerState> InputSampler<S> {
    /// Release the device and the subsystem; safe to call repeatedly
    pub fn shutdown(&mut self) {
        self.session.shutdown();
    }
}

impl InputSampler<Initializing> {
    /// Wraps a backend without touching hardware yet
    pub fn create(backend: Box<dyn InputBackend>, settings: SamplerSettings) -> Self {
        debug!("Creating InputSampler with settings: {:?}", settings);
        Self::new(DeviceSession::new(backend), settings, Reading::default())
    }

    /// Start the subsystem, open the first device and begin sampling
    ///
    /// Anything acquired before a failure is released when `self` drops.
    pub fn initialize(mut self) -> Result<InputSampler<Sampling>, SamplerError> {
        info!("Initializing InputSampler");
        let device = self.session.open()?;
        self.previous = Reading::default();

        info!(
            "InputSampler ready on {}, transitioning to Sampling state",
            device.name
        );
        Ok(self.transition())
    }
}

impl InputSampler<Sampling> {
    /// Read the device once and turn the raw axes into a [`Reading`]
    pub fn sample(&mut self) -> Result<Reading, SamplerError> {
        self.session.refresh()?;

        let x_axis = self.session.read_axis(AxisIndex::X)?;
        let y_axis = self.session.read_axis(AxisIndex::Y)?;
        let trigger_axis = self.session.read_axis(AxisIndex::TRIGGER)?;

        let reading = Reading::from_raw(x_axis, y_axis, trigger_axis);
        debug!(
            "Raw ({}, {}, {}) -> {:?}",
            x_axis, y_axis, trigger_axis, reading
        );
        Ok(reading)
    }

    /// Returns the reading if it differs from the last reported one
    ///
    /// All three fields compare exactly, including `speed`.
    pub fn report_if_changed(&mut self, reading: Reading) -> Option<Reading> {
        if reading == self.previous {
            return None;
        }
        self.previous = reading;
        Some(reading)
    }

    pub fn previous(&self) -> Reading {
        self.previous
    }

    /// Sample until cancelled or the device fails, writing each change to `out`
    ///
    /// With `poll_interval_ms = 0` nothing sleeps between iterations, so the
    /// loop spins as fast as the backend answers.
    pub fn run_sampling_loop<W: Write>(
        &mut self,
        out: &mut W,
        cancel: &CancellationToken,
    ) -> Result<(), SamplerError> {
        let poll_interval = self.settings.poll_interval();
        let stats_interval = self.settings.stats_interval();
        match poll_interval {
            Some(interval) => info!("Starting sampling loop, polling every {:?}", interval),
            None => info!("Starting sampling loop, unthrottled"),
        }

        let mut samples: u64 = 0;
        let mut reports: u64 = 0;
        let mut last_stats_time = Local::now();

        loop {
            if cancel.is_cancelled() {
                info!("Sampling cancelled, last reading {:?}", self.previous());
                return Ok(());
            }

            let reading = match self.sample() {
                Ok(reading) => reading,
                Err(e) => {
                    error!("Error sampling device: {}", e);
                    return Err(e);
                }
            };
            samples += 1;

            if let Some(changed) = self.report_if_changed(reading) {
                writeln!(out, "{}", changed)?;
                out.flush()?;
                reports += 1;
            }

            if let Some(window) = stats_interval {
                let now = Local::now();
                let elapsed = now - last_stats_time;
                if elapsed > window {
                    info!(
                        "Sampler stats: {} samples, {} reports in last {} seconds (avg {:.2} samples/sec)",
                        samples,
                        reports,
                        elapsed.num_seconds(),
                        samples as f64 / elapsed.num_milliseconds().max(1) as f64 * 1000.0
                    );
                    samples = 0;
                    reports = 0;
                    last_stats_time = now;
                }
            }

            if let Some(interval) = poll_interval {
                std::thread::sleep(interval);
            }
        }
    }
}

//! Sampler Handle - runs the input sampler on its own blocking thread
//!
//! The backend is created, used and released on that one thread, so the
//! gilrs context never crosses threads. Cancellation reaches the loop through
//! a [`CancellationToken`] checked once per iteration.

use std::io::{self, Write};

use color_eyre::eyre::{eyre, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::backend::InputBackend;
use super::error::SamplerError;
use super::gilrs_backend::GilrsBackend;
use super::input_sampler::InputSampler;
use crate::config::SamplerSettings;

pub struct SamplerHandle {
    task: JoinHandle<Result<(), SamplerError>>,
}

impl SamplerHandle {
    /// Spawns the gilrs-backed sampler writing readings to stdout
    pub fn spawn(settings: SamplerSettings, cancel: CancellationToken) -> Self {
        info!("Spawning input sampler with settings: {:?}", settings);

        let task = tokio::task::spawn_blocking(move || {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            run_sampler(|| Box::new(GilrsBackend::new()), settings, &mut out, &cancel)
        });

        Self { task }
    }

    /// Waits for the sampler thread to finish
    pub async fn wait(self) -> Result<()> {
        let outcome = self
            .task
            .await
            .map_err(|e| eyre!("Sampler thread failed: {}", e))?;
        outcome?;
        Ok(())
    }
}

/// Initialize, loop and shut down one sampler
///
/// Shutdown runs on every path once initialization succeeded; a failed
/// initialization releases what it acquired on its own.
pub fn run_sampler<F, W>(
    make_backend: F,
    settings: SamplerSettings,
    out: &mut W,
    cancel: &CancellationToken,
) -> Result<(), SamplerError>
where
    F: FnOnce() -> Box<dyn InputBackend>,
    W: Write,
{
    let mut sampler = match InputSampler::create(make_backend(), settings).initialize() {
        Ok(sampler) => sampler,
        Err(e) => {
            error!("Failed to start input sampler: {}", e);
            return Err(e);
        }
    };

    let result = sampler.run_sampling_loop(out, cancel);
    sampler.shutdown();
    match &result {
        Ok(()) => info!("Input sampler stopped"),
        Err(e) => error!("Input sampler stopped with error: {}", e),
    }
    result
}

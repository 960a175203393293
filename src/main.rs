pub mod config;
pub mod sampler;

use crate::config::SamplerSettings;
use crate::sampler::SamplerHandle;
use color_eyre::Result;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let settings = setup().await?;

    let cancel = CancellationToken::new();
    spawn_interrupt_listener(cancel.clone());

    info!("Starting joystick sampler");
    let handle = SamplerHandle::spawn(settings, cancel);
    handle.wait().await?;

    info!("Joystick sampler finished");
    Ok(())
}

async fn setup() -> Result<SamplerSettings> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;

    let settings = SamplerSettings::load().await?;
    setup_logging_env(settings.log_level()?);
    info!(
        "Loaded settings from {}: {:?}",
        SamplerSettings::config_path().display(),
        settings
    );
    Ok(settings)
}

// Logs go to stderr; stdout only carries readings
fn setup_logging_env(level: Level) {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}

fn spawn_interrupt_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, stopping sampler");
                cancel.cancel();
            }
            Err(e) => warn!("Unable to listen for interrupt signal: {}", e),
        }
    });
}

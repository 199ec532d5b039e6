use std::env;

use log::{debug, info};
use musical_autoscale_core::{ScopeSession, SessionConfig};
use musical_autoscale_terminal::{DriverConfig, FrameStream, LaneBars, SyntheticSource, run_session};

/// how many things on the display dance with the waveform
const NUM_LANES: usize = 5;

fn main() -> anyhow::Result<()> {
    unsafe {
        env::set_var(
            "RUST_LOG",
            env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        );
    }

    env_logger::builder()
        .format_timestamp_nanos()
        .parse_default_env()
        .init();

    info!("hello, world!");

    let config = DriverConfig::from_env()?;
    info!("{config:?}");

    let mut session = ScopeSession::<NUM_LANES>::new(SessionConfig::default())?;

    let frames = FrameStream::spawn(SyntheticSource::new(config.fft_size), &config)?;

    debug!("frame thread spawned");

    let summary = run_session(&mut session, &frames.stream);

    let sent = frames.join()?;

    info!("final lanes: {}", LaneBars(&summary.last_levels));
    info!("final centroid: {:?}", summary.last_centroid);
    info!("{sent} frames sent. {summary:?}");

    Ok(())
}

//! Output device setup: the cpal stream owns the render half of the engine.

use color_eyre::eyre::{eyre, Result, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, RingBuffer};
use tracing::{error, info};

use loopstation::{Engine, EngineConfig, EngineHandle};

/// Samples kept for the oscilloscope.
pub const SCOPE_SIZE: usize = 1024;

pub struct Audio {
    pub stream: cpal::Stream,
    pub handle: EngineHandle,
    /// First output channel, for the oscilloscope.
    pub scope: Consumer<f32>,
}

pub fn start() -> Result<Audio> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let supported = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = supported.sample_rate().0 as f32;
    let channels = supported.channels() as usize;
    info!(
        device = device.name().unwrap_or_default(),
        sample_rate, channels, "opening output"
    );

    let config = EngineConfig::default()
        .with_sample_rate(sample_rate)
        .with_channels(channels);
    let (mut engine, handle) = Engine::new(config);
    let (mut scope_tx, scope) = RingBuffer::new(SCOPE_SIZE * 4);

    let stream = device.build_output_stream(
        &supported.into(),
        move |data: &mut [f32], _| {
            engine.render_interleaved(data, channels);

            for frame in data.chunks_exact(channels) {
                if scope_tx.push(frame[0]).is_err() {
                    break;
                }
            }
        },
        |err| error!(%err, "audio stream error"),
        None,
    )?;
    stream.play().wrap_err("failed to start output stream")?;

    Ok(Audio {
        stream,
        handle,
        scope,
    })
}

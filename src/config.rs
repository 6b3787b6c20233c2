//! Engine configuration.
//!
//! Built once at startup (usually from the output device) and handed to every
//! component that needs to know the sample rate, block size or pool sizes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::MAX_BLOCK_SIZE;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Output sample rate in Hz.
    pub sample_rate: f32,
    /// Largest block the render path processes in one go (frames).
    pub block_size: usize,
    /// Output channel count. Two or more enables panning.
    pub channels: usize,
    /// Voices per synthesizer.
    pub max_voices: usize,
    /// Tracks the mixer can ever hold.
    pub max_tracks: usize,
    /// Control commands that can be queued between two blocks.
    pub command_capacity: usize,
    /// Note events the sequencer can emit in one block.
    pub event_capacity: usize,
    /// Notes the render-side timeline snapshot holds without reallocating.
    pub timeline_capacity: usize,
    /// Realtime log records buffered between two drains.
    pub log_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            block_size: 512,
            channels: 2,
            max_voices: 8,
            max_tracks: 32,
            command_capacity: 256,
            event_capacity: 128,
            timeline_capacity: 4096,
            log_capacity: 1024,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_max_voices(mut self, max_voices: usize) -> Self {
        self.max_voices = max_voices;
        self
    }

    pub fn with_max_tracks(mut self, max_tracks: usize) -> Self {
        self.max_tracks = max_tracks;
        self
    }

    /// Clamp every field into a range the engine can run with.
    ///
    /// Called by `Engine::new`, so hand-built configs never need to be
    /// perfect.
    pub fn validated(mut self) -> Self {
        if !self.sample_rate.is_finite() || self.sample_rate < 1_000.0 {
            self.sample_rate = 48_000.0;
        }
        self.block_size = self.block_size.clamp(1, MAX_BLOCK_SIZE);
        self.channels = self.channels.max(1);
        self.max_voices = self.max_voices.max(1);
        self.max_tracks = self.max_tracks.max(1);
        self.command_capacity = self.command_capacity.max(1);
        self.event_capacity = self.event_capacity.max(1);
        self.log_capacity = self.log_capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validated_clamps_block_size() {
        let config = EngineConfig::default()
            .with_block_size(MAX_BLOCK_SIZE * 4)
            .validated();
        assert_eq!(config.block_size, MAX_BLOCK_SIZE);

        let config = EngineConfig::default().with_block_size(0).validated();
        assert_eq!(config.block_size, 1);
    }

    #[test]
    fn validated_repairs_nonsense_sample_rate() {
        let config = EngineConfig::default()
            .with_sample_rate(f32::NAN)
            .with_channels(0)
            .validated();
        assert_eq!(config.sample_rate, 48_000.0);
        assert_eq!(config.channels, 1);
    }
}

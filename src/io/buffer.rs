//! Planar multi-channel audio buffer.
//!
//! Storage is allocated once at construction. `set_frames` only moves the
//! active length inside that capacity, so resizing per block never touches
//! the allocator.

#[derive(Debug, Clone)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    frames: usize,
    capacity: usize,
}

impl AudioBuffer {
    pub fn new(num_channels: usize, capacity: usize) -> Self {
        Self {
            channels: (0..num_channels).map(|_| vec![0.0; capacity]).collect(),
            frames: capacity,
            capacity,
        }
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Set the active frame count, clamped to capacity.
    pub fn set_frames(&mut self, frames: usize) {
        self.frames = frames.min(self.capacity);
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index][..self.frames]
    }

    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        let frames = self.frames;
        &mut self.channels[index][..frames]
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        let frames = self.frames;
        self.channels.iter_mut().map(move |c| &mut c[..frames])
    }

    /// Zero the active frames of every channel.
    pub fn clear(&mut self) {
        for channel in self.channels_mut() {
            channel.fill(0.0);
        }
    }

    /// Add `other` into this buffer channel by channel.
    ///
    /// Channels missing from `other` are left untouched; frames beyond the
    /// shorter of the two buffers are ignored.
    pub fn add_from(&mut self, other: &AudioBuffer) {
        let frames = self.frames.min(other.frames);
        for (dst, src) in self.channels.iter_mut().zip(&other.channels) {
            for (d, s) in dst[..frames].iter_mut().zip(&src[..frames]) {
                *d += s;
            }
        }
    }

    /// Add a mono signal into every channel.
    pub fn add_mono(&mut self, mono: &[f32]) {
        for channel in self.channels_mut() {
            for (d, s) in channel.iter_mut().zip(mono) {
                *d += s;
            }
        }
    }

    pub fn apply_gain(&mut self, channel: usize, gain: f32) {
        for sample in self.channel_mut(channel) {
            *sample *= gain;
        }
    }

    pub fn apply_gain_all(&mut self, gain: f32) {
        for channel in self.channels_mut() {
            for sample in channel {
                *sample *= gain;
            }
        }
    }

    /// Hard-clamp every active sample into `[-1, 1]`.
    pub fn clamp_unit(&mut self) {
        for channel in self.channels_mut() {
            for sample in channel {
                *sample = sample.clamp(-1.0, 1.0);
            }
        }
    }

    /// Largest absolute sample value across all channels.
    pub fn peak(&self) -> f32 {
        (0..self.num_channels())
            .flat_map(|c| self.channel(c).iter())
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    /// Write the active frames into an interleaved device buffer.
    ///
    /// When the device has more channels than the buffer, the last buffer
    /// channel is repeated; extra buffer channels are dropped.
    pub fn write_interleaved(&self, out: &mut [f32], out_channels: usize) {
        if out_channels == 0 || self.channels.is_empty() {
            return;
        }
        let last = self.channels.len() - 1;
        for (frame, chunk) in out
            .chunks_exact_mut(out_channels)
            .take(self.frames)
            .enumerate()
        {
            for (ch, slot) in chunk.iter_mut().enumerate() {
                *slot = self.channels[ch.min(last)][frame];
            }
        }
    }
}

//! Decoded sound data

use std::path::Path;

use thiserror::Error;

/// Errors produced while loading sound data. These never cross the
/// engine facade; they are absorbed there and reported through tracing.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to decode wav: {0}")]
    Wav(#[from] hound::Error),

    #[error("unsupported channel count: {0}")]
    UnsupportedChannels(u16),
}

/// One decoded audio asset: interleaved f32 PCM in [-1.0, 1.0].
///
/// Buffers are shared between the preload cache and live channels via
/// `Arc`, so evicting a cached asset never cuts off instances that are
/// still playing from it.
#[derive(Debug, Clone)]
pub struct SoundBuffer {
    channels: u16,
    sample_rate: u32,
    samples: Vec<f32>,
}

impl SoundBuffer {
    /// Wrap already-decoded interleaved samples
    pub fn from_samples(
        channels: u16,
        sample_rate: u32,
        samples: Vec<f32>,
    ) -> Result<Self, AudioError> {
        if channels == 0 {
            return Err(AudioError::UnsupportedChannels(channels));
        }
        Ok(Self {
            channels,
            sample_rate,
            samples,
        })
    }

    /// Decode a WAV file (integer 8/16/24/32-bit or float 32-bit PCM)
    pub fn from_wav_file(path: &Path) -> Result<Self, AudioError> {
        let reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(AudioError::UnsupportedChannels(spec.channels));
        }

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => {
                reader.into_samples::<f32>().collect::<Result<_, _>>()?
            }
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()?
            }
        };

        Ok(Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            samples,
        })
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Fetch one frame as a stereo pair. Mono sources are duplicated to
    /// both sides; sources with more than two channels contribute their
    /// first two.
    pub fn frame(&self, idx: usize) -> (f32, f32) {
        let base = idx * self.channels as usize;
        if self.channels == 1 {
            let s = self.samples[base];
            (s, s)
        } else {
            (self.samples[base], self.samples[base + 1])
        }
    }
}

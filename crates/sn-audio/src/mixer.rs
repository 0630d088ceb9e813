//! Mixing state shared between the engine facade and the output backend
//!
//! One music channel plus a fixed-capacity pool of effect channels,
//! rendered into interleaved stereo f32. The whole state sits behind one
//! `parking_lot::Mutex`: facade calls mutate it, the backend's render
//! path pulls frames from it, and "all effects" operations are atomic
//! because they happen under a single lock acquisition.

use std::sync::Arc;

use crate::buffer::SoundBuffer;
use crate::handle::SoundHandle;

/// Per-channel playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Playback {
    Stopped,
    Playing,
    Paused,
}

/// Playback parameters for one effect instance
#[derive(Debug, Clone, Copy)]
pub struct EffectParams {
    /// Restart at end-of-stream indefinitely
    pub looped: bool,
    /// Playback-rate multiplier; also scales duration
    pub pitch: f32,
    /// Stereo balance in [-1.0, 1.0]; -1 routes left only
    pub pan: f32,
    /// Per-instance gain in [0.0, 1.0], multiplied with the master
    /// effects volume
    pub gain: f32,
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            looped: false,
            pitch: 1.0,
            pan: 0.0,
            gain: 1.0,
        }
    }
}

/// Equal-power pan law. -1.0 gives (1, 0), 0.0 gives -3dB each side,
/// +1.0 gives (0, 1).
pub(crate) fn pan_gains(pan: f32) -> (f32, f32) {
    let theta = (pan.clamp(-1.0, 1.0) + 1.0) * std::f32::consts::FRAC_PI_4;
    (theta.cos(), theta.sin())
}

/// One playback channel: a shared buffer plus a fractional playhead
pub(crate) struct Channel {
    pub buffer: Option<Arc<SoundBuffer>>,
    pub state: Playback,
    /// Playhead in source frames, fractional for resampling
    pub position: f64,
    pub looped: bool,
    pub pitch: f32,
    pub pan: f32,
    pub gain: f32,
}

impl Channel {
    fn idle() -> Self {
        Self {
            buffer: None,
            state: Playback::Stopped,
            position: 0.0,
            looped: false,
            pitch: 1.0,
            pan: 0.0,
            gain: 1.0,
        }
    }

    /// Produce the next stereo frame and advance the playhead by
    /// `pitch * source_rate / output_rate`, with linear interpolation
    /// between source frames. Looping channels wrap; one-shots
    /// transition to Stopped at end-of-stream.
    fn next_frame(&mut self, output_rate: u32) -> Option<(f32, f32)> {
        if self.state != Playback::Playing {
            return None;
        }
        let buf = self.buffer.as_ref()?;
        let frames = buf.frames();
        if frames == 0 {
            self.state = Playback::Stopped;
            return None;
        }

        if self.position >= frames as f64 {
            if self.looped {
                self.position %= frames as f64;
            } else {
                self.state = Playback::Stopped;
                self.position = 0.0;
                return None;
            }
        }

        let idx = self.position as usize;
        let frac = (self.position - idx as f64) as f32;
        let (l0, r0) = buf.frame(idx);
        let (l1, r1) = if idx + 1 < frames {
            buf.frame(idx + 1)
        } else if self.looped {
            buf.frame(0)
        } else {
            (l0, r0)
        };

        let ratio = self.pitch as f64 * buf.sample_rate() as f64 / output_rate as f64;
        self.position += ratio;

        Some((l0 + (l1 - l0) * frac, r0 + (r1 - r0) * frac))
    }
}

struct EffectSlot {
    channel: Channel,
    gen: u32,
    /// Monotonic start order; the oldest live slot is stolen when the
    /// pool is full
    seq: u64,
}

/// Shared mixer state
pub(crate) struct MixerState {
    pub output_rate: u32,
    max_effects: usize,
    music: Channel,
    effects: Vec<EffectSlot>,
    music_volume: f32,
    effects_volume: f32,
    next_seq: u64,
}

impl MixerState {
    pub fn new(output_rate: u32, max_effects: usize, music_volume: f32, effects_volume: f32) -> Self {
        Self {
            output_rate,
            max_effects: max_effects.max(1),
            music: Channel::idle(),
            effects: Vec::new(),
            music_volume: music_volume.clamp(0.0, 1.0),
            effects_volume: effects_volume.clamp(0.0, 1.0),
            next_seq: 0,
        }
    }

    // music

    pub fn play_music(&mut self, buffer: Arc<SoundBuffer>, looped: bool) {
        self.music = Channel {
            buffer: Some(buffer),
            state: Playback::Playing,
            position: 0.0,
            looped,
            pitch: 1.0,
            pan: 0.0,
            gain: 1.0,
        };
    }

    pub fn stop_music(&mut self) {
        self.music = Channel::idle();
    }

    pub fn pause_music(&mut self) {
        if self.music.state == Playback::Playing {
            self.music.state = Playback::Paused;
        }
    }

    pub fn resume_music(&mut self) {
        if self.music.state == Playback::Paused {
            self.music.state = Playback::Playing;
        }
    }

    pub fn rewind_music(&mut self) {
        if self.music.buffer.is_some() {
            self.music.position = 0.0;
            self.music.state = Playback::Playing;
        }
    }

    pub fn is_music_playing(&self) -> bool {
        self.music.state == Playback::Playing
    }

    pub fn music_volume(&self) -> f32 {
        self.music_volume
    }

    pub fn set_music_volume(&mut self, volume: f32) {
        self.music_volume = volume.clamp(0.0, 1.0);
    }

    // effects

    pub fn effects_volume(&self) -> f32 {
        self.effects_volume
    }

    pub fn set_effects_volume(&mut self, volume: f32) {
        self.effects_volume = volume.clamp(0.0, 1.0);
    }

    /// Start one effect instance, reusing a finished slot, growing the
    /// pool up to capacity, or stealing the oldest live slot when full.
    pub fn start_effect(&mut self, buffer: Arc<SoundBuffer>, params: EffectParams) -> SoundHandle {
        let pitch = if params.pitch.is_finite() && params.pitch > 0.0 {
            params.pitch
        } else {
            1.0
        };
        let channel = Channel {
            buffer: Some(buffer),
            state: Playback::Playing,
            position: 0.0,
            looped: params.looped,
            pitch,
            pan: params.pan.clamp(-1.0, 1.0),
            gain: params.gain.clamp(0.0, 1.0),
        };
        let seq = self.next_seq;
        self.next_seq += 1;

        if let Some(idx) = self
            .effects
            .iter()
            .position(|slot| slot.channel.state == Playback::Stopped)
        {
            let slot = &mut self.effects[idx];
            slot.channel = channel;
            slot.gen += 1;
            slot.seq = seq;
            return SoundHandle::new(idx as u32, slot.gen);
        }

        if self.effects.len() < self.max_effects {
            self.effects.push(EffectSlot {
                channel,
                gen: 1,
                seq,
            });
            return SoundHandle::new(self.effects.len() as u32 - 1, 1);
        }

        // Pool is full of live sounds: steal the oldest one.
        let idx = self
            .effects
            .iter()
            .enumerate()
            .min_by_key(|(_, slot)| slot.seq)
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        let slot = &mut self.effects[idx];
        slot.channel = channel;
        slot.gen += 1;
        slot.seq = seq;
        SoundHandle::new(idx as u32, slot.gen)
    }

    /// Resolve a handle to its channel, rejecting stale generations
    fn effect_channel(&mut self, handle: SoundHandle) -> Option<&mut Channel> {
        let slot = self.effects.get_mut(handle.idx as usize)?;
        if slot.gen == handle.gen {
            Some(&mut slot.channel)
        } else {
            None
        }
    }

    pub fn pause_effect(&mut self, handle: SoundHandle) {
        if let Some(channel) = self.effect_channel(handle) {
            if channel.state == Playback::Playing {
                channel.state = Playback::Paused;
            }
        }
    }

    pub fn resume_effect(&mut self, handle: SoundHandle) {
        if let Some(channel) = self.effect_channel(handle) {
            if channel.state == Playback::Paused {
                channel.state = Playback::Playing;
            }
        }
    }

    pub fn stop_effect(&mut self, handle: SoundHandle) {
        if let Some(channel) = self.effect_channel(handle) {
            *channel = Channel::idle();
        }
    }

    pub fn pause_all_effects(&mut self) {
        for slot in &mut self.effects {
            if slot.channel.state == Playback::Playing {
                slot.channel.state = Playback::Paused;
            }
        }
    }

    pub fn resume_all_effects(&mut self) {
        for slot in &mut self.effects {
            if slot.channel.state == Playback::Paused {
                slot.channel.state = Playback::Playing;
            }
        }
    }

    pub fn stop_all_effects(&mut self) {
        for slot in &mut self.effects {
            slot.channel = Channel::idle();
        }
    }

    pub fn is_effect_playing(&self, handle: SoundHandle) -> bool {
        self.effects
            .get(handle.idx as usize)
            .map(|slot| slot.gen == handle.gen && slot.channel.state == Playback::Playing)
            .unwrap_or(false)
    }

    /// Number of effect instances currently holding a sound (playing or
    /// paused)
    pub fn live_effects(&self) -> usize {
        self.effects
            .iter()
            .filter(|slot| slot.channel.buffer.is_some())
            .count()
    }

    /// Render interleaved stereo frames into `out`, filling the whole
    /// slice (silence where nothing plays). Called by the backend.
    pub fn render(&mut self, out: &mut [f32]) {
        let rate = self.output_rate;
        for frame in out.chunks_exact_mut(2) {
            let mut left = 0.0f32;
            let mut right = 0.0f32;

            // Music is mixed centered, no pan.
            if let Some((l, r)) = self.music.next_frame(rate) {
                left += l * self.music_volume;
                right += r * self.music_volume;
            }

            for slot in &mut self.effects {
                if let Some((l, r)) = slot.channel.next_frame(rate) {
                    let (lg, rg) = pan_gains(slot.channel.pan);
                    let gain = slot.channel.gain * self.effects_volume;
                    left += l * lg * gain;
                    right += r * rg * gain;
                }
                if slot.channel.state == Playback::Stopped {
                    // Release the buffer as soon as the one-shot ends.
                    slot.channel.buffer = None;
                }
            }

            frame[0] = left.clamp(-1.0, 1.0);
            frame[1] = right.clamp(-1.0, 1.0);
        }
    }
}

//! The audio engine facade
//!
//! One `AudioEngine` owns the backend, the preload cache, and exactly
//! one background-music stream plus a pool of effect instances. It is an
//! explicitly owned context object: hosts create it, pass it to call
//! sites, and drop (or `shutdown`) it to release the device.
//!
//! Every mutating operation tolerates missing assets and stale handles
//! without returning an error; failures are reported through `tracing`
//! only. State changes and the backend's render path synchronize on one
//! internal lock, so concurrent observers never see torn state and the
//! "all effects" operations are atomic.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use sn_core::config::AudioConfig;
use tracing::{debug, info, warn};

use crate::backend::{self, AudioBackend, NullBackend, Renderer};
use crate::cache::{asset_key, SoundCache};
use crate::handle::SoundHandle;
use crate::mixer::MixerState;

pub use crate::mixer::EffectParams;

/// Background-music and sound-effect playback over a pluggable backend
pub struct AudioEngine {
    mixer: Arc<Mutex<MixerState>>,
    cache: SoundCache,
    backend: Box<dyn AudioBackend>,
    /// Cache key of the currently loaded music track, for
    /// `stop_music(release_data = true)`
    music_key: Option<u32>,
    shut_down: bool,
}

impl AudioEngine {
    /// Build the engine with the backend named by `config`. Never
    /// fails: if the configured backend cannot start, the engine
    /// degrades to the null backend with a warning.
    pub fn new(config: &AudioConfig) -> Self {
        Self::with_backend(backend::create(config.backend), config)
    }

    /// Build the engine around an explicit backend (dependency
    /// injection seam for tests and custom outputs)
    pub fn with_backend(mut backend: Box<dyn AudioBackend>, config: &AudioConfig) -> Self {
        let mixer = Arc::new(Mutex::new(MixerState::new(
            backend.sample_rate(),
            config.max_concurrent_effects,
            config.music_volume,
            config.effects_volume,
        )));

        if let Err(err) = backend.start(make_renderer(&mixer)) {
            warn!("audio backend failed to start: {err}; falling back to silence");
            backend = Box::new(NullBackend::new());
            mixer.lock().output_rate = backend.sample_rate();
            // The null backend's start cannot fail.
            let _ = backend.start(make_renderer(&mixer));
        }

        info!(
            "audio engine ready ({} Hz, {} effect slots)",
            mixer.lock().output_rate,
            config.max_concurrent_effects
        );

        Self {
            mixer,
            cache: SoundCache::new(),
            backend,
            music_key: None,
            shut_down: false,
        }
    }

    // music

    /// Decode and cache a music asset without starting playback. Safe
    /// to call redundantly; failure is absorbed. May block on file I/O
    /// and decoding, so keep it off latency-sensitive paths.
    pub fn preload_music(&mut self, path: impl AsRef<Path>) {
        self.cache.preload(path.as_ref());
    }

    /// Stop any current track and start playing `path`. With
    /// `looped == true` the track restarts at end-of-stream
    /// indefinitely.
    pub fn play_music(&mut self, path: impl AsRef<Path>, looped: bool) {
        let path = path.as_ref();
        match self.cache.get_or_load(path) {
            Some(buffer) => {
                self.music_key = Some(asset_key(path));
                self.mixer.lock().play_music(buffer, looped);
            }
            None => {
                // Already logged by the cache. The previous track still
                // stops: play always replaces the music channel.
                self.music_key = None;
                self.mixer.lock().stop_music();
            }
        }
    }

    /// Stop the current track. With `release_data == true` the decoded
    /// buffer is also evicted from the cache, so the next play
    /// re-decodes from source.
    pub fn stop_music(&mut self, release_data: bool) {
        self.mixer.lock().stop_music();
        if release_data {
            if let Some(key) = self.music_key.take() {
                self.cache.evict_key(key);
            }
        }
    }

    /// Pause the current track in place. No-op when not playing.
    pub fn pause_music(&mut self) {
        self.mixer.lock().pause_music();
    }

    /// Resume from the paused position. No-op when not paused.
    pub fn resume_music(&mut self) {
        self.mixer.lock().resume_music();
    }

    /// Restart the current track from its beginning
    pub fn rewind_music(&mut self) {
        self.mixer.lock().rewind_music();
    }

    pub fn is_music_playing(&self) -> bool {
        self.mixer.lock().is_music_playing()
    }

    /// Capability probe for platforms without music playback. Always
    /// true here.
    pub fn can_play_music(&self) -> bool {
        true
    }

    /// Background-music volume in [0.0, 1.0]
    pub fn music_volume(&self) -> f32 {
        self.mixer.lock().music_volume()
    }

    /// Set the background-music volume; values outside [0.0, 1.0] are
    /// clamped
    pub fn set_music_volume(&mut self, volume: f32) {
        self.mixer.lock().set_music_volume(volume);
    }

    // effects

    /// Play one effect instance with default parameters (one-shot,
    /// pitch 1.0, centered, full gain). Returns `SoundHandle::INVALID`
    /// if the asset cannot be loaded.
    pub fn play_effect(&mut self, path: impl AsRef<Path>) -> SoundHandle {
        self.play_effect_with(path, EffectParams::default())
    }

    /// Play one effect instance with explicit loop/pitch/pan/gain
    pub fn play_effect_with(&mut self, path: impl AsRef<Path>, params: EffectParams) -> SoundHandle {
        match self.cache.get_or_load(path.as_ref()) {
            Some(buffer) => self.mixer.lock().start_effect(buffer, params),
            None => SoundHandle::INVALID,
        }
    }

    /// Pause one live instance. Unknown or stale handles are no-ops.
    pub fn pause_effect(&mut self, handle: SoundHandle) {
        self.mixer.lock().pause_effect(handle);
    }

    /// Resume one paused instance. Unknown or stale handles are no-ops.
    pub fn resume_effect(&mut self, handle: SoundHandle) {
        self.mixer.lock().resume_effect(handle);
    }

    /// Stop one live instance and free its slot. Unknown or stale
    /// handles are no-ops.
    pub fn stop_effect(&mut self, handle: SoundHandle) {
        self.mixer.lock().stop_effect(handle);
    }

    /// Pause every live instance atomically
    pub fn pause_all_effects(&mut self) {
        self.mixer.lock().pause_all_effects();
    }

    /// Resume every paused instance atomically
    pub fn resume_all_effects(&mut self) {
        self.mixer.lock().resume_all_effects();
    }

    /// Stop every live instance atomically
    pub fn stop_all_effects(&mut self) {
        self.mixer.lock().stop_all_effects();
    }

    /// Whether the instance behind `handle` is currently playing
    pub fn is_effect_playing(&self, handle: SoundHandle) -> bool {
        self.mixer.lock().is_effect_playing(handle)
    }

    /// Number of effect instances currently holding a sound
    pub fn live_effects(&self) -> usize {
        self.mixer.lock().live_effects()
    }

    /// Decode and cache an effect asset ahead of first playback. May
    /// block on file I/O and decoding.
    pub fn preload_effect(&mut self, path: impl AsRef<Path>) {
        self.cache.preload(path.as_ref());
    }

    /// Drop the cached buffer for `path`. Instances still playing from
    /// it keep going; the buffer is shared and stays alive until they
    /// finish.
    pub fn unload_effect(&mut self, path: impl AsRef<Path>) {
        self.cache.evict(path.as_ref());
    }

    /// Master effects volume in [0.0, 1.0], multiplied with each
    /// instance's own gain
    pub fn effects_volume(&self) -> f32 {
        self.mixer.lock().effects_volume()
    }

    /// Set the master effects volume; values outside [0.0, 1.0] are
    /// clamped
    pub fn set_effects_volume(&mut self, volume: f32) {
        self.mixer.lock().set_effects_volume(volume);
    }

    // lifecycle

    /// Manually advance playback by `frames` stereo frames on backends
    /// without an output thread (the null backend), collecting the
    /// rendered block into `out`. Device-driven backends leave `out`
    /// empty; playback progresses on their own thread.
    pub fn pump(&mut self, frames: usize, out: &mut Vec<f32>) {
        self.backend.pump(frames, out);
    }

    /// Stop everything and release backend resources. Also runs on
    /// drop; calling it explicitly gives deterministic teardown.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        debug!("audio engine shutting down");
        {
            let mut mixer = self.mixer.lock();
            mixer.stop_music();
            mixer.stop_all_effects();
        }
        self.backend.stop();
        self.cache.clear();
        self.music_key = None;
        self.shut_down = true;
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn make_renderer(mixer: &Arc<Mutex<MixerState>>) -> Renderer {
    let mixer = Arc::clone(mixer);
    Box::new(move |out: &mut [f32]| mixer.lock().render(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sn_core::config::BackendKind;

    fn null_config() -> AudioConfig {
        AudioConfig {
            backend: BackendKind::Null,
            ..Default::default()
        }
    }

    #[test]
    fn missing_assets_are_silently_absorbed() {
        let mut engine = AudioEngine::new(&null_config());
        engine.preload_music("missing.wav");
        engine.play_music("missing.wav", true);
        assert!(!engine.is_music_playing());

        let handle = engine.play_effect("missing.wav");
        assert_eq!(handle, SoundHandle::INVALID);
        engine.stop_effect(handle);
        engine.unload_effect("missing.wav");
    }

    #[test]
    fn can_play_music_reports_true() {
        let engine = AudioEngine::new(&null_config());
        assert!(engine.can_play_music());
    }

    #[test]
    fn volume_roundtrip_and_clamp() {
        let mut engine = AudioEngine::new(&null_config());
        engine.set_music_volume(0.4);
        assert_eq!(engine.music_volume(), 0.4);
        engine.set_effects_volume(2.0);
        assert_eq!(engine.effects_volume(), 1.0);
    }

    #[test]
    fn shutdown_is_idempotent() {
        let mut engine = AudioEngine::new(&null_config());
        engine.shutdown();
        engine.shutdown();
        assert!(!engine.is_music_playing());
    }
}

//! End-to-end facade tests over the null backend
//!
//! The null backend lets tests pump frames manually, which makes
//! end-of-stream handling and channel metering deterministic.

use std::path::{Path, PathBuf};

use sn_audio::{AudioEngine, EffectParams, SoundHandle};
use sn_core::config::{AudioConfig, BackendKind};

fn engine_with(max_effects: usize) -> AudioEngine {
    AudioEngine::new(&AudioConfig {
        backend: BackendKind::Null,
        max_concurrent_effects: max_effects,
        music_volume: 1.0,
        effects_volume: 1.0,
    })
}

/// Write a mono 16-bit WAV of constant amplitude at the engine's output
/// rate, so one source frame maps to one output frame.
fn write_wav(dir: &Path, name: &str, frames: usize) -> PathBuf {
    let path = dir.join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for _ in 0..frames {
        writer.write_sample(16_384i16).unwrap();
    }
    writer.finalize().unwrap();
    path
}

fn pump(engine: &mut AudioEngine, frames: usize) -> Vec<f32> {
    let mut out = Vec::new();
    engine.pump(frames, &mut out);
    out
}

#[test]
fn looping_music_survives_end_of_stream() {
    let dir = tempfile::tempdir().unwrap();
    let track = write_wav(dir.path(), "music.wav", 100);

    let mut engine = engine_with(8);
    engine.play_music(&track, true);

    // Pump several buffer lengths past the end; the loop keeps it
    // playing without intervention.
    for _ in 0..5 {
        let out = pump(&mut engine, 150);
        assert!(out.iter().any(|&s| s != 0.0));
        assert!(engine.is_music_playing());
    }
}

#[test]
fn one_shot_music_ends() {
    let dir = tempfile::tempdir().unwrap();
    let track = write_wav(dir.path(), "music.wav", 100);

    let mut engine = engine_with(8);
    engine.play_music(&track, false);
    assert!(engine.is_music_playing());

    pump(&mut engine, 200);
    assert!(!engine.is_music_playing());
}

#[test]
fn stop_without_release_replays_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let track = write_wav(dir.path(), "music.wav", 100);

    let mut engine = engine_with(8);
    engine.play_music(&track, true);

    // Remove the source file: replay must come from the cache.
    std::fs::remove_file(&track).unwrap();

    engine.stop_music(false);
    assert!(!engine.is_music_playing());
    engine.play_music(&track, true);
    assert!(engine.is_music_playing());
}

#[test]
fn stop_with_release_forces_redecode() {
    let dir = tempfile::tempdir().unwrap();
    let track = write_wav(dir.path(), "music.wav", 100);

    let mut engine = engine_with(8);
    engine.play_music(&track, true);

    engine.stop_music(true);
    // Source still on disk: replay succeeds by re-decoding.
    engine.play_music(&track, true);
    assert!(engine.is_music_playing());

    // With the source gone and the cache released, replay fails
    // silently.
    engine.stop_music(true);
    std::fs::remove_file(&track).unwrap();
    engine.play_music(&track, true);
    assert!(!engine.is_music_playing());
}

#[test]
fn pause_resume_rewind_music() {
    let dir = tempfile::tempdir().unwrap();
    let track = write_wav(dir.path(), "music.wav", 1000);

    let mut engine = engine_with(8);
    engine.play_music(&track, false);
    pump(&mut engine, 100);

    engine.pause_music();
    assert!(!engine.is_music_playing());
    let out = pump(&mut engine, 50);
    assert!(out.iter().all(|&s| s == 0.0));

    engine.resume_music();
    assert!(engine.is_music_playing());

    engine.rewind_music();
    assert!(engine.is_music_playing());
    // A full track length from position 0 still has sound at the end.
    let out = pump(&mut engine, 1000);
    assert!(out[out.len() - 2] != 0.0);
}

#[test]
fn concurrent_effects_get_distinct_handles() {
    let dir = tempfile::tempdir().unwrap();
    let coin = write_wav(dir.path(), "coin.wav", 5000);

    let mut engine = engine_with(8);
    let h1 = engine.play_effect(&coin);
    let h2 = engine.play_effect(&coin);
    assert!(h1.is_valid());
    assert!(h2.is_valid());
    assert_ne!(h1, h2);

    engine.stop_effect(h1);
    assert!(!engine.is_effect_playing(h1));
    assert!(engine.is_effect_playing(h2));

    // Stale and never-issued handles are no-ops.
    engine.stop_effect(h1);
    engine.stop_effect(SoundHandle::INVALID);
    assert!(engine.is_effect_playing(h2));
}

#[test]
fn pause_all_then_resume_all_restores_playing_set() {
    let dir = tempfile::tempdir().unwrap();
    let coin = write_wav(dir.path(), "coin.wav", 5000);

    let mut engine = engine_with(8);
    let a = engine.play_effect(&coin);
    let b = engine.play_effect(&coin);
    let stopped = engine.play_effect(&coin);
    engine.stop_effect(stopped);

    engine.pause_all_effects();
    assert!(!engine.is_effect_playing(a));
    assert!(!engine.is_effect_playing(b));

    engine.resume_all_effects();
    assert!(engine.is_effect_playing(a));
    assert!(engine.is_effect_playing(b));
    assert!(!engine.is_effect_playing(stopped));
}

#[test]
fn hard_pan_routes_a_single_channel() {
    let dir = tempfile::tempdir().unwrap();
    let coin = write_wav(dir.path(), "coin.wav", 5000);

    let mut engine = engine_with(8);
    engine.play_effect_with(
        &coin,
        EffectParams {
            pan: -1.0,
            ..Default::default()
        },
    );
    let out = pump(&mut engine, 64);
    for frame in out.chunks_exact(2) {
        assert!(frame[0] > 0.0, "left channel should carry the signal");
        assert!(frame[1].abs() < 1e-6, "right channel should be silent");
    }

    engine.stop_all_effects();
    engine.play_effect_with(
        &coin,
        EffectParams {
            pan: 1.0,
            ..Default::default()
        },
    );
    let out = pump(&mut engine, 64);
    for frame in out.chunks_exact(2) {
        assert!(frame[0].abs() < 1e-6, "left channel should be silent");
        assert!(frame[1] > 0.0, "right channel should carry the signal");
    }
}

#[test]
fn effect_pool_respects_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let coin = write_wav(dir.path(), "coin.wav", 5000);

    let mut engine = engine_with(3);
    for _ in 0..10 {
        assert!(engine.play_effect(&coin).is_valid());
    }
    assert!(engine.live_effects() <= 3);
}

#[test]
fn unload_effect_keeps_live_instances_playing() {
    let dir = tempfile::tempdir().unwrap();
    let coin = write_wav(dir.path(), "coin.wav", 5000);

    let mut engine = engine_with(8);
    engine.preload_effect(&coin);
    let handle = engine.play_effect(&coin);
    engine.unload_effect(&coin);

    assert!(engine.is_effect_playing(handle));
    let out = pump(&mut engine, 32);
    assert!(out.iter().any(|&s| s != 0.0));
}

#[test]
fn stop_all_effects_silences_everything() {
    let dir = tempfile::tempdir().unwrap();
    let coin = write_wav(dir.path(), "coin.wav", 5000);

    let mut engine = engine_with(8);
    let a = engine.play_effect(&coin);
    let b = engine.play_effect(&coin);
    engine.stop_all_effects();
    assert!(!engine.is_effect_playing(a));
    assert!(!engine.is_effect_playing(b));
    assert_eq!(engine.live_effects(), 0);

    let out = pump(&mut engine, 32);
    assert!(out.iter().all(|&s| s == 0.0));
}

#[test]
fn volumes_scale_the_mix() {
    let dir = tempfile::tempdir().unwrap();
    let coin = write_wav(dir.path(), "coin.wav", 5000);

    let mut engine = engine_with(8);
    engine.set_effects_volume(0.5);
    engine.play_effect_with(
        &coin,
        EffectParams {
            pan: -1.0,
            gain: 0.5,
            ..Default::default()
        },
    );

    // Source amplitude is 0.5; 0.5 gain * 0.5 master leaves 0.125 on
    // the left channel.
    let out = pump(&mut engine, 4);
    assert!((out[0] - 0.125).abs() < 1e-3);
}

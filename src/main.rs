//! Sonance demo player
//!
//! Plays a music track (looped) plus optional one-shot effects through
//! the configured backend, then shuts the engine down.

use std::time::Duration;

use sn_audio::AudioEngine;
use sn_core::config::Config;

fn main() {
    let config = Config::load().unwrap_or_default();
    sn_core::logging::init(&config);

    let mut args = std::env::args().skip(1);
    let Some(track) = args.next() else {
        eprintln!("usage: sonance <music.wav> [effect.wav ...]");
        std::process::exit(2);
    };

    tracing::info!("starting sonance demo player");
    let mut engine = AudioEngine::new(&config.audio);

    engine.play_music(&track, true);
    if !engine.is_music_playing() {
        tracing::warn!("could not play {track}");
    }

    for effect in args {
        let handle = engine.play_effect(&effect);
        if !handle.is_valid() {
            tracing::warn!("could not play effect {effect}");
        }
    }

    // Let the backend's output thread run for a while.
    std::thread::sleep(Duration::from_secs(10));

    engine.shutdown();
}

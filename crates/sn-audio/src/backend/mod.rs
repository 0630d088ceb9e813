//! Output backends
//!
//! A backend pulls interleaved stereo f32 frames from the engine's
//! renderer and delivers them to an output device (or nowhere, for the
//! null backend). Backends are selected at startup from config; there is
//! no inheritance hierarchy, just this one trait.

use anyhow::Result;
use sn_core::config::BackendKind;

pub mod cpal_backend;
pub mod null;

pub use cpal_backend::CpalBackend;
pub use null::NullBackend;

/// Render callback handed to the backend at start. Fills the whole
/// slice with interleaved stereo frames (silence where nothing plays).
pub type Renderer = Box<dyn FnMut(&mut [f32]) + Send + 'static>;

/// Output backend interface
pub trait AudioBackend: Send {
    /// Begin pulling frames from `renderer`
    fn start(&mut self, renderer: Renderer) -> Result<()>;

    /// Stop playback and release device resources
    fn stop(&mut self);

    /// Output sample rate the renderer should target
    fn sample_rate(&self) -> u32;

    /// Manually render `frames` stereo frames into `out`. Only backends
    /// without their own output thread (the null backend) implement
    /// this; device-driven backends leave `out` empty.
    fn pump(&mut self, _frames: usize, out: &mut Vec<f32>) {
        out.clear();
    }
}

/// Build the backend named by config
pub fn create(kind: BackendKind) -> Box<dyn AudioBackend> {
    match kind {
        BackendKind::Cpal => Box::new(CpalBackend::new()),
        BackendKind::Null => Box::new(NullBackend::new()),
    }
}

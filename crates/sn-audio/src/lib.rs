//! Audio engine for sonance
//!
//! Offers a very simple interface to play background music and sound
//! effects. One `AudioEngine` drives exactly one background-music stream
//! plus a pool of concurrent effect instances, mixed into interleaved
//! stereo f32 and pulled by a pluggable output backend. Hosts own the
//! engine as a plain value; there is no global instance.

pub mod backend;
pub mod buffer;
mod cache;
pub mod engine;
pub mod handle;
mod mixer;

pub use backend::{AudioBackend, CpalBackend, NullBackend, Renderer};
pub use buffer::{AudioError, SoundBuffer};
pub use engine::{AudioEngine, EffectParams};
pub use handle::SoundHandle;

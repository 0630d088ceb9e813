//! Null output backend (no sound)

use anyhow::Result;

use super::{AudioBackend, Renderer};

/// Backend that produces no sound. Headless hosts and tests drive
/// playback by pumping frames manually, which makes end-of-stream and
/// channel-metering behavior deterministic.
#[derive(Default)]
pub struct NullBackend {
    renderer: Option<Renderer>,
    started: bool,
}

impl NullBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioBackend for NullBackend {
    fn start(&mut self, renderer: Renderer) -> Result<()> {
        self.renderer = Some(renderer);
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.renderer = None;
        self.started = false;
    }

    fn sample_rate(&self) -> u32 {
        44_100
    }

    fn pump(&mut self, frames: usize, out: &mut Vec<f32>) {
        out.clear();
        if let Some(renderer) = self.renderer.as_mut() {
            out.resize(frames * 2, 0.0);
            renderer(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pump_before_start_yields_nothing() {
        let mut backend = NullBackend::new();
        let mut out = vec![1.0f32; 8];
        backend.pump(4, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn pump_pulls_from_renderer() {
        let mut backend = NullBackend::new();
        backend
            .start(Box::new(|out: &mut [f32]| out.fill(0.25)))
            .unwrap();

        let mut out = Vec::new();
        backend.pump(4, &mut out);
        assert_eq!(out, vec![0.25; 8]);

        backend.stop();
        backend.pump(4, &mut out);
        assert!(out.is_empty());
    }
}

//! cpal output backend

use std::sync::mpsc;
use std::thread::JoinHandle;

use anyhow::{anyhow, bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use tracing::{debug, error, warn};

use super::{AudioBackend, Renderer};

/// Rate reported when no output device exists
const FALLBACK_SAMPLE_RATE: u32 = 44_100;

/// Stream parameters probed from the default device at construction
#[derive(Clone)]
struct StreamSpec {
    config: cpal::StreamConfig,
    sample_format: cpal::SampleFormat,
}

/// Real output through the default cpal device.
///
/// `cpal::Stream` is not `Send`, so the stream lives on a dedicated
/// thread for its whole life; `stop` signals that thread and joins it.
/// Construction never fails: a missing device is only reported once
/// `start` is called, letting the engine degrade to the null backend.
pub struct CpalBackend {
    spec: Option<StreamSpec>,
    sample_rate: u32,
    stop_tx: Option<mpsc::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl CpalBackend {
    pub fn new() -> Self {
        let device = cpal::default_host().default_output_device();
        let spec = device
            .as_ref()
            .and_then(|d| d.default_output_config().ok())
            .map(|supported| StreamSpec {
                sample_format: supported.sample_format(),
                config: supported.config(),
            });
        if spec.is_none() {
            warn!("no default audio output device found");
        }

        let sample_rate = spec
            .as_ref()
            .map(|s| s.config.sample_rate.0)
            .unwrap_or(FALLBACK_SAMPLE_RATE);

        Self {
            spec,
            sample_rate,
            stop_tx: None,
            join: None,
        }
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for CpalBackend {
    fn start(&mut self, renderer: Renderer) -> Result<()> {
        let Some(spec) = self.spec.clone() else {
            bail!("no audio output device available");
        };

        let (ready_tx, ready_rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let join = std::thread::Builder::new()
            .name("sonance-audio".into())
            .spawn(move || {
                let stream = match open_stream(&spec, renderer) {
                    Ok(stream) => {
                        let _ = ready_tx.send(Ok(()));
                        stream
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                // Park until shutdown; the stream must stay alive (and
                // on this thread) for playback to continue.
                let _ = stop_rx.recv();
                drop(stream);
            })
            .context("failed to spawn audio thread")?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                debug!("audio stream started at {} Hz", self.sample_rate);
                self.stop_tx = Some(stop_tx);
                self.join = Some(join);
                Ok(())
            }
            Ok(Err(err)) => {
                let _ = join.join();
                Err(err)
            }
            Err(_) => {
                let _ = join.join();
                Err(anyhow!("audio thread exited before reporting status"))
            }
        }
    }

    fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Drop for CpalBackend {
    fn drop(&mut self) {
        self.stop();
    }
}

fn open_stream(spec: &StreamSpec, renderer: Renderer) -> Result<cpal::Stream> {
    let device = cpal::default_host()
        .default_output_device()
        .ok_or_else(|| anyhow!("no audio output device available"))?;

    let stream = match spec.sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &spec.config, renderer)?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &spec.config, renderer)?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &spec.config, renderer)?,
        other => bail!("unsupported output sample format: {:?}", other),
    };

    stream.play().context("failed to start audio stream")?;
    Ok(stream)
}

/// Build an output stream whose data callback pulls stereo f32 frames
/// from the renderer and maps them onto the device's channel layout.
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut renderer: Renderer,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels.max(1) as usize;
    let mut scratch: Vec<f32> = Vec::new();

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let frames = data.len() / channels;
            scratch.resize(frames * 2, 0.0);
            renderer(&mut scratch);

            for (i, frame) in data.chunks_mut(channels).enumerate() {
                let left = scratch[i * 2];
                let right = scratch[i * 2 + 1];
                if channels == 1 {
                    frame[0] = T::from_sample((left + right) * 0.5);
                } else {
                    frame[0] = T::from_sample(left);
                    frame[1] = T::from_sample(right);
                    for sample in &mut frame[2..] {
                        *sample = T::from_sample(0.0);
                    }
                }
            }
        },
        |err| error!("audio stream error: {}", err),
        None,
    )?;

    Ok(stream)
}

//! Tone playback through cpal.
//!
//! cpal streams are not `Send`, so a dedicated thread owns the device and
//! plays one tone per message. The notifier itself only holds the sender.

use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{debug, error, info, warn};

use super::{Notifier, ToneSpec};
use crate::data::{AlertKind, CrewAlert};

/// Plays the synthesized alert tone on the default output device.
#[derive(Debug)]
pub struct ToneNotifier {
    sender: mpsc::Sender<AlertKind>,
}

impl ToneNotifier {
    /// Open the default output device on a playback thread.
    pub fn new() -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<AlertKind>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();

        thread::Builder::new()
            .name("crewwatch-audio".to_string())
            .spawn(move || {
                let output = match open_output() {
                    Ok(output) => {
                        let _ = ready_tx.send(Ok(()));
                        output
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                while let Ok(kind) = receiver.recv() {
                    if let Err(e) = play(&output, kind) {
                        warn!(error = %e, "failed to play alert tone");
                    }
                }
                debug!("audio thread stopped");
            })
            .context("Failed to spawn audio thread")?;

        ready_rx
            .recv()
            .map_err(|_| anyhow!("Audio thread exited during setup"))??;

        Ok(Self { sender })
    }
}

impl Notifier for ToneNotifier {
    fn notify(&mut self, alert: &CrewAlert) {
        if self.sender.send(alert.kind).is_err() {
            warn!("audio thread is gone, alert tone dropped");
        }
    }
}

struct Output {
    device: cpal::Device,
    config: cpal::StreamConfig,
}

fn open_output() -> Result<Output> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("No audio output device available"))?;

    info!(device_name = ?device.name().unwrap_or_else(|_| "Unknown".to_string()), "Selected audio device");

    let config = device
        .default_output_config()
        .context("Failed to get default output config")?;

    if config.sample_format() != cpal::SampleFormat::F32 {
        return Err(anyhow!("Unsupported sample format: {:?}", config.sample_format()));
    }

    Ok(Output {
        device,
        config: config.into(),
    })
}

fn play(output: &Output, kind: AlertKind) -> Result<()> {
    let tone = ToneSpec::for_kind(kind);
    let channels = output.config.channels as usize;
    let samples: VecDeque<f32> = tone.synthesize(output.config.sample_rate.0).into();
    let buffer = Arc::new(Mutex::new(samples));
    let callback_buffer = Arc::clone(&buffer);

    let stream = output.device.build_output_stream(
        &output.config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            if let Ok(mut buffer) = callback_buffer.try_lock() {
                for frame in data.chunks_mut(channels) {
                    let sample = buffer.pop_front().unwrap_or(0.0);
                    frame.iter_mut().for_each(|s| *s = sample);
                }
            } else {
                data.iter_mut().for_each(|s| *s = 0.0);
            }
        },
        |err| error!("Audio stream error: {}", err),
        None,
    )?;

    stream.play().context("Failed to start cpal stream")?;
    debug!(kind = kind.label(), "playing alert tone");

    // Let the buffer drain before the stream is dropped
    thread::sleep(Duration::from_secs_f64(tone.duration_secs + 0.05));
    Ok(())
}

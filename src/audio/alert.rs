//! Alert tone using cpal
//!
//! A short three-step beep synthesized on the fly and played on the default
//! output device. Failures are logged and never reach the timer.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use std::f32::consts::TAU;
use std::thread;
use std::time::Duration;

/// Tone length in seconds.
pub const ALERT_DURATION: f32 = 0.3;

const START_GAIN: f32 = 0.3;
const END_GAIN: f32 = 0.01;
const HIGH_HZ: f32 = 800.0;
const LOW_HZ: f32 = 600.0;

/// Plays the end-of-timer tone on a background thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlertPlayer;

impl AlertPlayer {
    pub fn new() -> Self {
        Self
    }

    /// Start playback and return immediately.
    pub fn play(&self) {
        thread::spawn(|| {
            let result = std::panic::catch_unwind(run_alert);
            match result {
                Ok(Ok(())) => tracing::debug!("Alert tone played"),
                Ok(Err(e)) => tracing::warn!("Could not play alert tone: {}", e),
                Err(_) => tracing::warn!("Alert tone playback panicked"),
            }
        });
    }
}

/// Oscillator frequency at `t` seconds: high, low, high in 0.1 s steps.
pub fn frequency_at(t: f32) -> f32 {
    if (0.1..0.2).contains(&t) {
        LOW_HZ
    } else {
        HIGH_HZ
    }
}

/// Exponential decay from 0.3 to 0.01 over the tone.
pub fn gain_at(t: f32) -> f32 {
    let progress = (t / ALERT_DURATION).clamp(0.0, 1.0);
    START_GAIN * (END_GAIN / START_GAIN).powf(progress)
}

/// Mono samples of the whole tone at `sample_rate`.
pub fn synthesize(sample_rate: u32) -> Vec<f32> {
    let rate = sample_rate as f32;
    let total = (ALERT_DURATION * rate).round() as usize;
    let mut phase = 0.0f32;

    (0..total)
        .map(|i| {
            let t = i as f32 / rate;
            let sample = (phase * TAU).sin() * gain_at(t);
            phase = (phase + frequency_at(t) / rate).fract();
            sample
        })
        .collect()
}

fn run_alert() -> Result<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("No output device available"))?;

    let supported_config = device.default_output_config()?;
    let sample_format = supported_config.sample_format();
    let config = supported_config.config();
    let samples = synthesize(config.sample_rate.0);

    tracing::debug!(
        "Alert on {}: {}Hz, {} channels, {:?}",
        device.name().unwrap_or_default(),
        config.sample_rate.0,
        config.channels,
        sample_format
    );

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, samples)?,
        SampleFormat::I16 => build_stream::<i16>(&device, &config, samples)?,
        SampleFormat::U16 => build_stream::<u16>(&device, &config, samples)?,
        format => {
            return Err(anyhow!("Unsupported format: {:?}", format));
        }
    };

    stream.play()?;
    thread::sleep(Duration::from_secs_f32(ALERT_DURATION) + Duration::from_millis(100));
    Ok(())
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    samples: Vec<f32>,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut position = 0usize;

    let err_fn = |err| {
        tracing::warn!("Alert stream error: {}", err);
    };

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                let value = T::from_sample(samples.get(position).copied().unwrap_or(0.0));
                position += 1;
                for slot in frame.iter_mut() {
                    *slot = value;
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

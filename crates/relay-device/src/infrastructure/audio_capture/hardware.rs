//! Hardware microphone via CPAL.
//!
//! The platform stream handle is not `Send` on every backend, so each capture
//! runs on its own thread that builds the stream, plays it, and holds it
//! until told to stop.  The CPAL callback downmixes to mono, converts to the
//! configured sample rate and appends PCM16 samples to a shared buffer that
//! [`CaptureStream::take_samples`] drains.

use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use relay_core::{f32_to_pcm16, CaptureConfig};
use tracing::{debug, info, warn};

use crate::application::ports::{AudioError, CaptureStream, MicrophoneSource};

type SampleBuffer = Arc<Mutex<Vec<i16>>>;

/// Opens the default (or a named) input device.
#[derive(Debug, Clone, Default)]
pub struct CpalMicrophone {
    preferred_device: Option<String>,
}

impl CpalMicrophone {
    pub fn new(preferred_device: Option<String>) -> Self {
        Self { preferred_device }
    }

    /// True when the default host reports at least one input device.
    pub fn is_available() -> bool {
        cpal::default_host().default_input_device().is_some()
    }
}

impl MicrophoneSource for CpalMicrophone {
    fn open(&mut self, config: &CaptureConfig) -> Result<Box<dyn CaptureStream>, AudioError> {
        let buffer: SampleBuffer = Arc::new(Mutex::new(Vec::new()));
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), AudioError>>();

        let preferred = self.preferred_device.clone();
        let target = *config;
        let thread_buffer = Arc::clone(&buffer);

        let thread = std::thread::Builder::new()
            .name("relay-microphone".to_string())
            .spawn(move || {
                let stream = match build_stream(preferred.as_deref(), &target, thread_buffer) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                // Blocks until `stop` sends or the handle is dropped.
                let _ = stop_rx.recv();
                if let Err(e) = stream.pause() {
                    debug!("failed to pause audio stream: {e}");
                }
                drop(stream);
            })
            .map_err(|e| AudioError::Unavailable(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Box::new(CpalStream {
                buffer,
                stop_tx: Some(stop_tx),
                thread: Some(thread),
            })),
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(AudioError::Unavailable(
                    "capture thread exited before starting".to_string(),
                ))
            }
        }
    }
}

fn build_stream(
    preferred: Option<&str>,
    target: &CaptureConfig,
    buffer: SampleBuffer,
) -> Result<cpal::Stream, AudioError> {
    let host = cpal::default_host();
    let device = match preferred {
        Some(name) => host
            .input_devices()
            .map_err(|e| AudioError::Unavailable(e.to_string()))?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| AudioError::Unavailable(format!("input device '{name}' not found")))?,
        None => host
            .default_input_device()
            .ok_or_else(|| AudioError::Unavailable("no default input device".to_string()))?,
    };

    let default_config = device
        .default_input_config()
        .map_err(|e| AudioError::Unavailable(e.to_string()))?;
    let format = default_config.sample_format();
    let stream_config: StreamConfig = default_config.into();
    let device_rate = stream_config.sample_rate.0;
    let channels = usize::from(stream_config.channels.max(1));

    info!(
        "microphone '{}': {format:?} {device_rate} Hz x{channels} -> {} Hz mono",
        device.name().unwrap_or_else(|_| "unknown".to_string()),
        target.sample_rate
    );
    if target.echo_cancellation || target.noise_suppression {
        debug!("echo cancellation / noise suppression are left to the OS audio stack");
    }

    let err_fn = |err: cpal::StreamError| warn!("audio stream error: {err}");

    let stream = match format {
        SampleFormat::F32 => {
            let mut sink = CallbackSink::new(buffer, channels, device_rate, target.sample_rate);
            device.build_input_stream(
                &stream_config,
                move |data: &[f32], _| sink.push(data, |s| s),
                err_fn,
                None,
            )
        }
        SampleFormat::I16 => {
            let mut sink = CallbackSink::new(buffer, channels, device_rate, target.sample_rate);
            device.build_input_stream(
                &stream_config,
                move |data: &[i16], _| sink.push(data, |s| f32::from(s) / 32_768.0),
                err_fn,
                None,
            )
        }
        SampleFormat::U16 => {
            let mut sink = CallbackSink::new(buffer, channels, device_rate, target.sample_rate);
            device.build_input_stream(
                &stream_config,
                move |data: &[u16], _| sink.push(data, |s| (f32::from(s) - 32_768.0) / 32_768.0),
                err_fn,
                None,
            )
        }
        other => {
            return Err(AudioError::UnsupportedFormat(format!("{other:?}")));
        }
    }
    .map_err(|e| AudioError::Unavailable(e.to_string()))?;

    stream
        .play()
        .map_err(|e| AudioError::Unavailable(e.to_string()))?;
    Ok(stream)
}

// ── Callback-side conversion ──────────────────────────────────────────────────

/// Per-stream state living inside the CPAL callback.
struct CallbackSink {
    buffer: SampleBuffer,
    channels: usize,
    converter: RateConverter,
    scratch: Vec<i16>,
}

impl CallbackSink {
    fn new(buffer: SampleBuffer, channels: usize, device_rate: u32, target_rate: u32) -> Self {
        Self {
            buffer,
            channels,
            converter: RateConverter::new(device_rate, target_rate),
            scratch: Vec::new(),
        }
    }

    fn push<T: Copy>(&mut self, data: &[T], to_f32: impl Fn(T) -> f32) {
        self.scratch.clear();
        for frame in data.chunks(self.channels) {
            let sum: f32 = frame.iter().map(|&s| to_f32(s)).sum();
            let mono = sum / frame.len() as f32;
            self.converter.push(mono, &mut self.scratch);
        }
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(&self.scratch);
    }
}

/// Nearest-sample rate conversion.  Adequate for speech at 16 kHz.
#[derive(Debug)]
struct RateConverter {
    /// Input samples per output sample.
    step: f64,
    next: f64,
    index: u64,
}

impl RateConverter {
    fn new(input_rate: u32, output_rate: u32) -> Self {
        Self {
            step: f64::from(input_rate.max(1)) / f64::from(output_rate.max(1)),
            next: 0.0,
            index: 0,
        }
    }

    fn push(&mut self, sample: f32, out: &mut Vec<i16>) {
        while self.index as f64 >= self.next {
            out.push(f32_to_pcm16(sample));
            self.next += self.step;
        }
        self.index += 1;
    }
}

// ── Stream handle ─────────────────────────────────────────────────────────────

struct CpalStream {
    buffer: SampleBuffer,
    stop_tx: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl CaptureStream for CpalStream {
    fn take_samples(&mut self) -> Vec<i16> {
        if self.stop_tx.is_none() {
            return Vec::new();
        }
        std::mem::take(&mut *self.buffer.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("microphone thread panicked");
            }
            info!("microphone released");
        }
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_converter_decimates_48k_to_16k() {
        let mut conv = RateConverter::new(48_000, 16_000);
        let mut out = Vec::new();
        for i in 0..48 {
            conv.push(if i % 3 == 0 { 0.5 } else { 0.0 }, &mut out);
        }
        assert_eq!(out.len(), 16);
        assert!(out.iter().all(|&s| s == f32_to_pcm16(0.5)));
    }

    #[test]
    fn test_rate_converter_passthrough_at_equal_rates() {
        let mut conv = RateConverter::new(16_000, 16_000);
        let mut out = Vec::new();
        for _ in 0..10 {
            conv.push(0.0, &mut out);
        }
        assert_eq!(out.len(), 10);
    }

    #[test]
    fn test_sink_downmixes_stereo() {
        let buffer: SampleBuffer = Arc::new(Mutex::new(Vec::new()));
        let mut sink = CallbackSink::new(Arc::clone(&buffer), 2, 16_000, 16_000);

        sink.push(&[1.0_f32, 0.0, -0.5, -0.5], |s| s);

        let captured = buffer.lock().unwrap().clone();
        assert_eq!(captured, vec![f32_to_pcm16(0.5), f32_to_pcm16(-0.5)]);
    }
}

//! Live microphone capture using CPAL.

use crate::capture::source::CaptureSource;
use crate::defaults;
use crate::error::{MeetscribeError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

/// Suppress noisy JACK/ALSA messages that occur during audio backend probing.
/// These are harmless but confusing to users.
///
/// # Safety
/// Modifies environment variables; safe when called before spawning threads.
pub fn suppress_audio_warnings() {
    // SAFETY: Called at startup before any threads are spawned
    unsafe {
        std::env::set_var("JACK_NO_START_SERVER", "1");
        std::env::set_var("ALSA_DEBUG", "0");
        std::env::set_var("PW_LOG", "0");
    }
}

/// List all available audio input device names.
///
/// # Errors
/// Returns `MeetscribeError::CaptureFailed` if device enumeration fails.
pub fn list_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| MeetscribeError::CaptureFailed {
            message: format!("Failed to enumerate input devices: {}", e),
        })?;

    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: The stream is only touched while holding the Mutex in
/// MicrophoneSource, so access never crosses threads concurrently.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Live microphone capture source.
///
/// Captures 16-bit PCM at 16kHz mono. The CPAL callback appends into a
/// shared buffer; `read_samples` drains it. The source exclusively holds the
/// device between `start()` and `stop()`.
pub struct MicrophoneSource {
    device: cpal::Device,
    stream: Mutex<Option<SendableStream>>,
    buffer: Arc<Mutex<Vec<i16>>>,
    sample_rate: u32,
}

impl MicrophoneSource {
    /// Create a microphone source.
    ///
    /// # Arguments
    /// * `device_name` - Optional device name; `None` uses the default input.
    ///
    /// # Errors
    /// `DeviceUnavailable` when the named (or any default) input device does
    /// not exist.
    pub fn new(device_name: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();

        let device = match device_name {
            Some(name) => {
                let mut devices =
                    host.input_devices()
                        .map_err(|e| MeetscribeError::CaptureFailed {
                            message: format!("Failed to enumerate devices: {}", e),
                        })?;
                devices
                    .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                    .ok_or_else(|| MeetscribeError::DeviceUnavailable {
                        device: name.to_string(),
                    })?
            }
            None => {
                host.default_input_device()
                    .ok_or_else(|| MeetscribeError::DeviceUnavailable {
                        device: "default".to_string(),
                    })?
            }
        };

        Ok(Self {
            device,
            stream: Mutex::new(None),
            buffer: Arc::new(Mutex::new(Vec::new())),
            sample_rate: defaults::SAMPLE_RATE,
        })
    }

    /// Build the input stream at 16kHz mono, trying i16 first, then f32 with
    /// conversion. PipeWire/PulseAudio convert from the device's native
    /// format transparently.
    fn build_stream(&self) -> Result<cpal::Stream> {
        let config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_callback = |err| {
            eprintln!("meetscribe: audio stream error: {}", err);
        };

        let buffer = Arc::clone(&self.buffer);
        if let Ok(stream) = self.device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend_from_slice(data);
                }
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        let buffer = Arc::clone(&self.buffer);
        self.device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend(
                            data.iter()
                                .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16),
                        );
                    }
                },
                err_callback,
                None,
            )
            .map_err(|e| Self::classify_stream_error(e))
    }

    /// Map a stream build failure onto the capture error taxonomy.
    fn classify_stream_error(error: cpal::BuildStreamError) -> MeetscribeError {
        match error {
            cpal::BuildStreamError::DeviceNotAvailable => MeetscribeError::DeviceUnavailable {
                device: "input".to_string(),
            },
            other => {
                let message = other.to_string();
                if message.to_lowercase().contains("permission")
                    || message.to_lowercase().contains("denied")
                {
                    MeetscribeError::PermissionDenied { message }
                } else {
                    MeetscribeError::CaptureFailed {
                        message: format!("Failed to build input stream: {}", message),
                    }
                }
            }
        }
    }

    fn lock_stream(&self) -> Result<std::sync::MutexGuard<'_, Option<SendableStream>>> {
        self.stream.lock().map_err(|e| MeetscribeError::CaptureFailed {
            message: format!("Failed to lock stream: {}", e),
        })
    }
}

impl CaptureSource for MicrophoneSource {
    fn start(&mut self) -> Result<()> {
        {
            let guard = self.lock_stream()?;
            if guard.is_some() {
                return Ok(()); // Already started
            }
        }

        let stream = self.build_stream()?;
        stream.play().map_err(|e| MeetscribeError::CaptureFailed {
            message: format!("Failed to start audio stream: {}", e),
        })?;

        *self.lock_stream()? = Some(SendableStream(stream));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut guard = self.lock_stream()?;
        if let Some(stream) = guard.take() {
            stream
                .0
                .pause()
                .map_err(|e| MeetscribeError::CaptureFailed {
                    message: format!("Failed to stop audio stream: {}", e),
                })?;
        }
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        let mut buffer = self
            .buffer
            .lock()
            .map_err(|e| MeetscribeError::CaptureFailed {
                message: format!("Failed to lock audio buffer: {}", e),
            })?;

        Ok(std::mem::take(&mut *buffer))
    }

    fn is_finite(&self) -> bool {
        false
    }
}

//! Audio capture: source trait, fragment slicing, and concrete sources.

#[cfg(feature = "cpal-audio")]
pub mod microphone;
pub mod slicer;
pub mod source;
pub mod wav;

#[cfg(feature = "cpal-audio")]
pub use microphone::{MicrophoneSource, list_devices, suppress_audio_warnings};
pub use slicer::FragmentSlicer;
pub use source::{CaptureSource, MockCaptureSource, ReadPhase};
pub use wav::WavCaptureSource;

//! WAV file capture source for offline transcription.

use crate::capture::source::CaptureSource;
use crate::defaults::SAMPLE_RATE;
use crate::error::{MeetscribeError, Result};
use std::io::Read;
use std::path::Path;

/// Capture source that replays WAV file data.
///
/// Accepts arbitrary sample rates and channel counts, converting to 16kHz
/// mono up front. Each read delivers one fragment cadence worth of samples;
/// an empty read signals exhaustion, which ends the session.
pub struct WavCaptureSource {
    samples: Vec<i16>,
    position: usize,
    read_size: usize,
}

impl WavCaptureSource {
    /// Create from any reader.
    pub fn from_reader(reader: Box<dyn Read + Send>) -> Result<Self> {
        let mut wav_reader =
            hound::WavReader::new(reader).map_err(|e| MeetscribeError::CaptureFailed {
                message: format!("Failed to parse WAV data: {}", e),
            })?;

        let spec = wav_reader.spec();
        let raw_samples: Vec<i16> = wav_reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| MeetscribeError::CaptureFailed {
                message: format!("Failed to read WAV samples: {}", e),
            })?;

        let mono = mix_to_mono(&raw_samples, spec.channels as usize);
        let samples = resample(&mono, spec.sample_rate, SAMPLE_RATE);

        Ok(Self {
            samples,
            position: 0,
            // One fragment cadence of audio per read.
            read_size: SAMPLE_RATE as usize,
        })
    }

    /// Create from a WAV file on disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_reader(Box::new(std::io::Cursor::new(data)))
    }

    /// Total audio duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / SAMPLE_RATE as f64
    }
}

impl CaptureSource for WavCaptureSource {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.position >= self.samples.len() {
            return Ok(Vec::new());
        }

        let end = std::cmp::min(self.position + self.read_size, self.samples.len());
        let block = self.samples[self.position..end].to_vec();
        self.position = end;

        Ok(block)
    }

    fn is_finite(&self) -> bool {
        true
    }
}

/// Mix interleaved multi-channel audio down to mono by averaging.
pub fn mix_to_mono(samples: &[i16], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Simple linear interpolation resampling.
pub fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[samples.len() - 1]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn make_wav_data(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_16khz_mono_passes_through() {
        let input = vec![100i16, 200, 300, 400, 500];
        let wav_data = make_wav_data(16000, 1, &input);

        let source = WavCaptureSource::from_reader(Box::new(Cursor::new(wav_data))).unwrap();
        assert_eq!(source.samples, input);
    }

    #[test]
    fn test_stereo_downmixes_to_mono() {
        let stereo = vec![100i16, 200, 300, 400, 500, 600];
        let wav_data = make_wav_data(16000, 2, &stereo);

        let source = WavCaptureSource::from_reader(Box::new(Cursor::new(wav_data))).unwrap();
        assert_eq!(source.samples, vec![150i16, 350, 550]);
    }

    #[test]
    fn test_48khz_resamples_to_16khz() {
        let input = vec![0i16; 48000];
        let wav_data = make_wav_data(48000, 1, &input);

        let source = WavCaptureSource::from_reader(Box::new(Cursor::new(wav_data))).unwrap();
        assert!(source.samples.len() >= 15900 && source.samples.len() <= 16100);
    }

    #[test]
    fn test_reads_deliver_one_second_blocks_then_empty() {
        let input = vec![1i16; 40000]; // 2.5 seconds at 16kHz
        let wav_data = make_wav_data(16000, 1, &input);
        let mut source = WavCaptureSource::from_reader(Box::new(Cursor::new(wav_data))).unwrap();

        assert_eq!(source.read_samples().unwrap().len(), 16000);
        assert_eq!(source.read_samples().unwrap().len(), 16000);
        assert_eq!(source.read_samples().unwrap().len(), 8000);
        assert!(source.read_samples().unwrap().is_empty());
    }

    #[test]
    fn test_source_is_finite() {
        let wav_data = make_wav_data(16000, 1, &[0i16; 100]);
        let source = WavCaptureSource::from_reader(Box::new(Cursor::new(wav_data))).unwrap();
        assert!(source.is_finite());
    }

    #[test]
    fn test_duration_secs() {
        let wav_data = make_wav_data(16000, 1, &vec![0i16; 24000]);
        let source = WavCaptureSource::from_reader(Box::new(Cursor::new(wav_data))).unwrap();
        assert!((source.duration_secs() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_garbage_data_is_a_capture_error() {
        let result = WavCaptureSource::from_reader(Box::new(Cursor::new(vec![1u8, 2, 3])));
        assert!(matches!(
            result,
            Err(MeetscribeError::CaptureFailed { .. })
        ));
    }

    #[test]
    fn test_resample_preserves_levels() {
        let input = vec![1000i16; 44100];
        let output = resample(&input, 44100, 16000);
        assert!(output.len() >= 15900 && output.len() <= 16100);
        assert!(output.iter().all(|&s| (900..=1100).contains(&s)));
    }

    #[test]
    fn test_mix_to_mono_single_channel_is_identity() {
        let input = vec![5i16, 10, 15];
        assert_eq!(mix_to_mono(&input, 1), input);
    }
}

//! Audio file loading

use crate::error::{PipelineError, Result};
use crate::DEFAULT_SAMPLE_RATE;
use std::path::Path;
use tracing::{debug, warn};

/// Size in bytes of a canonical WAV header, skipped by the raw-PCM fallback
const WAV_HEADER_BYTES: usize = 44;

/// A decoded mono clip with samples in [-1, 1]
#[derive(Debug, Clone)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Wrap raw samples at the given rate
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Decoded samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the clip holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Decodes clip files into [`Waveform`]s
///
/// The primary path demuxes WAV containers. When that fails the decoder
/// falls back to reading the file as raw little-endian 16-bit PCM past a
/// fixed 44-byte header, which recovers clips with nonstandard or truncated
/// chunk tables.
pub struct WaveformDecoder;

impl WaveformDecoder {
    /// Decode a clip, trying the WAV demuxer first and raw PCM second
    pub fn decode<P: AsRef<Path>>(path: P) -> Result<Waveform> {
        let path = path.as_ref();

        match Self::decode_wav(path) {
            Ok(waveform) if !waveform.is_empty() => {
                debug!(samples = waveform.len(), sample_rate = waveform.sample_rate(), "decoded via WAV demuxer");
                return Ok(waveform);
            }
            Ok(_) => warn!("WAV demuxer yielded no samples, trying raw PCM"),
            Err(e) => warn!("WAV demuxer failed ({e}), trying raw PCM"),
        }

        let waveform = Self::decode_raw_pcm(path)?;
        if waveform.is_empty() {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                reason: "no audio samples found by demuxer or raw-PCM fallback".into(),
            });
        }
        debug!(samples = waveform.len(), "decoded via raw-PCM fallback");
        Ok(waveform)
    }

    fn decode_wav(path: &Path) -> Result<Waveform> {
        let reader = hound::WavReader::open(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let spec = reader.spec();
        let sample_rate = spec.sample_rate;

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .filter_map(std::result::Result::ok)
                .collect(),
            hound::SampleFormat::Int => {
                let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .filter_map(std::result::Result::ok)
                    .map(|s| s as f32 / max_value)
                    .collect()
            }
        };

        // Downmix to mono by averaging interleaved channels
        let mono = if spec.channels > 1 {
            samples
                .chunks(spec.channels as usize)
                .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32)
                .collect()
        } else {
            samples
        };

        Ok(Waveform::new(mono, sample_rate))
    }

    fn decode_raw_pcm(path: &Path) -> Result<Waveform> {
        let bytes = std::fs::read(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let payload = bytes.get(WAV_HEADER_BYTES..).unwrap_or(&[]);
        let samples: Vec<f32> = payload
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
            .collect();

        Ok(Waveform::new(samples, DEFAULT_SAMPLE_RATE))
    }
}

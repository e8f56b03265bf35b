//! MFCC pipeline: framing, averaging, and normalization

use crate::audio::Waveform;
use crate::config::NormalizationParams;
use crate::error::{PipelineError, Result};
use crate::features::{dct_ii, MelFilterbank, SpectralFrame};
use tracing::debug;

/// Analysis configuration for the MFCC pipeline
#[derive(Debug, Clone)]
pub struct MfccConfig {
    /// Sample rate assumed for the clip, in Hz
    pub sample_rate: u32,
    /// Frame length in samples (power of two)
    pub frame_size: usize,
    /// Hop between frames in samples
    pub hop_size: usize,
    /// Length of the output feature vector
    pub n_coefficients: usize,
    /// Number of mel filters
    pub n_filters: usize,
    /// Lower filterbank edge in Hz
    pub low_hz: f32,
    /// Upper filterbank edge in Hz
    pub high_hz: f32,
}

impl Default for MfccConfig {
    fn default() -> Self {
        Self {
            sample_rate: crate::DEFAULT_SAMPLE_RATE,
            frame_size: crate::FRAME_SIZE,
            hop_size: crate::HOP_SIZE,
            n_coefficients: crate::N_COEFFICIENTS,
            n_filters: crate::N_FILTERS,
            low_hz: crate::LOW_FREQ_HZ,
            high_hz: crate::HIGH_FREQ_HZ,
        }
    }
}

/// Extracts the averaged, normalized MFCC feature vector from a clip
///
/// Construct one instance per configuration; the filterbank and FFT scratch
/// are built once and reused across all frames. Instances are not meant to
/// be shared across threads - concurrent inferences each get their own.
pub struct MfccPipeline {
    config: MfccConfig,
    spectral: SpectralFrame,
    filterbank: MelFilterbank,
}

impl MfccPipeline {
    /// Create a pipeline with the default clinical configuration
    pub fn new() -> Result<Self> {
        Self::with_config(MfccConfig::default())
    }

    /// Create a pipeline with an explicit configuration
    pub fn with_config(config: MfccConfig) -> Result<Self> {
        let spectral = SpectralFrame::new(config.frame_size)?;
        let filterbank = MelFilterbank::new(
            config.sample_rate,
            config.frame_size,
            config.n_filters,
            config.low_hz,
            config.high_hz,
        );
        Ok(Self {
            config,
            spectral,
            filterbank,
        })
    }

    /// Analysis configuration
    pub fn config(&self) -> &MfccConfig {
        &self.config
    }

    /// Cepstral coefficients for a single frame
    ///
    /// Window -> FFT power spectrum -> mel energies -> log -> DCT-II,
    /// truncated to the first `n_coefficients` values (or fewer if the
    /// filter count is smaller).
    fn process_frame(&mut self, frame: &[f32]) -> Result<Vec<f32>> {
        let power = self.spectral.power_spectrum(frame)?;
        let energies = self.filterbank.apply(&power);
        let log_mel: Vec<f32> = energies.iter().map(|&e| (e + 1e-10).ln()).collect();
        let mut cepstra = dct_ii(&log_mel);
        cepstra.truncate(self.config.n_coefficients);
        Ok(cepstra)
    }

    /// Mean cepstral vector across all frames of the clip, unnormalized
    ///
    /// Slides a `frame_size` window at `hop_size` and averages the per-frame
    /// cepstra element-wise into an `n_coefficients`-slot accumulator. Slots
    /// beyond the filter count stay zero.
    pub fn mean_features(&mut self, waveform: &Waveform) -> Result<Vec<f32>> {
        let samples = waveform.samples();
        let mut accumulator = vec![0.0f32; self.config.n_coefficients];
        let mut frame_count = 0usize;

        let mut start = 0;
        while start + self.config.frame_size <= samples.len() {
            let cepstra = self.process_frame(&samples[start..start + self.config.frame_size])?;
            for (slot, value) in accumulator.iter_mut().zip(cepstra.iter()) {
                *slot += value;
            }
            frame_count += 1;
            start += self.config.hop_size;
        }

        if frame_count == 0 {
            return Err(PipelineError::InsufficientAudio {
                samples: samples.len(),
                needed: self.config.frame_size,
            });
        }

        for slot in accumulator.iter_mut() {
            *slot /= frame_count as f32;
        }
        debug!(frames = frame_count, "averaged MFCC features");
        Ok(accumulator)
    }

    /// Mean cepstral vector, z-scored with the supplied parameters
    pub fn normalized_features(
        &mut self,
        waveform: &Waveform,
        params: &NormalizationParams,
    ) -> Result<Vec<f32>> {
        let mut features = self.mean_features(waveform)?;
        params.apply(&mut features)?;
        Ok(features)
    }

    /// Number of frames the pipeline would process for `n_samples`
    pub fn frame_count(&self, n_samples: usize) -> usize {
        if n_samples < self.config.frame_size {
            0
        } else {
            (n_samples - self.config.frame_size) / self.config.hop_size + 1
        }
    }
}

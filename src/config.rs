//! Normalization parameter loading
//!
//! The stethoscope model was trained on z-scored features; the training-set
//! mean and standard deviation arrive in a JSON document with two arrays,
//! `X_mean` and `input_std`. Loaded once at startup, shared read-only
//! (typically behind an `Arc`) for the life of the process.

use crate::error::{PipelineError, Result};
use crate::N_COEFFICIENTS;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Per-index mean/std used to z-score the averaged MFCC vector
#[derive(Debug, Clone, Deserialize)]
pub struct NormalizationParams {
    /// Training-set feature means
    #[serde(rename = "X_mean")]
    mean: Vec<f32>,
    /// Training-set feature standard deviations
    #[serde(rename = "input_std")]
    std: Vec<f32>,
}

impl NormalizationParams {
    /// Build from explicit arrays, validating lengths
    pub fn new(mean: Vec<f32>, std: Vec<f32>) -> Result<Self> {
        let params = Self { mean, std };
        params.validate()?;
        Ok(params)
    }

    /// Load from a JSON file containing `X_mean` and `input_std` arrays
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            PipelineError::InvalidConfig {
                reason: format!("cannot read {:?}: {e}", path.as_ref()),
            }
        })?;
        Self::from_json(&text)
    }

    /// Parse from a JSON string
    pub fn from_json(text: &str) -> Result<Self> {
        let params: Self =
            serde_json::from_str(text).map_err(|e| PipelineError::InvalidConfig {
                reason: format!("malformed normalization params: {e}"),
            })?;
        params.validate()?;
        debug!(
            mean_len = params.mean.len(),
            std_len = params.std.len(),
            "normalization params loaded"
        );
        Ok(params)
    }

    fn validate(&self) -> Result<()> {
        if self.mean.len() < N_COEFFICIENTS || self.std.len() < N_COEFFICIENTS {
            return Err(PipelineError::InvalidConfig {
                reason: format!(
                    "X_mean/input_std must each have at least {} entries, got {}/{}",
                    N_COEFFICIENTS,
                    self.mean.len(),
                    self.std.len()
                ),
            });
        }
        Ok(())
    }

    /// Apply `(x - mean[i]) / std[i]` in place
    ///
    /// The arrays are validated at load time to cover at least
    /// [`N_COEFFICIENTS`] entries, so any feature vector of that length or
    /// shorter is normalizable.
    pub fn apply(&self, features: &mut [f32]) -> Result<()> {
        if features.len() > self.mean.len() || features.len() > self.std.len() {
            return Err(PipelineError::FeatureLengthMismatch {
                expected: self.mean.len().min(self.std.len()),
                actual: features.len(),
            });
        }
        for (i, value) in features.iter_mut().enumerate() {
            *value = (*value - self.mean[i]) / self.std[i];
        }
        Ok(())
    }

    /// Training-set means
    pub fn mean(&self) -> &[f32] {
        &self.mean
    }

    /// Training-set standard deviations
    pub fn std(&self) -> &[f32] {
        &self.std
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_with_len(n: usize) -> String {
        let arr: Vec<String> = (0..n).map(|i| format!("{}.0", i + 1)).collect();
        format!(
            r#"{{"X_mean": [{0}], "input_std": [{0}]}}"#,
            arr.join(", ")
        )
    }

    #[test]
    fn test_parse_valid_json() {
        let params = NormalizationParams::from_json(&json_with_len(40)).unwrap();
        assert_eq!(params.mean().len(), 40);
        assert_eq!(params.std().len(), 40);
        assert!((params.mean()[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reject_short_arrays() {
        let err = NormalizationParams::from_json(&json_with_len(10)).unwrap_err();
        assert_eq!(err.kind(), "InvalidConfigError");
    }

    #[test]
    fn test_reject_malformed_json() {
        let err = NormalizationParams::from_json("{not json").unwrap_err();
        assert_eq!(err.kind(), "InvalidConfigError");
    }

    #[test]
    fn test_apply_round_trips() {
        let mean = vec![2.0; 40];
        let std = vec![4.0; 40];
        let params = NormalizationParams::new(mean, std).unwrap();

        let original: Vec<f32> = (0..40).map(|i| i as f32 * 0.5 - 3.0).collect();
        let mut features = original.clone();
        params.apply(&mut features).unwrap();

        // Rescale and compare against the originals
        for (normalized, orig) in features.iter().zip(original.iter()) {
            let recovered = normalized * 4.0 + 2.0;
            assert!((recovered - orig).abs() < 1e-5);
        }
    }

    #[test]
    fn test_apply_rejects_oversized_vector() {
        let params = NormalizationParams::new(vec![0.0; 40], vec![1.0; 40]).unwrap();
        let mut features = vec![0.0; 41];
        let err = params.apply(&mut features).unwrap_err();
        assert_eq!(err.kind(), "FeatureLengthMismatchError");
    }
}

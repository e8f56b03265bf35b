//! Error taxonomy for the preprocessing and decision pipelines
//!
//! Every failure surfaces as a typed [`PipelineError`] carrying a stable
//! kind plus a human-readable message. No stage substitutes default values
//! on failure; the one degraded path (unrecognized classifier output shape)
//! is taken explicitly by the caller, never silently here.

use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failure modes of the preprocessing and decision pipelines
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Audio or image input could not be read or decoded
    #[error("failed to decode {path:?}: {reason}")]
    Decode {
        /// Path of the input that failed to decode
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Clip shorter than a single analysis frame
    #[error("audio too short: {samples} samples, need at least {needed} for one frame")]
    InsufficientAudio {
        /// Samples actually decoded
        samples: usize,
        /// Minimum samples required
        needed: usize,
    },

    /// Normalization parameters were not loaded before inference
    #[error("normalization parameters not loaded")]
    NormalizationNotLoaded,

    /// Feature vector length disagrees with the model's declared input length
    #[error("feature length mismatch: produced {actual}, model expects {expected}")]
    FeatureLengthMismatch {
        /// Length the model declares
        expected: usize,
        /// Length the pipeline produced
        actual: usize,
    },

    /// Model input or output shape could not be interpreted
    #[error("unrecognized tensor shape {shape:?}: {reason}")]
    ShapeInference {
        /// The raw dims as declared by the model
        shape: Vec<usize>,
        /// Why the shape was rejected
        reason: String,
    },

    /// Configuration file could not be parsed or failed validation
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Parse or validation failure detail
        reason: String,
    },

    /// The external model executor reported a failure
    #[error("inference backend error: {reason}")]
    Inference {
        /// Backend-reported detail
        reason: String,
    },
}

impl PipelineError {
    /// Stable kind discriminant, suitable for host-side error routing
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Decode { .. } => "DecodeError",
            PipelineError::InsufficientAudio { .. } => "InsufficientAudioError",
            PipelineError::NormalizationNotLoaded => "NormalizationNotLoadedError",
            PipelineError::FeatureLengthMismatch { .. } => "FeatureLengthMismatchError",
            PipelineError::ShapeInference { .. } => "ShapeInferenceError",
            PipelineError::InvalidConfig { .. } => "InvalidConfigError",
            PipelineError::Inference { .. } => "InferenceError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_stable() {
        let err = PipelineError::NormalizationNotLoaded;
        assert_eq!(err.kind(), "NormalizationNotLoadedError");

        let err = PipelineError::FeatureLengthMismatch {
            expected: 40,
            actual: 20,
        };
        assert_eq!(err.kind(), "FeatureLengthMismatchError");
        assert!(err.to_string().contains("40"));
    }

    #[test]
    fn test_message_carries_detail() {
        let err = PipelineError::Decode {
            path: PathBuf::from("clip.wav"),
            reason: "no audio track".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("clip.wav"));
        assert!(msg.contains("no audio track"));
    }
}

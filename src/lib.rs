//! # PneumoScan
//!
//! Preprocessing and decision pipelines for on-device respiratory screening.
//!
//! The crate covers the two preprocessing paths feeding a pair of pre-trained
//! classifiers, plus the logic that turns raw model outputs into labeled
//! predictions:
//!
//! - Stethoscope audio: waveform decode, framing, Hamming window + radix-2
//!   FFT, mel filterbank, DCT-II cepstra, frame averaging, and per-index
//!   normalization into a 40-element feature vector
//! - Chest image: decode, bilinear resize, and layout-aware (NHWC/NCHW)
//!   packing into an ImageNet-normalized float tensor
//! - Decision layer: stable softmax / sigmoid over raw classifier outputs
//!   with logit-vs-probability disambiguation for single-output models
//!
//! Model execution itself is an external collaborator, abstracted behind the
//! [`inference::ModelBackend`] trait.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pneumoscan::{NormalizationParams, StethoscopeClassifier};
//!
//! let params = NormalizationParams::load("normalization_params.json")?;
//! let classifier = StethoscopeClassifier::new(backend)?
//!     .with_normalization(params.into());
//! let decision = classifier.classify("clip.wav")?;
//! println!("{}: {:?}", decision.label, decision.confidence);
//! ```

#![warn(missing_docs)]
#![allow(rustdoc::missing_crate_level_docs)]

pub mod audio;
pub mod config;
pub mod decision;
pub mod error;
pub mod features;
pub mod inference;
pub mod vision;

// Re-exports for convenience
pub use config::NormalizationParams;
pub use decision::Decision;
pub use error::{PipelineError, Result};
pub use inference::{ModelBackend, StethoscopeClassifier, XrayClassifier};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sample rate assumed for stethoscope clips (22050 Hz)
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

/// Analysis frame length in samples (power of two)
pub const FRAME_SIZE: usize = 512;

/// Hop between consecutive frames in samples (50% overlap)
pub const HOP_SIZE: usize = 256;

/// Length of the feature vector fed to the stethoscope model
pub const N_COEFFICIENTS: usize = 40;

/// Number of triangular mel filters
pub const N_FILTERS: usize = 20;

/// Lower edge of the mel filterbank in Hz
pub const LOW_FREQ_HZ: f32 = 300.0;

/// Upper edge of the mel filterbank in Hz
pub const HIGH_FREQ_HZ: f32 = 8000.0;

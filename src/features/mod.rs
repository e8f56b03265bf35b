//! MFCC feature extraction
//!
//! - Per-frame Hamming window and in-place radix-2 FFT (power spectrum)
//! - Triangular mel filterbank, built once per pipeline configuration
//! - DCT-II cepstral transform
//! - Frame averaging and z-score normalization into the model feature vector

mod dct;
mod fft;
mod melbank;
mod mfcc;

pub use dct::dct_ii;
pub use fft::SpectralFrame;
pub use melbank::MelFilterbank;
pub use mfcc::{MfccConfig, MfccPipeline};

//! Audio decoding
//!
//! - WAV demuxing via `hound` (16/24/32-bit int and float, mono downmix)
//! - Raw-PCM fallback for clips the demuxer rejects (44-byte header skip)

mod loader;

pub use loader::{Waveform, WaveformDecoder};

//! Windowing and power spectrum via an in-place radix-2 FFT

use crate::error::{PipelineError, Result};
use std::f32::consts::PI;

/// Per-frame spectral analyzer: Hamming window, radix-2 FFT, power spectrum
///
/// Owns its complex-interleaved scratch buffer, so each pipeline instance
/// can run without sharing mutable state across invocations.
pub struct SpectralFrame {
    frame_size: usize,
    window: Vec<f32>,
    // Interleaved [re, im] pairs, length 2 * frame_size
    scratch: Vec<f32>,
}

impl SpectralFrame {
    /// Create an analyzer for frames of `frame_size` samples
    ///
    /// `frame_size` must be a power of two (the radix-2 FFT requires it).
    pub fn new(frame_size: usize) -> Result<Self> {
        if frame_size < 2 || !frame_size.is_power_of_two() {
            return Err(PipelineError::ShapeInference {
                shape: vec![frame_size],
                reason: "frame size must be a power of two >= 2".into(),
            });
        }

        let window = (0..frame_size)
            .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f32 / (frame_size - 1) as f32).cos())
            .collect();

        Ok(Self {
            frame_size,
            window,
            scratch: vec![0.0; frame_size * 2],
        })
    }

    /// Frame length in samples
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Number of power-spectrum bins produced per frame
    pub fn bins(&self) -> usize {
        self.frame_size / 2
    }

    /// Window, transform, and reduce one frame to its power spectrum
    ///
    /// Returns `frame_size / 2` bins, `re[i]^2 + im[i]^2` each.
    pub fn power_spectrum(&mut self, frame: &[f32]) -> Result<Vec<f32>> {
        if frame.len() != self.frame_size {
            return Err(PipelineError::ShapeInference {
                shape: vec![frame.len()],
                reason: format!("expected frame of {} samples", self.frame_size),
            });
        }

        for (i, &sample) in frame.iter().enumerate() {
            self.scratch[i * 2] = sample * self.window[i];
            self.scratch[i * 2 + 1] = 0.0;
        }

        fft_in_place(&mut self.scratch, self.frame_size);

        Ok((0..self.bins())
            .map(|i| {
                let re = self.scratch[i * 2];
                let im = self.scratch[i * 2 + 1];
                re * re + im * im
            })
            .collect())
    }
}

/// Iterative radix-2 Cooley-Tukey FFT over `n` interleaved complex values
///
/// Bit-reversal permutation followed by log2(n) butterfly stages. `data`
/// holds [re, im] pairs and is transformed in place.
fn fft_in_place(data: &mut [f32], n: usize) {
    debug_assert!(n.is_power_of_two());
    debug_assert!(data.len() >= n * 2);

    // Bit-reversal permutation
    let mut j = 0usize;
    for i in 0..n.saturating_sub(1) {
        if i < j {
            data.swap(i * 2, j * 2);
            data.swap(i * 2 + 1, j * 2 + 1);
        }
        let mut k = n / 2;
        while k <= j && k > 0 {
            j -= k;
            k /= 2;
        }
        j += k;
    }

    // Butterfly stages with length doubling from 2 to n
    let mut length = 2;
    while length <= n {
        let angle = -2.0 * std::f64::consts::PI / length as f64;
        for start in (0..n).step_by(length) {
            for k in 0..length / 2 {
                let w_re = (angle * k as f64).cos() as f32;
                let w_im = (angle * k as f64).sin() as f32;
                let even = (start + k) * 2;
                let odd = (start + k + length / 2) * 2;

                let t_re = w_re * data[odd] - w_im * data[odd + 1];
                let t_im = w_re * data[odd + 1] + w_im * data[odd];

                data[odd] = data[even] - t_re;
                data[odd + 1] = data[even + 1] - t_im;
                data[even] += t_re;
                data[even + 1] += t_im;
            }
        }
        length *= 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_zero_frame_yields_zero_spectrum() {
        for size in [8usize, 64, 512] {
            let mut analyzer = SpectralFrame::new(size).unwrap();
            let spectrum = analyzer.power_spectrum(&vec![0.0; size]).unwrap();
            assert_eq!(spectrum.len(), size / 2);
            assert!(spectrum.iter().all(|&p| p == 0.0));
        }
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        assert!(SpectralFrame::new(500).is_err());
        assert!(SpectralFrame::new(0).is_err());
        assert!(SpectralFrame::new(1).is_err());
        assert!(SpectralFrame::new(512).is_ok());
    }

    #[test]
    fn test_rejects_wrong_frame_length() {
        let mut analyzer = SpectralFrame::new(64).unwrap();
        assert!(analyzer.power_spectrum(&[0.0; 32]).is_err());
    }

    #[test]
    fn test_dc_signal_concentrates_in_bin_zero() {
        let n = 128;
        let mut analyzer = SpectralFrame::new(n).unwrap();
        let spectrum = analyzer.power_spectrum(&vec![1.0; n]).unwrap();

        // The Hamming window keeps most energy at DC; sidelobes are far down
        let dc = spectrum[0];
        assert!(dc > 0.0);
        for &p in &spectrum[4..] {
            assert!(p < dc * 1e-2, "bin energy {p} vs dc {dc}");
        }
    }

    #[test]
    fn test_sine_peaks_at_expected_bin() {
        let n = 512;
        let bin = 32; // exact bin frequency, no spectral leakage to speak of
        let mut analyzer = SpectralFrame::new(n).unwrap();
        let frame: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * bin as f32 * i as f32 / n as f32).sin())
            .collect();

        let spectrum = analyzer.power_spectrum(&frame).unwrap();
        let peak = spectrum
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, bin);
    }

    #[test]
    fn test_impulse_has_flat_spectrum() {
        // FFT of a delta at index 0 is flat; the window leaves index 0
        // scaled by its first coefficient only
        let n = 64;
        let mut frame = vec![0.0; n];
        frame[0] = 1.0;
        let mut analyzer = SpectralFrame::new(n).unwrap();
        let spectrum = analyzer.power_spectrum(&frame).unwrap();

        let expected = spectrum[0];
        assert!(expected > 0.0);
        for &p in &spectrum {
            assert!((p - expected).abs() < expected * 1e-4);
        }
    }
}

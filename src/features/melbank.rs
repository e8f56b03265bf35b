//! Triangular mel filterbank

/// Immutable `n_filters x fft_bins` weight matrix mapping a power spectrum
/// to mel-scale band energies
///
/// Built once per pipeline configuration and reused read-only across every
/// frame of a clip.
pub struct MelFilterbank {
    weights: Vec<Vec<f32>>,
    fft_bins: usize,
}

impl MelFilterbank {
    /// Build the filterbank for the given analysis configuration
    ///
    /// Filter edges are spaced evenly on the mel scale between `low_hz` and
    /// `high_hz`, converted back to Hz, and snapped to FFT bin indices.
    /// Zero-width (degenerate) triangle segments contribute no weight.
    pub fn new(
        sample_rate: u32,
        frame_size: usize,
        n_filters: usize,
        low_hz: f32,
        high_hz: f32,
    ) -> Self {
        let fft_bins = frame_size / 2;

        let mel_low = hz_to_mel(low_hz);
        let mel_high = hz_to_mel(high_hz);

        // n_filters + 2 edge points, evenly spaced in mel
        let bins: Vec<usize> = (0..n_filters + 2)
            .map(|i| {
                let mel = mel_low + (mel_high - mel_low) * i as f32 / (n_filters + 1) as f32;
                let hz = mel_to_hz(mel);
                let bin = (hz * frame_size as f32 / sample_rate as f32).round() as isize;
                bin.clamp(0, fft_bins as isize - 1) as usize
            })
            .collect();

        let weights = (0..n_filters)
            .map(|i| {
                let (left, center, right) = (bins[i], bins[i + 1], bins[i + 2]);
                (0..fft_bins)
                    .map(|j| {
                        if j < left || j > right {
                            0.0
                        } else if j < center {
                            let width = center - left;
                            if width > 0 {
                                (j - left) as f32 / width as f32
                            } else {
                                0.0
                            }
                        } else {
                            let width = right - center;
                            if width > 0 {
                                (right - j) as f32 / width as f32
                            } else {
                                0.0
                            }
                        }
                    })
                    .collect()
            })
            .collect();

        Self { weights, fft_bins }
    }

    /// Number of filters (output bands)
    pub fn n_filters(&self) -> usize {
        self.weights.len()
    }

    /// Number of power-spectrum bins each filter spans
    pub fn fft_bins(&self) -> usize {
        self.fft_bins
    }

    /// Weights for filter `i`
    pub fn filter(&self, i: usize) -> &[f32] {
        &self.weights[i]
    }

    /// Weighted-sum a power spectrum into per-band energies
    pub fn apply(&self, power_spectrum: &[f32]) -> Vec<f32> {
        self.weights
            .iter()
            .map(|filter| {
                filter
                    .iter()
                    .zip(power_spectrum.iter())
                    .map(|(w, p)| w * p)
                    .sum()
            })
            .collect()
    }
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0f32.powf(mel / 2595.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_bank() -> MelFilterbank {
        MelFilterbank::new(22050, 512, 20, 300.0, 8000.0)
    }

    #[test]
    fn test_mel_scale_round_trip() {
        for hz in [300.0f32, 1000.0, 4000.0, 8000.0] {
            let back = mel_to_hz(hz_to_mel(hz));
            assert!((back - hz).abs() < hz * 1e-4);
        }
        assert!(hz_to_mel(0.0).abs() < 1e-6);
    }

    #[test]
    fn test_dimensions() {
        let bank = reference_bank();
        assert_eq!(bank.n_filters(), 20);
        assert_eq!(bank.fft_bins(), 256);
        assert_eq!(bank.apply(&vec![1.0; 256]).len(), 20);
    }

    #[test]
    fn test_weights_bounded_and_zero_outside_support() {
        let bank = reference_bank();
        for i in 0..bank.n_filters() {
            let filter = bank.filter(i);
            let active: Vec<usize> = (0..filter.len()).filter(|&j| filter[j] > 0.0).collect();
            assert!(!active.is_empty(), "filter {i} has no active bins");

            for &w in filter {
                assert!((0.0..=1.0).contains(&w));
            }

            // Support is one contiguous run; everything outside is exactly 0
            let (first, last) = (active[0], *active.last().unwrap());
            for j in 0..filter.len() {
                if j < first || j > last {
                    assert_eq!(filter[j], 0.0);
                }
            }
        }
    }

    #[test]
    fn test_non_degenerate_filter_peaks_at_one() {
        let bank = reference_bank();
        let mut saw_unit_peak = false;
        for i in 0..bank.n_filters() {
            let peak = bank
                .filter(i)
                .iter()
                .cloned()
                .fold(0.0f32, f32::max);
            if (peak - 1.0).abs() < 1e-6 {
                saw_unit_peak = true;
            }
        }
        // With 20 filters over 300-8000 Hz at 512/22050 resolution the
        // triangles are wide enough that center bins reach full weight
        assert!(saw_unit_peak);
    }

    #[test]
    fn test_apply_on_flat_spectrum_is_weight_sum() {
        let bank = reference_bank();
        let flat = vec![1.0f32; bank.fft_bins()];
        let energies = bank.apply(&flat);
        for (i, &e) in energies.iter().enumerate() {
            let weight_sum: f32 = bank.filter(i).iter().sum();
            assert!((e - weight_sum).abs() < 1e-4);
        }
    }

    #[test]
    fn test_degenerate_segments_yield_zero() {
        // Absurdly many filters for the bin resolution forces zero-width
        // triangle segments; those must produce all-zero weights, not NaN
        let bank = MelFilterbank::new(22050, 32, 40, 300.0, 8000.0);
        for i in 0..bank.n_filters() {
            for &w in bank.filter(i) {
                assert!(w.is_finite());
                assert!((0.0..=1.0).contains(&w));
            }
        }
    }
}

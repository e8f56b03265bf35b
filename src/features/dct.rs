//! Cepstral transform (DCT-II)

use std::f64::consts::PI;

/// Unnormalized DCT-II: `out[k] = sum_i in[i] * cos(pi * k * (i + 0.5) / M)`
///
/// Accumulates in f64, matching the numerical behavior expected of the
/// cepstral stage when filter counts are small.
pub fn dct_ii(input: &[f32]) -> Vec<f32> {
    let m = input.len();
    (0..m)
        .map(|k| {
            let mut sum = 0.0f64;
            for (i, &x) in input.iter().enumerate() {
                sum += x as f64 * (PI * k as f64 * (i as f64 + 0.5) / m as f64).cos();
            }
            sum as f32
        })
        .collect()
}

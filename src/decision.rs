//! Decision layer: raw model outputs to labeled predictions
//!
//! The stethoscope model emits four class scores; the chest-image models in
//! circulation emit either a single value (sigmoid or raw logit, depending
//! on how the graph was exported) or a pair of logits. The single-output
//! case is disambiguated by value range: anything in [-10, 10] that is not
//! already in [0, 1] is treated as a logit and passed through a sigmoid.

use crate::error::{PipelineError, Result};
use std::collections::HashMap;
use tracing::debug;

/// Class labels of the 4-way stethoscope classifier, in output order
pub const BREATH_SOUND_LABELS: [&str; 4] = ["Both", "Crackle", "Normal", "Wheeze"];

/// Class labels of the chest-image classifier, in output order
pub const XRAY_LABELS: [&str; 2] = ["Healthy", "Pneumonia"];

/// A labeled prediction with per-class probabilities
#[derive(Debug, Clone)]
pub struct Decision {
    /// Predicted class label
    pub label: String,
    /// Probability per label; sums to 1.0 within floating tolerance
    pub confidence: HashMap<String, f32>,
}

impl Decision {
    /// Even probability split across `labels`, for the explicit degraded
    /// path taken when a model's output shape is unrecognized
    pub fn degraded_even_split(labels: &[&str]) -> Self {
        let p = 1.0 / labels.len() as f32;
        Self {
            label: labels[0].to_string(),
            confidence: labels.iter().map(|&l| (l.to_string(), p)).collect(),
        }
    }
}

/// Classifier output form, resolved once from the model's output shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// One value: a sigmoid probability or a raw logit
    SingleScore,
    /// Two logits, softmaxed against each other
    PairedLogits,
    /// `n` class logits, softmaxed jointly
    MultiClass(usize),
}

impl OutputKind {
    /// Resolve the output form from raw model dims
    ///
    /// Rank-1 shapes carry the class count directly; rank-2 shapes are
    /// `[batch, classes]`. Anything else is unrecognized.
    pub fn resolve(dims: &[usize]) -> Result<Self> {
        let n = match dims {
            [n] => *n,
            [_, n] => *n,
            _ => {
                return Err(PipelineError::ShapeInference {
                    shape: dims.to_vec(),
                    reason: "expected a rank-1 or rank-2 classifier output".into(),
                })
            }
        };
        match n {
            0 => Err(PipelineError::ShapeInference {
                shape: dims.to_vec(),
                reason: "classifier declares zero outputs".into(),
            }),
            1 => Ok(OutputKind::SingleScore),
            2 => Ok(OutputKind::PairedLogits),
            n => Ok(OutputKind::MultiClass(n)),
        }
    }
}

/// Numerically stable softmax: max-subtracted before exponentiation
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|&e| e / sum).collect()
}

/// Logistic sigmoid
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Argmax with first-occurring index winning ties
fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Interpret the 4-way stethoscope output
///
/// Softmaxes the first four scores against the breath-sound labels and
/// picks the argmax.
pub fn decide_breath_sounds(scores: &[f32]) -> Result<Decision> {
    if scores.len() < BREATH_SOUND_LABELS.len() {
        return Err(PipelineError::ShapeInference {
            shape: vec![scores.len()],
            reason: format!(
                "stethoscope model must emit at least {} scores",
                BREATH_SOUND_LABELS.len()
            ),
        });
    }

    let probs = softmax(&scores[..BREATH_SOUND_LABELS.len()]);
    let winner = argmax(&probs);

    let confidence = BREATH_SOUND_LABELS
        .iter()
        .zip(probs.iter())
        .map(|(&label, &p)| (label.to_string(), p))
        .collect();

    debug!(label = BREATH_SOUND_LABELS[winner], p = probs[winner], "breath sound decision");
    Ok(Decision {
        label: BREATH_SOUND_LABELS[winner].to_string(),
        confidence,
    })
}

/// Interpret the chest-image output for the resolved [`OutputKind`]
///
/// - `SingleScore`: logit-vs-probability disambiguation, then a
///   Pneumonia/Healthy split at 0.5
/// - `PairedLogits` (and wider): stable 2-way softmax over
///   [Healthy, Pneumonia], first two scores
pub fn decide_xray(kind: OutputKind, scores: &[f32]) -> Result<Decision> {
    match kind {
        OutputKind::SingleScore => {
            let &raw = scores.first().ok_or_else(|| PipelineError::ShapeInference {
                shape: vec![0],
                reason: "single-output model returned no values".into(),
            })?;

            let p_pneumonia = if (-10.0..=10.0).contains(&raw) && !(0.0..=1.0).contains(&raw) {
                debug!(raw, "treating single output as a logit");
                sigmoid(raw)
            } else {
                debug!(raw, "treating single output as a probability");
                raw.clamp(0.0, 1.0)
            };

            let mut confidence = HashMap::new();
            confidence.insert("Pneumonia".to_string(), p_pneumonia);
            confidence.insert("Healthy".to_string(), 1.0 - p_pneumonia);
            let label = if p_pneumonia > 0.5 { "Pneumonia" } else { "Healthy" };
            Ok(Decision {
                label: label.to_string(),
                confidence,
            })
        }
        OutputKind::PairedLogits | OutputKind::MultiClass(_) => {
            if scores.len() < 2 {
                return Err(PipelineError::ShapeInference {
                    shape: vec![scores.len()],
                    reason: "paired-output model returned fewer than two values".into(),
                });
            }
            let probs = softmax(&scores[..2]);
            let mut confidence = HashMap::new();
            confidence.insert(XRAY_LABELS[0].to_string(), probs[0]);
            confidence.insert(XRAY_LABELS[1].to_string(), probs[1]);
            let label = if probs[1] > probs[0] {
                XRAY_LABELS[1]
            } else {
                XRAY_LABELS[0]
            };
            Ok(Decision {
                label: label.to_string(),
                confidence,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        for scores in [
            vec![0.0f32],
            vec![1.0, 2.0, 3.0, 4.0],
            vec![-1000.0, 1000.0],
            vec![5.5; 8],
        ] {
            let probs = softmax(&scores);
            let sum: f32 = probs.iter().sum();
            assert!((sum - 1.0).abs() < 1e-6);
            assert!(probs.iter().all(|&p| (0.0..=1.0).contains(&p)));
        }
    }

    #[test]
    fn test_softmax_is_shift_invariant() {
        let a = softmax(&[1.0, 2.0, 3.0]);
        let b = softmax(&[101.0, 102.0, 103.0]);
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_breath_sound_argmax() {
        let decision = decide_breath_sounds(&[0.1, 3.0, 0.2, 0.3]).unwrap();
        assert_eq!(decision.label, "Crackle");
        assert_eq!(decision.confidence.len(), 4);
        let sum: f32 = decision.confidence.values().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_breath_sound_tie_breaks_to_first_index() {
        let decision = decide_breath_sounds(&[1.0, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(decision.label, "Both");
    }

    #[test]
    fn test_breath_sound_ignores_extra_scores() {
        let decision = decide_breath_sounds(&[0.0, 0.0, 5.0, 0.0, 99.0]).unwrap();
        assert_eq!(decision.label, "Normal");
    }

    #[test]
    fn test_breath_sound_rejects_short_output() {
        let err = decide_breath_sounds(&[1.0, 2.0]).unwrap_err();
        assert_eq!(err.kind(), "ShapeInferenceError");
    }

    #[test]
    fn test_single_logit_applies_sigmoid() {
        // 5.2 is in [-10, 10] but outside [0, 1]: a logit
        let decision = decide_xray(OutputKind::SingleScore, &[5.2]).unwrap();
        assert_eq!(decision.label, "Pneumonia");
        let p = decision.confidence["Pneumonia"];
        assert!((p - sigmoid(5.2)).abs() < 1e-6);
        assert!(p > 0.5);
    }

    #[test]
    fn test_single_probability_passes_through() {
        // 0.3 is already in [0, 1]: taken as a probability, not re-squashed
        let decision = decide_xray(OutputKind::SingleScore, &[0.3]).unwrap();
        assert_eq!(decision.label, "Healthy");
        assert!((decision.confidence["Pneumonia"] - 0.3).abs() < 1e-6);
        assert!((decision.confidence["Healthy"] - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_single_out_of_range_value_is_clamped() {
        // Outside [-10, 10]: not the logit heuristic's territory; clamp
        let decision = decide_xray(OutputKind::SingleScore, &[42.0]).unwrap();
        assert_eq!(decision.label, "Pneumonia");
        assert!((decision.confidence["Pneumonia"] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_paired_logits_softmax() {
        let decision = decide_xray(OutputKind::PairedLogits, &[2.0, 0.5]).unwrap();
        assert_eq!(decision.label, "Healthy");
        let sum: f32 = decision.confidence.values().sum();
        assert!((sum - 1.0).abs() < 1e-6);

        let decision = decide_xray(OutputKind::PairedLogits, &[0.5, 2.0]).unwrap();
        assert_eq!(decision.label, "Pneumonia");
    }

    #[test]
    fn test_output_kind_resolution() {
        assert_eq!(OutputKind::resolve(&[1]).unwrap(), OutputKind::SingleScore);
        assert_eq!(OutputKind::resolve(&[1, 1]).unwrap(), OutputKind::SingleScore);
        assert_eq!(OutputKind::resolve(&[1, 2]).unwrap(), OutputKind::PairedLogits);
        assert_eq!(OutputKind::resolve(&[2]).unwrap(), OutputKind::PairedLogits);
        assert_eq!(OutputKind::resolve(&[1, 4]).unwrap(), OutputKind::MultiClass(4));
        assert!(OutputKind::resolve(&[1, 2, 3]).is_err());
        assert!(OutputKind::resolve(&[]).is_err());
        assert!(OutputKind::resolve(&[1, 0]).is_err());
    }

    #[test]
    fn test_degraded_even_split() {
        let decision = Decision::degraded_even_split(&XRAY_LABELS);
        assert_eq!(decision.label, "Healthy");
        for p in decision.confidence.values() {
            assert!((p - 0.5).abs() < 1e-6);
        }
    }
}

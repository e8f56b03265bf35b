//! Inference orchestration
//!
//! The on-device model executor is an external collaborator; this module
//! defines the [`ModelBackend`] seam it plugs into and the two classifier
//! orchestrators that wire preprocessing, inference, and decision together.

mod classifier;

pub use classifier::{StethoscopeClassifier, XrayClassifier};

use crate::error::Result;

/// Seam for the external model executor
///
/// Implementations wrap whatever runtime actually executes the graph. The
/// declared shapes drive feature-length validation, image layout inference,
/// and decision-path selection; `run` is synchronous and blocking.
pub trait ModelBackend {
    /// Declared input tensor dims, e.g. `[1, 40]` or `[1, 224, 224, 3]`
    fn input_dims(&self) -> &[usize];

    /// Declared output tensor dims, e.g. `[1, 4]` or `[1, 1]`
    fn output_dims(&self) -> &[usize];

    /// Execute the model on a packed input tensor
    fn run(&self, input: &[f32]) -> Result<Vec<f32>>;
}

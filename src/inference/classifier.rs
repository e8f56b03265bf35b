//! Classifier orchestrators for the two screening paths

use crate::audio::WaveformDecoder;
use crate::config::NormalizationParams;
use crate::decision::{decide_breath_sounds, decide_xray, Decision, OutputKind, XRAY_LABELS};
use crate::error::{PipelineError, Result};
use crate::features::MfccPipeline;
use crate::inference::ModelBackend;
use crate::vision::ImageTensorPacker;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Stethoscope path: clip file -> MFCC features -> model -> 4-way decision
///
/// Holds its own MFCC pipeline instance; build one classifier per thread of
/// concurrent inference. Normalization parameters are shared read-only.
pub struct StethoscopeClassifier<B: ModelBackend> {
    backend: B,
    pipeline: MfccPipeline,
    params: Option<Arc<NormalizationParams>>,
}

impl<B: ModelBackend> StethoscopeClassifier<B> {
    /// Create a classifier around the given backend, without normalization
    /// parameters (classification fails until they are attached)
    pub fn new(backend: B) -> Result<Self> {
        Ok(Self {
            backend,
            pipeline: MfccPipeline::new()?,
            params: None,
        })
    }

    /// Attach the normalization parameters loaded at startup
    pub fn with_normalization(mut self, params: Arc<NormalizationParams>) -> Self {
        self.params = Some(params);
        self
    }

    /// Classify a recorded clip
    pub fn classify<P: AsRef<Path>>(&mut self, audio_path: P) -> Result<Decision> {
        let params = self
            .params
            .clone()
            .ok_or(PipelineError::NormalizationNotLoaded)?;

        let waveform = WaveformDecoder::decode(audio_path)?;
        debug!(samples = waveform.len(), "clip decoded");

        let features = self.pipeline.normalized_features(&waveform, &params)?;

        let expected: usize = self.backend.input_dims().iter().product();
        if features.len() != expected {
            return Err(PipelineError::FeatureLengthMismatch {
                expected,
                actual: features.len(),
            });
        }

        let scores = self.backend.run(&features)?;
        decide_breath_sounds(&scores)
    }
}

/// Chest-image path: image file -> packed tensor -> model -> decision
pub struct XrayClassifier<B: ModelBackend> {
    backend: B,
    packer: ImageTensorPacker,
}

impl<B: ModelBackend> XrayClassifier<B> {
    /// Create a classifier, resolving the image layout from the backend's
    /// declared input shape
    pub fn new(backend: B) -> Result<Self> {
        let packer = ImageTensorPacker::new(backend.input_dims())?;
        Ok(Self { backend, packer })
    }

    /// Classify a chest image
    ///
    /// If the model declares an output shape that cannot be interpreted,
    /// the classifier returns an explicit even-split degraded decision
    /// instead of failing the whole call, and logs the substitution.
    pub fn classify<P: AsRef<Path>>(&self, image_path: P) -> Result<Decision> {
        let tensor = self.packer.pack_file(image_path)?;
        let scores = self.backend.run(&tensor)?;

        let kind = match OutputKind::resolve(self.backend.output_dims()) {
            Ok(kind) => kind,
            Err(e) => {
                warn!("unrecognized output shape ({e}); returning degraded even split");
                return Ok(Decision::degraded_even_split(&XRAY_LABELS));
            }
        };

        decide_xray(kind, &scores)
    }
}

//! Bitmap to model-input tensor conversion

use crate::error::{PipelineError, Result};
use image::imageops::FilterType;
use image::DynamicImage;
use std::path::Path;
use tracing::debug;

/// Per-channel means used to normalize RGB values (ImageNet statistics)
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Per-channel standard deviations used to normalize RGB values
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Memory order of the packed tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorLayout {
    /// Channel-last (NHWC): R,G,B interleaved per pixel
    ChannelLast,
    /// Channel-first (NCHW): all R, then all G, then all B
    ChannelFirst,
}

/// Validated image-input descriptor derived from a model's raw 4-d shape
#[derive(Debug, Clone, Copy)]
pub struct InputShape {
    /// Target width in pixels
    pub width: u32,
    /// Target height in pixels
    pub height: u32,
    /// Number of channels written per pixel
    pub channels: usize,
    /// Memory layout
    pub layout: TensorLayout,
}

impl InputShape {
    /// Infer layout and extents from raw model dims
    ///
    /// A 4-d shape whose last dim is in 1..=4 is channel-last; otherwise the
    /// second dim is taken as the channel count (channel-first). Anything
    /// else is rejected rather than guessed at.
    pub fn from_dims(dims: &[usize]) -> Result<Self> {
        if dims.len() != 4 {
            return Err(PipelineError::ShapeInference {
                shape: dims.to_vec(),
                reason: "expected a 4-dimensional image input shape".into(),
            });
        }

        let (height, width, channels, layout) = if (1..=4).contains(&dims[3]) {
            (dims[1], dims[2], dims[3], TensorLayout::ChannelLast)
        } else {
            (dims[2], dims[3], dims[1], TensorLayout::ChannelFirst)
        };

        if height == 0 || width == 0 || !(1..=4).contains(&channels) {
            return Err(PipelineError::ShapeInference {
                shape: dims.to_vec(),
                reason: format!(
                    "implausible image extents {width}x{height}x{channels}"
                ),
            });
        }

        Ok(Self {
            width: width as u32,
            height: height as u32,
            channels,
            layout,
        })
    }

    /// Total number of f32 values in the packed tensor
    pub fn element_count(&self) -> usize {
        self.width as usize * self.height as usize * self.channels
    }
}

/// Resizes a decoded image and packs normalized channel values in the
/// layout the model declares
pub struct ImageTensorPacker {
    shape: InputShape,
}

impl ImageTensorPacker {
    /// Build a packer for the given raw model input dims
    pub fn new(dims: &[usize]) -> Result<Self> {
        let shape = InputShape::from_dims(dims)?;
        debug!(?shape, "image input shape resolved");
        Ok(Self { shape })
    }

    /// The resolved input descriptor
    pub fn shape(&self) -> &InputShape {
        &self.shape
    }

    /// Decode an image file and pack it
    pub fn pack_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<f32>> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(self.pack(&img))
    }

    /// Resize, normalize, and lay out an already-decoded image
    pub fn pack(&self, img: &DynamicImage) -> Vec<f32> {
        let resized = img
            .resize_exact(self.shape.width, self.shape.height, FilterType::Triangle)
            .to_rgb8();

        let (w, h) = (self.shape.width as usize, self.shape.height as usize);
        let channels = self.shape.channels;
        let mut tensor = Vec::with_capacity(self.shape.element_count());

        match self.shape.layout {
            TensorLayout::ChannelLast => {
                for pixel in resized.pixels() {
                    for c in 0..channels {
                        tensor.push(normalize_channel(pixel.0[c.min(2)], c));
                    }
                }
            }
            TensorLayout::ChannelFirst => {
                for c in 0..channels {
                    for y in 0..h {
                        for x in 0..w {
                            let pixel = resized.get_pixel(x as u32, y as u32);
                            tensor.push(normalize_channel(pixel.0[c.min(2)], c));
                        }
                    }
                }
            }
        }

        tensor
    }
}

// Channel indices beyond blue reuse the blue statistics, mirroring how a
// declared alpha plane is filled from the last color channel
fn normalize_channel(value: u8, c: usize) -> f32 {
    let c = c.min(2);
    (value as f32 / 255.0 - IMAGENET_MEAN[c]) / IMAGENET_STD[c]
}

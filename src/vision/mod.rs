//! Image tensor packing
//!
//! - Layout inference (NHWC vs NCHW) from the model's declared input dims
//! - Bilinear resize and per-channel ImageNet normalization

mod packer;

pub use packer::{ImageTensorPacker, InputShape, TensorLayout, IMAGENET_MEAN, IMAGENET_STD};

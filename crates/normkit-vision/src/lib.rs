//! # normkit Vision
//!
//! Image loading with an explicitly chosen decoding backend.
//!
//! | backend  | output                                   |
//! |----------|------------------------------------------|
//! | `pil`    | [`DecodedImage::Pil`], native colour mode |
//! | `cv2`    | [`DecodedImage::Array`], `H x W x 3` BGR  |
//! | `tensor` | [`DecodedImage::Tensor`], `3 x H x W` RGB |
//!
//! ```rust,no_run
//! use normkit_vision::{image_load, ImageBackend, VisionConfig};
//!
//! let config = VisionConfig::new().with_backend(ImageBackend::Tensor);
//! let image = image_load("photo.png", &config).unwrap();
//! let chw = image.to_chw_f32(config.normalize).unwrap();
//! ```

#![allow(clippy::result_large_err)]

pub mod backend;
pub mod config;
pub mod decoder;
pub mod load;

pub use backend::ImageBackend;
pub use config::{ConfigFormat, ConfigLoader, EnvironmentOverride, VisionConfig};
pub use decoder::{
    decoder_for, DecodedImage, ImageDecoder, OpenCvDecoder, PilDecoder, TensorDecoder,
};
pub use load::{image_load, image_load_chw, image_load_with};

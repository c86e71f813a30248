//! Image decoders, one per [`ImageBackend`]

use crate::backend::ImageBackend;
use image::{DynamicImage, GenericImageView, ImageError, RgbImage};
use ndarray::Array3;
use normkit_core::{Result, Tensor, TensorError};
use std::path::Path;
use tracing::debug;

/// A decoded image in the layout of the backend that produced it
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedImage {
    /// Native colour mode, as stored in the file
    Pil(DynamicImage),
    /// `H x W x 3`, BGR
    Array(Array3<u8>),
    /// `3 x H x W`, RGB
    Tensor(Tensor<u8>),
}

impl DecodedImage {
    pub fn backend(&self) -> ImageBackend {
        match self {
            DecodedImage::Pil(_) => ImageBackend::Pil,
            DecodedImage::Array(_) => ImageBackend::Cv2,
            DecodedImage::Tensor(_) => ImageBackend::Tensor,
        }
    }

    /// `(height, width)` in pixels
    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            DecodedImage::Pil(img) => {
                let (w, h) = img.dimensions();
                (h as usize, w as usize)
            }
            DecodedImage::Array(arr) => (arr.shape()[0], arr.shape()[1]),
            DecodedImage::Tensor(t) => (t.shape()[1], t.shape()[2]),
        }
    }

    /// Convert to a `3 x H x W` RGB float tensor
    ///
    /// With `normalize` the values are scaled to `[0, 1]`, otherwise they stay
    /// in `[0, 255]`.
    pub fn to_chw_f32(&self, normalize: bool) -> Result<Tensor<f32>> {
        let scale = if normalize { 1.0 / 255.0 } else { 1.0 };
        let (height, width) = self.dimensions();

        let data: Vec<f32> = match self {
            DecodedImage::Pil(img) => {
                let rgb = img.to_rgb8();
                (0..3)
                    .flat_map(|c| rgb.pixels().map(move |p| p[c]))
                    .map(|v| v as f32 * scale)
                    .collect()
            }
            DecodedImage::Array(arr) => {
                let mut data = Vec::with_capacity(3 * height * width);
                // BGR -> RGB
                for c in (0..3).rev() {
                    for y in 0..height {
                        for x in 0..width {
                            data.push(arr[[y, x, c]] as f32 * scale);
                        }
                    }
                }
                data
            }
            DecodedImage::Tensor(t) => t.to_vec().into_iter().map(|v| v as f32 * scale).collect(),
        };

        Tensor::from_vec(data, &[3, height, width])
    }
}

/// Decodes image files into one backend's layout
pub trait ImageDecoder: Send + Sync {
    fn backend(&self) -> ImageBackend;

    fn decode(&self, path: &Path) -> Result<DecodedImage>;
}

fn open_image(operation: &str, path: &Path) -> Result<DynamicImage> {
    let img = image::open(path).map_err(|e| match e {
        ImageError::IoError(io) => {
            TensorError::io_error(operation, format!("failed to read image: {io}"), path)
        }
        other => TensorError::io_error(operation, format!("failed to decode image: {other}"), path),
    })?;
    debug!(
        path = %path.display(),
        width = img.width(),
        height = img.height(),
        color = ?img.color(),
        "decoded image"
    );
    Ok(img)
}

/// Keeps the file's native colour mode
#[derive(Debug, Clone, Copy, Default)]
pub struct PilDecoder;

impl ImageDecoder for PilDecoder {
    fn backend(&self) -> ImageBackend {
        ImageBackend::Pil
    }

    fn decode(&self, path: &Path) -> Result<DecodedImage> {
        open_image("pil_loader", path).map(DecodedImage::Pil)
    }
}

/// Three-channel `H x W x 3` BGR array; alpha is dropped and grayscale expanded
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCvDecoder;

impl ImageDecoder for OpenCvDecoder {
    fn backend(&self) -> ImageBackend {
        ImageBackend::Cv2
    }

    fn decode(&self, path: &Path) -> Result<DecodedImage> {
        let rgb = open_image("cv2_loader", path)?.to_rgb8();
        Ok(DecodedImage::Array(hwc_bgr(&rgb)))
    }
}

/// `3 x H x W` RGB tensor
#[derive(Debug, Clone, Copy, Default)]
pub struct TensorDecoder;

impl ImageDecoder for TensorDecoder {
    fn backend(&self) -> ImageBackend {
        ImageBackend::Tensor
    }

    fn decode(&self, path: &Path) -> Result<DecodedImage> {
        let rgb = open_image("tensor_loader", path)?.to_rgb8();
        chw_rgb(&rgb).map(DecodedImage::Tensor)
    }
}

fn hwc_bgr(rgb: &RgbImage) -> Array3<u8> {
    let (width, height) = rgb.dimensions();
    Array3::from_shape_fn((height as usize, width as usize, 3), |(y, x, c)| {
        rgb.get_pixel(x as u32, y as u32)[2 - c]
    })
}

fn chw_rgb(rgb: &RgbImage) -> Result<Tensor<u8>> {
    let (width, height) = rgb.dimensions();
    let data: Vec<u8> = (0..3)
        .flat_map(|c| rgb.pixels().map(move |p| p[c]))
        .collect();
    Tensor::from_vec(data, &[3, height as usize, width as usize])
}

/// Decoder for `backend`
pub fn decoder_for(backend: ImageBackend) -> Box<dyn ImageDecoder> {
    match backend {
        ImageBackend::Pil => Box::new(PilDecoder),
        ImageBackend::Cv2 => Box::new(OpenCvDecoder),
        ImageBackend::Tensor => Box::new(TensorDecoder),
    }
}

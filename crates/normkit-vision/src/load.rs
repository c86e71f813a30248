//! Image loading entry points
//!
//! The backend is always passed in, either directly or through a
//! [`VisionConfig`]; nothing here reads or mutates process-wide state.

use crate::backend::ImageBackend;
use crate::config::VisionConfig;
use crate::decoder::{decoder_for, DecodedImage};
use normkit_core::{Result, Tensor};
use std::path::Path;

/// Decode `path` with the backend selected by `config`
pub fn image_load<P: AsRef<Path>>(path: P, config: &VisionConfig) -> Result<DecodedImage> {
    image_load_with(path, config.image_backend)
}

/// Decode `path` with an explicit backend
pub fn image_load_with<P: AsRef<Path>>(path: P, backend: ImageBackend) -> Result<DecodedImage> {
    decoder_for(backend).decode(path.as_ref())
}

/// Decode `path` and convert it to a `3 x H x W` float tensor
///
/// Pixel values are scaled to `[0, 1]` when `config.normalize` is set.
pub fn image_load_chw<P: AsRef<Path>>(path: P, config: &VisionConfig) -> Result<Tensor<f32>> {
    image_load(path, config)?.to_chw_f32(config.normalize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use normkit_core::TensorError;
    use tempfile::TempDir;

    fn write_png(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("sample.png");
        RgbImage::from_pixel(4, 2, Rgb([255, 0, 51])).save(&path).unwrap();
        path
    }

    #[test]
    fn test_config_selects_backend() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir);

        for backend in ImageBackend::ALL {
            let config = VisionConfig::new().with_backend(backend);
            assert_eq!(image_load(&path, &config).unwrap().backend(), backend);
            assert_eq!(image_load_with(&path, backend).unwrap().backend(), backend);
        }
    }

    #[test]
    fn test_load_chw_respects_normalize() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir);

        let config = VisionConfig::new().with_backend(ImageBackend::Cv2);
        let t = image_load_chw(&path, &config).unwrap();
        assert_eq!(t.shape().dims(), &[3, 2, 4]);
        assert!((t[&[0, 0, 0][..]] - 1.0).abs() < 1e-6);
        assert_eq!(t[&[1, 1, 3][..]], 0.0);

        let raw = image_load_chw(&path, &config.with_normalize(false)).unwrap();
        assert_eq!(raw[&[2, 1, 1][..]], 51.0);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = image_load(dir.path().join("nope.png"), &VisionConfig::default()).unwrap_err();
        assert!(matches!(err, TensorError::IoError { .. }));
    }
}

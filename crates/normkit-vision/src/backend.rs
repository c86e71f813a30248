//! Image decoding backends
//!
//! The backend names an output convention, mirroring the three loaders
//! vision pipelines commonly switch between:
//!
//! - `pil`: image in its native colour mode
//! - `cv2`: `H x W x 3` array in BGR order
//! - `tensor`: `3 x H x W` tensor in RGB order

use normkit_core::{Result, TensorError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageBackend {
    #[default]
    Pil,
    Cv2,
    Tensor,
}

impl ImageBackend {
    /// Every backend, in canonical order
    pub const ALL: [ImageBackend; 3] = [ImageBackend::Pil, ImageBackend::Cv2, ImageBackend::Tensor];

    pub fn name(&self) -> &'static str {
        match self {
            ImageBackend::Pil => "pil",
            ImageBackend::Cv2 => "cv2",
            ImageBackend::Tensor => "tensor",
        }
    }
}

impl fmt::Display for ImageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ImageBackend {
    type Err = TensorError;

    fn from_str(s: &str) -> Result<Self> {
        ImageBackend::ALL
            .into_iter()
            .find(|backend| backend.name() == s)
            .ok_or_else(|| {
                TensorError::invalid_argument(
                    "set_image_backend",
                    format!("Expected backend are one of ['pil', 'cv2', 'tensor'], but got {s}"),
                )
            })
    }
}

impl TryFrom<&str> for ImageBackend {
    type Error = TensorError;

    fn try_from(value: &str) -> Result<Self> {
        value.parse()
    }
}

//! JPEG encoding of image tensors

use crate::config::DEFAULT_JPEG_QUALITY;
use crate::error::{DatawingError, TensorError};
use crate::tensor::tensor_to_bytes;
use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
use image::{ExtendedColorType, ImageEncoder as _};
use ndarray::{Array3, ArrayView3};

/// Baseline JPEG encoder for `(height, width, channels)` images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegEncoder {
    quality: u8,
}

impl JpegEncoder {
    /// Create encoder with quality (clamped to 1..=100)
    #[inline]
    #[must_use]
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    /// Configured quality
    #[inline]
    #[must_use]
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode an 8-bit `(height, width, channels)` array
    ///
    /// # Errors
    /// Returns error for channel counts other than 1 or 3, empty or oversized
    /// dimensions, or if the codec fails
    pub fn encode_bytes(&self, pixels: &Array3<u8>) -> Result<Vec<u8>, DatawingError> {
        let (height, width, channels) = pixels.dim();
        let color_type = match channels {
            1 => ExtendedColorType::L8,
            3 => ExtendedColorType::Rgb8,
            other => return Err(TensorError::UnsupportedChannels(other).into()),
        };
        let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(TensorError::InvalidDimensions { height, width }.into());
        };
        if w == 0 || h == 0 {
            return Err(TensorError::InvalidDimensions { height, width }.into());
        }

        let raw: Vec<u8> = pixels.as_standard_layout().iter().copied().collect();

        let mut buf = Vec::with_capacity(raw.len() / 4);
        let encoder = ImageJpegEncoder::new_with_quality(&mut buf, self.quality);
        encoder.write_image(&raw, w, h, color_type)?;

        tracing::debug!(width, height, channels, size = buf.len(), "encoded jpeg");
        Ok(buf)
    }

    /// Convert a float tensor to bytes and encode it
    ///
    /// # Errors
    /// See [`JpegEncoder::encode_bytes`]
    pub fn encode_tensor(&self, tensor: ArrayView3<'_, f32>) -> Result<Vec<u8>, DatawingError> {
        self.encode_bytes(&tensor_to_bytes(tensor))
    }
}

impl Default for JpegEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

    #[test]
    fn encode_rgb() {
        let pixels = Array3::<u8>::from_elem((8, 16, 3), 128);
        let jpeg = JpegEncoder::default().encode_bytes(&pixels).unwrap();
        assert_eq!(&jpeg[..2], &JPEG_SOI);

        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.height(), 8);
    }

    #[test]
    fn encode_grayscale() {
        let pixels = Array3::<u8>::from_elem((4, 4, 1), 200);
        let jpeg = JpegEncoder::new(90).encode_bytes(&pixels).unwrap();
        assert_eq!(&jpeg[..2], &JPEG_SOI);
    }

    #[test]
    fn encode_white_tensor() {
        let tensor = Array3::<f32>::ones((4, 4, 3));
        let jpeg = JpegEncoder::default().encode_tensor(tensor.view()).unwrap();

        let decoded = image::load_from_memory(&jpeg).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (4, 4));
        assert!(decoded.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn encode_rejects_rgba() {
        let pixels = Array3::<u8>::zeros((4, 4, 4));
        let err = JpegEncoder::default().encode_bytes(&pixels).unwrap_err();
        assert!(matches!(
            err,
            DatawingError::Tensor(TensorError::UnsupportedChannels(4))
        ));
    }

    #[test]
    fn encode_rejects_two_channels() {
        let pixels = Array3::<u8>::zeros((4, 4, 2));
        assert!(JpegEncoder::default().encode_bytes(&pixels).is_err());
    }

    #[test]
    fn encode_rejects_zero_width() {
        let pixels = Array3::<u8>::zeros((4, 0, 3));
        let err = JpegEncoder::default().encode_bytes(&pixels).unwrap_err();
        assert!(matches!(
            err,
            DatawingError::Tensor(TensorError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn quality_clamped() {
        assert_eq!(JpegEncoder::new(0).quality(), 1);
        assert_eq!(JpegEncoder::new(255).quality(), 100);
    }
}

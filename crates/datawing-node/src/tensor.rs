//! Image tensors
//!
//! The host hands images around as channel-last float batches with shape
//! `(batch, height, width, channels)` and values nominally in `[0, 1]`.
//! Only the first image of a batch is ever encoded.

use crate::error::TensorError;
use ndarray::{Array3, Array4, ArrayView3, Axis};

/// Channel-last float image batch owned by the host graph
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBatch(Array4<f32>);

impl ImageBatch {
    /// Wrap a `(batch, height, width, channels)` array
    #[inline]
    #[must_use]
    pub fn new(data: Array4<f32>) -> Self {
        Self(data)
    }

    /// Build a single-image batch from an 8-bit RGB image
    ///
    /// # Errors
    /// Returns error if the pixel buffer does not match the image dimensions
    pub fn from_rgb8(image: &image::RgbImage) -> Result<Self, TensorError> {
        let (width, height) = image.dimensions();
        let data: Vec<f32> = image
            .as_raw()
            .iter()
            .map(|&b| f32::from(b) / 255.0)
            .collect();
        let array = Array4::from_shape_vec((1, height as usize, width as usize, 3), data)?;
        Ok(Self(array))
    }

    /// Number of images in the batch
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len_of(Axis(0))
    }

    /// Check if batch is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Batch shape as `(batch, height, width, channels)`
    #[inline]
    #[must_use]
    pub fn shape(&self) -> (usize, usize, usize, usize) {
        self.0.dim()
    }

    /// First image of the batch
    ///
    /// # Errors
    /// Returns [`TensorError::EmptyBatch`] when the batch holds no images
    pub fn first(&self) -> Result<ArrayView3<'_, f32>, TensorError> {
        if self.is_empty() {
            return Err(TensorError::EmptyBatch);
        }
        Ok(self.0.index_axis(Axis(0), 0))
    }

    /// Get reference to the underlying array
    #[inline]
    #[must_use]
    pub fn data(&self) -> &Array4<f32> {
        &self.0
    }

    /// Convert to the underlying array (consumes self)
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Array4<f32> {
        self.0
    }
}

impl From<Array4<f32>> for ImageBatch {
    fn from(data: Array4<f32>) -> Self {
        Self::new(data)
    }
}

/// Scale a `[0, 1]` tensor to `[0, 2^bits - 1]` and clip
///
/// No rounding is applied; callers casting the result truncate toward zero.
///
/// # Errors
/// Returns [`TensorError::InvalidBits`] unless `bits` is in `1..=16`
pub fn tensor_to_int(tensor: ArrayView3<'_, f32>, bits: u32) -> Result<Array3<f32>, TensorError> {
    if !(1..=16).contains(&bits) {
        return Err(TensorError::InvalidBits(bits));
    }
    #[allow(clippy::cast_precision_loss)]
    let max = ((1u32 << bits) - 1) as f32;
    Ok(tensor.mapv(|v| (v * max).clamp(0.0, max)))
}

/// Convert a `[0, 1]` tensor to 8-bit values
///
/// Each element becomes `trunc(clip(v * 255, 0, 255))`; NaN becomes 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn tensor_to_bytes(tensor: ArrayView3<'_, f32>) -> Array3<u8> {
    tensor.mapv(|v| (v * 255.0).clamp(0.0, 255.0) as u8)
}

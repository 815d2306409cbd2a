//! SIMD-accelerated grayscale downsampling for fingerprints.
//!
//! Uses fast_image_resize, which picks AVX2/NEON when available.

use crate::error::HashError;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, GrayImage};
use std::path::PathBuf;

fn resize_error(reason: String) -> HashError {
    HashError::DecodeError {
        path: PathBuf::new(),
        reason,
    }
}

/// Convert to grayscale and shrink to `width` x `height`.
pub fn resize_to_grayscale(
    image: &DynamicImage,
    width: u32,
    height: u32,
) -> Result<GrayImage, HashError> {
    // Grayscale first: one channel to resample instead of three
    let gray = image.to_luma8();
    let (src_width, src_height) = gray.dimensions();

    if src_width == 0 || src_height == 0 {
        return Err(resize_error("image has no pixels".to_string()));
    }
    if width == 0 || height == 0 {
        return Err(resize_error("invalid target dimensions".to_string()));
    }

    let src = Image::from_vec_u8(src_width, src_height, gray.into_raw(), PixelType::U8)
        .map_err(|e| resize_error(format!("failed to wrap source image: {}", e)))?;
    let mut dst = Image::new(width, height, PixelType::U8);

    let options =
        ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    Resizer::new()
        .resize(&src, &mut dst, &options)
        .map_err(|e| resize_error(format!("resize failed: {}", e)))?;

    GrayImage::from_raw(width, height, dst.into_vec())
        .ok_or_else(|| resize_error("resized buffer has the wrong length".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            Rgb([r, g, 64])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn resize_produces_requested_grid() {
        let resized = resize_to_grayscale(&create_test_image(100, 100), 9, 8).unwrap();
        assert_eq!(resized.dimensions(), (9, 8));
    }

    #[test]
    fn rejects_zero_target() {
        assert!(resize_to_grayscale(&create_test_image(10, 10), 0, 8).is_err());
    }
}

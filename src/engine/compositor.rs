//! Frame and tensor conversion

use crate::error::{AlphaCutError, AlphaCutResult};
use crate::model::FrameTensor;
use image::{Rgba, RgbaImage, RgbImage};
use ndarray::Array3;

/// Convert a decoded RGB frame into the model's CHW tensor with values
/// scaled to [0, 1]
pub fn frame_to_tensor(frame: &RgbImage) -> FrameTensor {
    let (width, height) = frame.dimensions();
    let mut tensor = Array3::zeros((3, height as usize, width as usize));
    for (x, y, pixel) in frame.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        tensor[[0, y, x]] = pixel[0] as f32 / 255.0;
        tensor[[1, y, x]] = pixel[1] as f32 / 255.0;
        tensor[[2, y, x]] = pixel[2] as f32 / 255.0;
    }
    tensor
}

/// Stack a foreground `[3, H, W]` and alpha `[1, H, W]` into an 8-bit RGBA
/// image.
///
/// Values are clamped to [0, 1] before quantizing; the model's raw output
/// can stray slightly outside the range.
pub fn compose_rgba(
    foreground: &Array3<f32>,
    alpha: &Array3<f32>,
) -> AlphaCutResult<RgbaImage> {
    let fg_shape = foreground.shape();
    let alpha_shape = alpha.shape();
    if fg_shape[0] != 3 {
        return Err(AlphaCutError::ModelError {
            message: format!("foreground must be [3, H, W], got {:?}", fg_shape),
        });
    }
    if alpha_shape[0] != 1 || alpha_shape[1] != fg_shape[1] || alpha_shape[2] != fg_shape[2] {
        return Err(AlphaCutError::ModelError {
            message: format!(
                "alpha must be [1, {}, {}], got {:?}",
                fg_shape[1], fg_shape[2], alpha_shape
            ),
        });
    }

    let (height, width) = (fg_shape[1], fg_shape[2]);
    let mut image = RgbaImage::new(width as u32, height as u32);
    for y in 0..height {
        for x in 0..width {
            let pixel = Rgba([
                quantize(foreground[[0, y, x]]),
                quantize(foreground[[1, y, x]]),
                quantize(foreground[[2, y, x]]),
                quantize(alpha[[0, y, x]]),
            ]);
            image.put_pixel(x as u32, y as u32, pixel);
        }
    }
    Ok(image)
}

fn quantize(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

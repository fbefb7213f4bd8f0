use image::{DynamicImage, RgbImage, imageops::FilterType};
use tract_onnx::prelude::*;

/// Normalize to the RGB channel order the model expects.
pub fn to_rgb(img: &DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Resize to the model's square input edge.
pub fn resize_to_input(img: &RgbImage, input_size: u32) -> RgbImage {
    image::imageops::resize(img, input_size, input_size, FilterType::Nearest)
}

/// Pack an RGB image into a 1x3xHxW f32 tensor scaled to [0, 1].
pub fn to_tensor(img: &RgbImage) -> Tensor {
    let (width, height) = img.dimensions();
    let input = tract_ndarray::Array4::from_shape_fn(
        (1, 3, height as usize, width as usize),
        |(_, channel, y, x)| img.get_pixel(x as u32, y as u32)[channel] as f32 / 255.0,
    );
    input.into_tensor()
}

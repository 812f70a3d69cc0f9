//! Block texture decoding and color statistics.

use crate::types::{rgb8_to_lab, Lab, Rgb};
use image::RgbImage;

/// Decode a PNG block texture into RGB. Alpha is dropped without compositing.
pub fn decode_block_texture(data: &[u8]) -> Result<RgbImage, image::ImageError> {
    Ok(image::load_from_memory(data)?.to_rgb8())
}

/// Mean color of a texture, as the mean of per-pixel L*a*b* values and the
/// mean sRGB value.
pub fn mean_colors(texture: &RgbImage) -> (Lab, Rgb) {
    let count = (texture.width() as u64 * texture.height() as u64).max(1) as f64;
    let mut lab_sum = [0f64; 3];
    let mut rgb_sum = [0f64; 3];

    for pixel in texture.pixels() {
        let lab = rgb8_to_lab(pixel.0);
        for i in 0..3 {
            lab_sum[i] += lab[i] as f64;
            rgb_sum[i] += pixel.0[i] as f64;
        }
    }

    (
        lab_sum.map(|v| (v / count) as f32),
        rgb_sum.map(|v| (v / count) as f32),
    )
}

/// Create a texture filled with one color.
pub fn solid_texture(size: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(size, size, image::Rgb(color))
}

//! sRGB to CIE L*a*b* conversion.
//!
//! Colors are matched in L*a*b* (D65 white point) because Euclidean distance
//! there tracks perceived difference far better than in RGB. `L` lies in
//! `[0, 100]`, `a` and `b` roughly in `[-128, 128]`.

/// A color in CIE L*a*b* space.
pub type Lab = [f32; 3];

/// An sRGB color with channels in `[0, 255]`.
pub type Rgb = [f32; 3];

// D65 reference white.
const WHITE_X: f32 = 0.950_47;
const WHITE_Y: f32 = 1.0;
const WHITE_Z: f32 = 1.088_83;

const EPSILON: f32 = (6.0 / 29.0) * (6.0 / 29.0) * (6.0 / 29.0);

fn srgb_to_linear(channel: f32) -> f32 {
    let c = (channel / 255.0).clamp(0.0, 1.0);
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f32) -> f32 {
    if t > EPSILON {
        t.cbrt()
    } else {
        t / (3.0 * (6.0 / 29.0) * (6.0 / 29.0)) + 4.0 / 29.0
    }
}

/// Convert an sRGB color (`[0, 255]` per channel) to L*a*b*.
pub fn rgb_to_lab(rgb: Rgb) -> Lab {
    let r = srgb_to_linear(rgb[0]);
    let g = srgb_to_linear(rgb[1]);
    let b = srgb_to_linear(rgb[2]);

    let x = 0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b;
    let y = 0.212_672_9 * r + 0.715_152_2 * g + 0.072_175_0 * b;
    let z = 0.019_333_9 * r + 0.119_192_0 * g + 0.950_304_1 * b;

    let fx = lab_f(x / WHITE_X);
    let fy = lab_f(y / WHITE_Y);
    let fz = lab_f(z / WHITE_Z);

    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// Convert an 8-bit sRGB pixel to L*a*b*.
pub fn rgb8_to_lab(pixel: [u8; 3]) -> Lab {
    rgb_to_lab([pixel[0] as f32, pixel[1] as f32, pixel[2] as f32])
}

/// Squared Euclidean distance between two L*a*b* colors.
pub fn lab_distance_squared(a: &Lab, b: &Lab) -> f32 {
    let dl = a[0] - b[0];
    let da = a[1] - b[1];
    let db = a[2] - b[2];
    dl * dl + da * da + db * db
}

use image::DynamicImage;
use imageproc::filter::gaussian_blur_f32;

/// Apply a light Gaussian blur
/// Suppresses sensor and compression noise while keeping symbol edges
pub fn apply(image: DynamicImage, sigma: f32) -> DynamicImage {
    if sigma <= 0.0 {
        return image;
    }

    let gray = image.to_luma8();
    let blurred = gaussian_blur_f32(&gray, sigma);
    DynamicImage::ImageLuma8(blurred)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn smooths_an_isolated_spike() {
        let mut img = GrayImage::from_pixel(11, 11, Luma([200]));
        img.put_pixel(5, 5, Luma([0]));

        let result = apply(DynamicImage::ImageLuma8(img), 0.8);
        let gray = result.to_luma8();

        // The spike is spread over its neighborhood, no longer pure black
        assert!(gray.get_pixel(5, 5).0[0] > 0);
    }

    #[test]
    fn zero_sigma_is_a_no_op() {
        let img = GrayImage::from_pixel(10, 10, Luma([77]));
        let result = apply(DynamicImage::ImageLuma8(img.clone()), 0.0);
        assert_eq!(result.to_luma8().as_raw(), img.as_raw());
    }

    #[test]
    fn preserves_dimensions() {
        let img = GrayImage::new(64, 32);
        let result = apply(DynamicImage::ImageLuma8(img), 1.1);
        assert_eq!(result.width(), 64);
        assert_eq!(result.height(), 32);
    }
}

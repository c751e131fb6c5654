use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Resize to the target width, preserving aspect ratio
/// The recognition model behaves best at a fixed input width
pub fn apply(image: DynamicImage, target_width: u32) -> DynamicImage {
    let (width, height) = image.dimensions();

    if width == 0 || height == 0 || target_width == 0 || width == target_width {
        return image;
    }

    let target_height = ((height as f64 * target_width as f64 / width as f64).round() as u32).max(1);

    // Averaging filter when shrinking avoids aliasing; bicubic when enlarging
    let filter = if target_width < width {
        FilterType::Triangle
    } else {
        FilterType::CatmullRom
    };

    image.resize_exact(target_width, target_height, filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    #[test]
    fn downscales_to_target_width() {
        let img = GrayImage::new(1200, 400);
        let result = apply(DynamicImage::ImageLuma8(img), 800);
        assert_eq!(result.width(), 800);
        assert_eq!(result.height(), 267);
    }

    #[test]
    fn upscales_to_target_width() {
        let img = GrayImage::new(100, 50);
        let result = apply(DynamicImage::ImageLuma8(img), 800);
        assert_eq!(result.width(), 800);
        assert_eq!(result.height(), 400);
    }

    #[test]
    fn matching_width_is_a_no_op() {
        let img = GrayImage::new(800, 123);
        let result = apply(DynamicImage::ImageLuma8(img), 800);
        assert_eq!(result.width(), 800);
        assert_eq!(result.height(), 123);
    }

    #[test]
    fn one_pixel_input_is_handled() {
        let img = GrayImage::new(1, 1);
        let result = apply(DynamicImage::ImageLuma8(img), 640);
        assert_eq!(result.width(), 640);
        assert_eq!(result.height(), 640);
    }

    #[test]
    fn extreme_aspect_ratio_keeps_height_at_least_one() {
        let img = GrayImage::new(4000, 2);
        let result = apply(DynamicImage::ImageLuma8(img), 100);
        assert_eq!(result.width(), 100);
        assert!(result.height() >= 1);
    }
}

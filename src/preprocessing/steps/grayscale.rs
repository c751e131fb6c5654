use image::DynamicImage;

/// Convert image to grayscale
/// This is the foundation for all other preprocessing steps
pub fn apply(image: DynamicImage) -> DynamicImage {
    DynamicImage::ImageLuma8(image.to_luma8())
}

use image::DynamicImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology::open;

/// Morphological opening with a 3x3 structuring element
/// Removes the speckle that adaptive thresholding leaves behind
pub fn apply(image: DynamicImage) -> DynamicImage {
    let gray = image.to_luma8();
    let cleaned = open(&gray, Norm::LInf, 1);
    DynamicImage::ImageLuma8(cleaned)
}

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::hough::{detect_lines, LineDetectionOptions, PolarLine};

/// Images smaller than this carry too little line evidence
const MIN_DIMENSION: u32 = 16;
/// Angles at or beyond this bound are treated as misdetections
const MAX_SKEW_DEGREES: f32 = 45.0;
/// Number of detected lines sampled for the angle estimate
const MAX_LINES: usize = 20;

/// Detect and correct small rotational misalignment
///
/// A working copy is binarized with Otsu's threshold so the ink votes in a
/// Hough line transform. The median angle of near-horizontal lines gives the
/// skew estimate; the image is rotated about its center when the estimate
/// exceeds `tolerance_deg` and is below the sanity bound. Sparse content,
/// tiny images and an empty line set all leave the image untouched.
pub fn apply(image: DynamicImage, tolerance_deg: f32) -> DynamicImage {
    let gray = image.to_luma8();
    let (width, height) = gray.dimensions();

    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return DynamicImage::ImageLuma8(gray);
    }

    let (ink, background) = binarize_for_lines(&gray);

    let options = LineDetectionOptions {
        vote_threshold: (width / 4).max(60),
        suppression_radius: 8,
    };
    let lines = detect_lines(&ink, options);

    let skew = match estimate_skew(&lines) {
        Some(angle) => angle,
        None => return DynamicImage::ImageLuma8(gray),
    };

    if skew.abs() < tolerance_deg || skew.abs() >= MAX_SKEW_DEGREES {
        return DynamicImage::ImageLuma8(gray);
    }

    tracing::debug!(skew, "Correcting skew");

    let rotated = rotate_about_center(
        &gray,
        (-skew).to_radians(),
        Interpolation::Bilinear,
        Luma([background]),
    );
    DynamicImage::ImageLuma8(rotated)
}

/// Binarize so that the minority intensity class (the ink) votes, and pick
/// the rotation fill value from the majority class.
fn binarize_for_lines(gray: &GrayImage) -> (GrayImage, u8) {
    let level = otsu_level(gray);
    let bright = threshold(gray, level, ThresholdType::Binary);

    let bright_pixels = bright.pixels().filter(|p| p.0[0] > 0).count();
    let total = (gray.width() * gray.height()) as usize;

    if bright_pixels * 2 <= total {
        // Bright minority is the ink, vote on it directly; fill with black
        (bright, 0)
    } else {
        // Bright background with dark ink: invert so the ink votes
        (threshold(gray, level, ThresholdType::BinaryInverted), 255)
    }
}

/// Median angle relative to horizontal among detected lines
///
/// A horizontal line has a Hough normal angle of 90 degrees, so the deviation
/// from 90 is the skew. Lines outside the ±45 degree band are ignored.
fn estimate_skew(lines: &[PolarLine]) -> Option<f32> {
    let mut angles: Vec<f32> = lines
        .iter()
        .map(|line| line.angle_in_degrees as f32 - 90.0)
        .filter(|delta| delta.abs() < MAX_SKEW_DEGREES)
        .take(MAX_LINES)
        .collect();

    if angles.is_empty() {
        return None;
    }

    angles.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = angles.len() / 2;
    let median = if angles.len() % 2 == 0 {
        (angles[mid - 1] + angles[mid]) / 2.0
    } else {
        angles[mid]
    };

    Some(median)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// White page with thick dark horizontal rules
    fn ruled_page(width: u32, height: u32) -> GrayImage {
        let mut img = GrayImage::from_pixel(width, height, Luma([255]));
        for &row in &[height / 4, height / 2, 3 * height / 4] {
            for x in width / 10..width - width / 10 {
                for dy in 0..2 {
                    img.put_pixel(x, (row + dy).min(height - 1), Luma([0]));
                }
            }
        }
        img
    }

    /// Measure the residual skew of an image with the same machinery the
    /// correction uses.
    fn measured_skew(gray: &GrayImage) -> Option<f32> {
        let (ink, _) = binarize_for_lines(gray);
        let options = LineDetectionOptions {
            vote_threshold: (gray.width() / 4).max(60),
            suppression_radius: 8,
        };
        estimate_skew(&detect_lines(&ink, options))
    }

    #[test]
    fn straight_page_is_left_untouched() {
        let img = ruled_page(400, 200);
        let result = apply(DynamicImage::ImageLuma8(img.clone()), 0.5);
        assert_eq!(result.to_luma8().as_raw(), img.as_raw());
    }

    #[test]
    fn blank_image_with_no_lines_is_a_no_op() {
        let img = GrayImage::from_pixel(200, 100, Luma([230]));
        let result = apply(DynamicImage::ImageLuma8(img.clone()), 0.5);
        assert_eq!(result.to_luma8().as_raw(), img.as_raw());
    }

    #[test]
    fn tiny_image_is_a_no_op() {
        let img = GrayImage::from_pixel(8, 8, Luma([0]));
        let result = apply(DynamicImage::ImageLuma8(img.clone()), 0.5);
        assert_eq!(result.to_luma8().as_raw(), img.as_raw());
    }

    #[test]
    fn rotated_page_is_corrected() {
        let straight = ruled_page(400, 200);
        let rotated = rotate_about_center(
            &straight,
            10.0_f32.to_radians(),
            Interpolation::Bilinear,
            Luma([255]),
        );

        let tilt = measured_skew(&rotated).expect("rotated rules should be detected");
        assert!(
            (tilt - 10.0).abs() <= 1.5,
            "expected ~10 degree tilt, measured {}",
            tilt
        );

        let corrected = apply(DynamicImage::ImageLuma8(rotated), 0.5);
        let residual = measured_skew(&corrected.to_luma8()).unwrap_or(0.0);
        assert!(
            residual.abs() <= 1.5,
            "residual skew {} degrees after correction",
            residual
        );
    }

    #[test]
    fn preserves_dimensions() {
        let img = ruled_page(300, 120);
        let result = apply(DynamicImage::ImageLuma8(img), 0.5);
        assert_eq!(result.width(), 300);
        assert_eq!(result.height(), 120);
    }

    #[test]
    fn estimate_ignores_vertical_lines() {
        let lines = vec![
            PolarLine {
                r: 50.0,
                angle_in_degrees: 0,
            },
            PolarLine {
                r: 80.0,
                angle_in_degrees: 92,
            },
            PolarLine {
                r: 120.0,
                angle_in_degrees: 94,
            },
        ];
        // Vertical line (angle 0) is out of the ±45 band around horizontal
        assert_eq!(estimate_skew(&lines), Some(3.0));
    }

    #[test]
    fn estimate_on_empty_set_is_none() {
        assert_eq!(estimate_skew(&[]), None);
    }
}

use image::{DynamicImage, GrayImage, Luma};

/// Apply inverted adaptive mean thresholding
///
/// For each pixel the threshold is the mean intensity of the surrounding
/// window minus a small bias. Pixels at or below the threshold (the ink)
/// become white, everything else black. Local statistics compensate for
/// uneven lighting across a photographed surface; the bias keeps flat
/// background regions from flickering into foreground.
pub fn apply(image: DynamicImage, window_size: u32, bias: i32) -> DynamicImage {
    let gray = image.to_luma8();
    let (width, height) = gray.dimensions();

    if width == 0 || height == 0 {
        return DynamicImage::ImageLuma8(gray);
    }

    let half_window = (window_size / 2) as i64;

    // Integral image for constant-time window sums
    let integral = integral_image(&gray);
    let stride = width as usize + 1;

    let binarized = GrayImage::from_fn(width, height, |x, y| {
        let x1 = (x as i64 - half_window).max(0) as usize;
        let y1 = (y as i64 - half_window).max(0) as usize;
        let x2 = (x as i64 + half_window + 1).min(width as i64) as usize;
        let y2 = (y as i64 + half_window + 1).min(height as i64) as usize;

        let area = ((x2 - x1) * (y2 - y1)) as i64;
        let sum = (integral[y2 * stride + x2] - integral[y1 * stride + x2]
            + integral[y1 * stride + x1]
            - integral[y2 * stride + x1]) as i64;
        let mean = sum / area;

        let pixel = gray.get_pixel(x, y).0[0] as i64;
        if pixel <= mean - bias as i64 {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    });

    DynamicImage::ImageLuma8(binarized)
}

/// Summed-area table with a zero-padded border, `(width+1) x (height+1)`
fn integral_image(img: &GrayImage) -> Vec<u64> {
    let (width, height) = img.dimensions();
    let stride = width as usize + 1;
    let mut table = vec![0u64; stride * (height as usize + 1)];

    for y in 0..height as usize {
        let mut row_sum = 0u64;
        for x in 0..width as usize {
            row_sum += img.get_pixel(x as u32, y as u32).0[0] as u64;
            table[(y + 1) * stride + x + 1] = row_sum + table[y * stride + x + 1];
        }
    }

    table
}

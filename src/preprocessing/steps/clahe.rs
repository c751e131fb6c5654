use image::{DynamicImage, GrayImage, Luma};

/// Apply contrast limited adaptive histogram equalization
///
/// The image is divided into a grid of tiles. Each tile gets its own
/// equalization lookup table built from a histogram clipped at
/// `clip_limit * tile_area / 256`, with the clipped excess redistributed
/// across all bins. Pixels are mapped by bilinearly blending the tables of
/// the four nearest tiles, which avoids visible tile seams.
pub fn apply(image: DynamicImage, clip_limit: f32, grid: u32) -> DynamicImage {
    let gray = image.to_luma8();
    let (width, height) = gray.dimensions();

    if width == 0 || height == 0 || grid == 0 || clip_limit <= 0.0 {
        return DynamicImage::ImageLuma8(gray);
    }

    let tiles_x = grid.min(width);
    let tiles_y = grid.min(height);

    // Per-tile lookup tables. Tile bounds come from even division so edge
    // tiles are never empty.
    let mut luts = vec![[0u8; 256]; (tiles_x * tiles_y) as usize];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * width / tiles_x;
            let x1 = (tx + 1) * width / tiles_x;
            let y0 = ty * height / tiles_y;
            let y1 = (ty + 1) * height / tiles_y;

            let mut histogram = [0u32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    histogram[gray.get_pixel(x, y).0[0] as usize] += 1;
                }
            }

            let area = (x1 - x0) * (y1 - y0);
            luts[(ty * tiles_x + tx) as usize] = build_lut(&histogram, area, clip_limit);
        }
    }

    let equalized = GrayImage::from_fn(width, height, |x, y| {
        let value = gray.get_pixel(x, y).0[0] as usize;

        // Position in tile-index space, clamped so border pixels use the
        // nearest tile's table.
        let fx = ((x as f32 + 0.5) * tiles_x as f32 / width as f32 - 0.5)
            .clamp(0.0, (tiles_x - 1) as f32);
        let fy = ((y as f32 + 0.5) * tiles_y as f32 / height as f32 - 0.5)
            .clamp(0.0, (tiles_y - 1) as f32);

        let ix0 = fx as u32;
        let iy0 = fy as u32;
        let ix1 = (ix0 + 1).min(tiles_x - 1);
        let iy1 = (iy0 + 1).min(tiles_y - 1);
        let wx = fx - ix0 as f32;
        let wy = fy - iy0 as f32;

        let lut = |tx: u32, ty: u32| luts[(ty * tiles_x + tx) as usize][value] as f32;

        let top = (1.0 - wx) * lut(ix0, iy0) + wx * lut(ix1, iy0);
        let bottom = (1.0 - wx) * lut(ix0, iy1) + wx * lut(ix1, iy1);
        let blended = (1.0 - wy) * top + wy * bottom;

        Luma([blended.round().clamp(0.0, 255.0) as u8])
    });

    DynamicImage::ImageLuma8(equalized)
}

/// Clip the histogram, redistribute the excess, and build the equalization
/// lookup table from the resulting cumulative distribution.
fn build_lut(histogram: &[u32; 256], area: u32, clip_limit: f32) -> [u8; 256] {
    let mut histogram = *histogram;
    let limit = ((clip_limit * area as f32 / 256.0).ceil() as u32).max(1);

    let mut excess = 0u32;
    for count in histogram.iter_mut() {
        if *count > limit {
            excess += *count - limit;
            *count = limit;
        }
    }

    // Spread the excess evenly; the remainder goes to the lowest bins so the
    // total pixel mass is conserved.
    let bonus = excess / 256;
    let remainder = excess % 256;
    for (i, count) in histogram.iter_mut().enumerate() {
        *count += bonus + u32::from((i as u32) < remainder);
    }

    let mut lut = [0u8; 256];
    let mut cdf = 0u64;
    for (i, &count) in histogram.iter().enumerate() {
        cdf += count as u64;
        lut[i] = ((cdf * 255 + area as u64 / 2) / area as u64).min(255) as u8;
    }
    lut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_image_stays_close_to_its_value() {
        let img = GrayImage::from_pixel(256, 256, Luma([128]));
        let result = apply(DynamicImage::ImageLuma8(img), 2.0, 8);
        let gray = result.to_luma8();

        for pixel in gray.pixels() {
            let diff = (pixel.0[0] as i32 - 128).abs();
            assert!(diff <= 8, "uniform value drifted by {}", diff);
        }
    }

    #[test]
    fn low_contrast_gradient_gets_stretched() {
        // Values 100..150 across the image
        let img = GrayImage::from_fn(256, 256, |x, _| Luma([(100 + x * 50 / 256) as u8]));
        let input_range = 50;

        let result = apply(DynamicImage::ImageLuma8(img), 40.0, 8);
        let gray = result.to_luma8();

        let min = gray.pixels().map(|p| p.0[0]).min().unwrap();
        let max = gray.pixels().map(|p| p.0[0]).max().unwrap();
        assert!(
            (max - min) as i32 > input_range,
            "expected stretch beyond {}, got {}",
            input_range,
            max - min
        );
    }

    #[test]
    fn preserves_dimensions() {
        let img = GrayImage::new(123, 45);
        let result = apply(DynamicImage::ImageLuma8(img), 2.0, 8);
        assert_eq!(result.width(), 123);
        assert_eq!(result.height(), 45);
    }

    #[test]
    fn tiny_images_do_not_panic() {
        for (w, h) in [(1, 1), (3, 7), (8, 2)] {
            let img = GrayImage::from_pixel(w, h, Luma([90]));
            let result = apply(DynamicImage::ImageLuma8(img), 2.0, 8);
            assert_eq!(result.width(), w);
            assert_eq!(result.height(), h);
        }
    }

    #[test]
    fn lut_conserves_pixel_mass() {
        let mut histogram = [0u32; 256];
        histogram[128] = 1024;
        let lut = build_lut(&histogram, 1024, 2.0);

        // The mapped value for the single populated bin sits near the middle
        // of the range: clipping pushed most mass into a flat ramp.
        assert!((lut[128] as i32 - 128).abs() <= 8);
        // Lookup table is monotonic
        for i in 1..256 {
            assert!(lut[i] >= lut[i - 1]);
        }
    }
}

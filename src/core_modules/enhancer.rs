// THEORY:
// The `enhancer` is the preprocessing stage: it turns the grayscale ROI into
// a clean binary bitmap where digit ink is foreground (255) and everything
// else is background (0). Four passes, each consuming the previous one:
//
// 1.  **Local contrast**: tile-based histogram equalization (CLAHE) lifts
//     dim or faded segments without blowing out noise the way a global
//     equalization would. Implemented here with the standard semantics -
//     per-tile clipped histograms, excess redistribution, and bilinear
//     interpolation between neighboring tile LUTs.
// 2.  **Adaptive threshold**: each pixel is compared against a Gaussian
//     weighted mean of its neighborhood minus a small offset, producing an
//     inverted binary image. Local thresholds survive uneven lighting where
//     a single global threshold cannot.
// 3.  **Morphology**: a close fills hairline gaps inside segment strokes,
//     then an open removes isolated specks, both with a 3x3 element.
// 4.  **Median filter**: a final 3x3 denoise pass.
//
// The stage is stateless and deterministic: the output depends only on the
// input pixels and the config, and always has the input's dimensions.

use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::filter::{gaussian_blur_f32, median_filter};
use imageproc::morphology::{close, open};

/// Tuning knobs for the binarization passes. Defaults are the tuned values.
#[derive(Debug, Clone)]
pub struct EnhancerConfig {
    /// CLAHE contrast clip limit.
    pub clip_limit: f64,
    /// CLAHE tile grid, columns x rows.
    pub tile_grid: (u32, u32),
    /// Side length of the adaptive-threshold neighborhood, in pixels. Odd.
    pub block_size: u32,
    /// Constant subtracted from the local mean before comparing.
    pub threshold_offset: i16,
    /// Radius of the morphological structuring element (1 = 3x3).
    pub morph_radius: u8,
    /// Radius of the final median filter (1 = 3x3).
    pub median_radius: u32,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            clip_limit: 3.0,
            tile_grid: (8, 8),
            block_size: 15,
            threshold_offset: 5,
            morph_radius: 1,
            median_radius: 1,
        }
    }
}

/// Converts a grayscale region into an inverted binary bitmap of the same
/// dimensions (ink = 255, background = 0).
pub fn enhance(gray: &GrayImage, config: &EnhancerConfig) -> GrayImage {
    let equalized = clahe(gray, config.clip_limit, config.tile_grid);
    let binary = adaptive_threshold_inv(&equalized, config.block_size, config.threshold_offset);
    let closed = close(&binary, Norm::LInf, config.morph_radius);
    let opened = open(&closed, Norm::LInf, config.morph_radius);
    median_filter(&opened, config.median_radius, config.median_radius)
}

/// Contrast-limited adaptive histogram equalization.
///
/// Each tile gets a lookup table built from its clipped histogram; pixels are
/// mapped through a bilinear blend of the four surrounding tile tables so
/// tile seams stay invisible.
pub fn clahe(image: &GrayImage, clip_limit: f64, grid: (u32, u32)) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let tile_w = width.div_ceil(grid.0.max(1)).max(1);
    let tile_h = height.div_ceil(grid.1.max(1)).max(1);
    let tiles_x = width.div_ceil(tile_w);
    let tiles_y = height.div_ceil(tile_h);

    // --- 1. Per-tile lookup tables ---
    let mut luts = vec![[0u8; 256]; (tiles_x * tiles_y) as usize];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);

            let mut hist = [0.0f64; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    hist[image.get_pixel(x, y)[0] as usize] += 1.0;
                }
            }

            let area = ((x1 - x0) * (y1 - y0)) as f64;
            let clip = (clip_limit * area / 256.0).max(1.0);
            let mut excess = 0.0;
            for bin in hist.iter_mut() {
                if *bin > clip {
                    excess += *bin - clip;
                    *bin = clip;
                }
            }
            // Redistribute the clipped mass evenly across all bins.
            let increment = excess / 256.0;

            let scale = 255.0 / area;
            let lut = &mut luts[(ty * tiles_x + tx) as usize];
            let mut cumulative = 0.0;
            for (value, bin) in hist.iter().enumerate() {
                cumulative += bin + increment;
                lut[value] = (cumulative * scale).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    // --- 2. Bilinear interpolation between tile tables ---
    let max_tx = (tiles_x - 1) as f64;
    let max_ty = (tiles_y - 1) as f64;
    let mut output = GrayImage::new(width, height);
    for (x, y, pixel) in image.enumerate_pixels() {
        let gx = ((x as f64 + 0.5) / tile_w as f64 - 0.5).clamp(0.0, max_tx);
        let gy = ((y as f64 + 0.5) / tile_h as f64 - 0.5).clamp(0.0, max_ty);
        let tx0 = gx.floor() as u32;
        let ty0 = gy.floor() as u32;
        let tx1 = (tx0 + 1).min(tiles_x - 1);
        let ty1 = (ty0 + 1).min(tiles_y - 1);
        let fx = gx - tx0 as f64;
        let fy = gy - ty0 as f64;

        let v = pixel[0] as usize;
        let lut_at = |tx: u32, ty: u32| luts[(ty * tiles_x + tx) as usize][v] as f64;
        let top = lut_at(tx0, ty0) * (1.0 - fx) + lut_at(tx1, ty0) * fx;
        let bottom = lut_at(tx0, ty1) * (1.0 - fx) + lut_at(tx1, ty1) * fx;
        let blended = top * (1.0 - fy) + bottom * fy;
        output.put_pixel(x, y, image::Luma([blended.round().clamp(0.0, 255.0) as u8]));
    }
    output
}

/// Gaussian-weighted adaptive threshold with inverted output: a pixel becomes
/// foreground when it is darker than its local mean by at least `offset`.
pub fn adaptive_threshold_inv(image: &GrayImage, block_size: u32, offset: i16) -> GrayImage {
    // Sigma matched to the block size the same way OpenCV derives it from a
    // Gaussian kernel size.
    let sigma = 0.3 * ((block_size.max(3) - 1) as f32 * 0.5 - 1.0) + 0.8;
    let local_mean = gaussian_blur_f32(image, sigma);

    let mut output = GrayImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let threshold = local_mean.get_pixel(x, y)[0] as i16 - offset;
        let value = if (pixel[0] as i16) <= threshold { 255 } else { 0 };
        output.put_pixel(x, y, image::Luma([value]));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, image::Luma([value]))
    }

    #[test]
    fn output_dimensions_match_input() {
        let gray = uniform(57, 33, 128);
        let binary = enhance(&gray, &EnhancerConfig::default());
        assert_eq!(binary.dimensions(), (57, 33));
    }

    #[test]
    fn uniform_region_has_no_foreground() {
        let gray = uniform(64, 64, 180);
        let binary = enhance(&gray, &EnhancerConfig::default());
        assert!(binary.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn enhancement_is_deterministic() {
        let mut gray = uniform(48, 48, 200);
        for y in 10..40 {
            for x in 20..28 {
                gray.put_pixel(x, y, image::Luma([25]));
            }
        }
        let first = enhance(&gray, &EnhancerConfig::default());
        let second = enhance(&gray, &EnhancerConfig::default());
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn dark_stroke_on_light_background_becomes_foreground() {
        let mut gray = uniform(64, 64, 200);
        for y in 8..56 {
            for x in 28..36 {
                gray.put_pixel(x, y, image::Luma([20]));
            }
        }
        let binary = enhance(&gray, &EnhancerConfig::default());
        assert_eq!(binary.get_pixel(32, 32)[0], 255, "stroke center is ink");
        assert_eq!(binary.get_pixel(2, 2)[0], 0, "far background stays empty");
    }

    #[test]
    fn binary_output_is_two_valued() {
        let mut gray = uniform(40, 40, 190);
        for x in 10..30 {
            gray.put_pixel(x, 20, image::Luma([30]));
            gray.put_pixel(x, 21, image::Luma([30]));
            gray.put_pixel(x, 22, image::Luma([30]));
        }
        let binary = enhance(&gray, &EnhancerConfig::default());
        assert!(binary.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn clahe_preserves_relative_brightness() {
        let mut gray = uniform(64, 64, 220);
        for y in 20..44 {
            for x in 20..44 {
                gray.put_pixel(x, y, image::Luma([40]));
            }
        }
        let equalized = clahe(&gray, 3.0, (8, 8));
        assert!(equalized.get_pixel(32, 32)[0] < equalized.get_pixel(2, 2)[0]);
    }
}

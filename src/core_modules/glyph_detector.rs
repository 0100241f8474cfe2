// THEORY:
// The `glyph_detector` is the spatial stage: it takes the binary bitmap from
// the enhancer and proposes "glyphs" - connected ink blobs that plausibly
// are single digits. It is a stateless find-then-filter pass:
//
// 1.  **Contour extraction**: only outermost borders are traced. Nested
//     contours (the holes inside a 0 or an 8) belong to a digit that is
//     already represented by its outer border, so they are ignored.
// 2.  **Geometric filtering**: each candidate is cut on enclosed area,
//     aspect ratio, and height relative to the ROI. Digits on a segmented
//     display are tall-ish rectangles of a predictable size; specks, glare
//     streaks and the display bezel all fall outside these bounds.
// 3.  **Reading order**: survivors are sorted by their left edge so the
//     downstream assembler can concatenate digits left to right.
//
// An empty result is a normal outcome ("no display in frame"), not an error.

use image::GrayImage;
use imageproc::contours::{BorderType, Contour, find_contours};
use imageproc::point::Point;

use crate::core_modules::region::Region;

/// Bounds a blob must satisfy to count as a digit glyph. Defaults are the
/// tuned values; all comparisons are strict.
#[derive(Debug, Clone)]
pub struct GlyphFilterConfig {
    pub min_area: f64,
    pub max_area: f64,
    pub min_aspect: f64,
    pub max_aspect: f64,
    /// Minimum glyph height as a fraction of the ROI height.
    pub min_height_fraction: f64,
}

impl Default for GlyphFilterConfig {
    fn default() -> Self {
        Self {
            min_area: 300.0,
            max_area: 8000.0,
            min_aspect: 0.35,
            max_aspect: 0.9,
            min_height_fraction: 0.15,
        }
    }
}

/// A connected ink blob hypothesized to be one digit, in ROI-local
/// coordinates. Produced and consumed within a single frame.
#[derive(Debug, Clone)]
pub struct GlyphCandidate {
    /// Tight bounding box around the blob.
    pub bounds: Region,
    /// Area enclosed by the outer border, in pixel units.
    pub area: f64,
}

/// Finds digit-shaped blobs in a binary bitmap, ordered left to right.
pub fn find_glyphs(binary: &GrayImage, config: &GlyphFilterConfig) -> Vec<GlyphCandidate> {
    let roi_height = binary.height();
    let mut glyphs: Vec<GlyphCandidate> = find_contours::<i32>(binary)
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer)
        .filter_map(|contour| candidate_from_contour(&contour))
        .filter(|glyph| passes_filter(glyph, roi_height, config))
        .collect();

    glyphs.sort_by_key(|glyph| glyph.bounds.x);
    glyphs
}

fn candidate_from_contour(contour: &Contour<i32>) -> Option<GlyphCandidate> {
    let bounds = bounding_region(&contour.points)?;
    Some(GlyphCandidate {
        bounds,
        area: enclosed_area(&contour.points),
    })
}

/// Tight bounding box over a traced border.
fn bounding_region(points: &[Point<i32>]) -> Option<Region> {
    let first = points.first()?;
    let (mut min_x, mut max_x) = (first.x, first.x);
    let (mut min_y, mut max_y) = (first.y, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    Some(Region::new(
        min_x as u32,
        min_y as u32,
        (max_x - min_x + 1) as u32,
        (max_y - min_y + 1) as u32,
    ))
}

/// Shoelace area of the polygon traced by the border points.
fn enclosed_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut doubled: i64 = 0;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        doubled += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    (doubled.abs() as f64) / 2.0
}

fn passes_filter(glyph: &GlyphCandidate, roi_height: u32, config: &GlyphFilterConfig) -> bool {
    let aspect = glyph.bounds.aspect_ratio();
    glyph.area > config.min_area
        && glyph.area < config.max_area
        && aspect > config.min_aspect
        && aspect < config.max_aspect
        && glyph.bounds.height as f64 > roi_height as f64 * config.min_height_fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn fill(image: &mut GrayImage, x0: u32, y0: u32, width: u32, height: u32) {
        for y in y0..y0 + height {
            for x in x0..x0 + width {
                image.put_pixel(x, y, Luma([255]));
            }
        }
    }

    fn glyph_with(area: f64, width: u32, height: u32) -> GlyphCandidate {
        GlyphCandidate {
            bounds: Region::new(0, 0, width, height),
            area,
        }
    }

    #[test]
    fn area_bounds_are_strict() {
        let config = GlyphFilterConfig::default();
        assert!(!passes_filter(&glyph_with(250.0, 20, 40), 100, &config));
        assert!(!passes_filter(&glyph_with(300.0, 20, 40), 100, &config));
        assert!(passes_filter(&glyph_with(301.0, 20, 40), 100, &config));
        assert!(!passes_filter(&glyph_with(8000.0, 20, 40), 100, &config));
    }

    #[test]
    fn aspect_bounds_are_strict() {
        let config = GlyphFilterConfig::default();
        // 90x100 is exactly 0.9 and must be rejected; 89x100 passes.
        assert!(!passes_filter(&glyph_with(2000.0, 90, 100), 400, &config));
        assert!(passes_filter(&glyph_with(2000.0, 89, 100), 400, &config));
        // 35x100 is exactly 0.35 and must be rejected.
        assert!(!passes_filter(&glyph_with(2000.0, 35, 100), 400, &config));
        assert!(passes_filter(&glyph_with(2000.0, 36, 100), 400, &config));
    }

    #[test]
    fn short_blobs_are_rejected() {
        let config = GlyphFilterConfig::default();
        // Height 15 on a 100-tall ROI is exactly the 0.15 fraction: rejected.
        assert!(!passes_filter(&glyph_with(500.0, 10, 15), 100, &config));
        assert!(passes_filter(&glyph_with(500.0, 10, 16), 100, &config));
    }

    #[test]
    fn detects_a_digit_sized_rectangle() {
        let mut binary = GrayImage::new(100, 100);
        fill(&mut binary, 5, 5, 20, 40);
        let glyphs = find_glyphs(&binary, &GlyphFilterConfig::default());
        assert_eq!(glyphs.len(), 1);
        assert_eq!(glyphs[0].bounds, Region::new(5, 5, 20, 40));
        assert!(glyphs[0].area > 300.0 && glyphs[0].area < 8000.0);
    }

    #[test]
    fn inner_borders_are_ignored() {
        // A hollow rectangle produces an outer border and a hole border; only
        // the outer one may become a candidate.
        let mut binary = GrayImage::new(100, 100);
        fill(&mut binary, 10, 10, 24, 48);
        for y in 16..52 {
            for x in 16..28 {
                binary.put_pixel(x, y, Luma([0]));
            }
        }
        let glyphs = find_glyphs(&binary, &GlyphFilterConfig::default());
        assert_eq!(glyphs.len(), 1);
        assert_eq!(glyphs[0].bounds, Region::new(10, 10, 24, 48));
    }

    #[test]
    fn survivors_come_out_left_to_right() {
        let mut binary = GrayImage::new(160, 100);
        fill(&mut binary, 100, 10, 20, 40);
        fill(&mut binary, 10, 10, 20, 40);
        fill(&mut binary, 55, 10, 20, 40);
        let glyphs = find_glyphs(&binary, &GlyphFilterConfig::default());
        let lefts: Vec<u32> = glyphs.iter().map(|g| g.bounds.x).collect();
        assert_eq!(lefts, vec![10, 55, 100]);
    }

    #[test]
    fn speck_noise_is_filtered_out() {
        let mut binary = GrayImage::new(100, 100);
        fill(&mut binary, 50, 50, 4, 4);
        assert!(find_glyphs(&binary, &GlyphFilterConfig::default()).is_empty());
    }
}

// THEORY:
// The `overlay` module is the cosmetic seam between the pipeline and the
// rendering collaborator. It knows how to draw the pipeline's outputs onto a
// color frame - the ROI guide the user aligns the display against, framing
// guidelines for distance, boxes around recognized glyphs, and a "stable"
// marker - and nothing else. No recognition logic lives here, and the
// pipeline never calls it; the frame owner decides what to draw.
//
// Text rendering (the reading itself, instructions) needs font assets and
// stays with the embedding application.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::core_modules::region::Region;

const GUIDE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const GLYPH_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const GUIDELINE_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const STABLE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Draws the ROI guide rectangle, two pixels thick.
pub fn draw_roi_guide(frame: &mut RgbImage, roi: &Region) {
    draw_thick_rect(frame, roi.to_rect(), GUIDE_COLOR);
}

/// Draws the framing guidelines: a center vertical and the optimal-distance
/// band at 40% of the frame height, plus/minus 3%.
pub fn draw_guidelines(frame: &mut RgbImage) {
    let (width, height) = frame.dimensions();
    let center_x = width as f32 / 2.0;
    draw_line_segment_mut(
        frame,
        (center_x, 0.0),
        (center_x, height as f32),
        GUIDELINE_COLOR,
    );

    let optimal = height as f32 * 0.4;
    let tolerance = height as f32 * 0.03;
    for y in [optimal - tolerance, optimal + tolerance] {
        draw_line_segment_mut(frame, (0.0, y), (width as f32, y), GUIDELINE_COLOR);
    }
}

/// Highlights each recognized glyph with a box, two pixels thick.
pub fn draw_glyph_boxes(frame: &mut RgbImage, boxes: &[Region]) {
    for region in boxes {
        draw_thick_rect(frame, region.to_rect(), GLYPH_COLOR);
    }
}

/// Draws the filled "reading is stable" indicator near the top-right corner.
pub fn draw_stable_marker(frame: &mut RgbImage) {
    let x = frame.width() as i32 - 50;
    draw_filled_circle_mut(frame, (x, 50), 20, STABLE_COLOR);
}

fn draw_thick_rect(frame: &mut RgbImage, rect: Rect, color: Rgb<u8>) {
    draw_hollow_rect_mut(frame, rect, color);
    if rect.width() > 2 && rect.height() > 2 {
        let inner = Rect::at(rect.left() + 1, rect.top() + 1)
            .of_size(rect.width() - 2, rect.height() - 2);
        draw_hollow_rect_mut(frame, inner, color);
    }
}

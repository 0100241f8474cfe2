// THEORY:
// The `digit_recognizer` turns one glyph bitmap into a digit. Every glyph is
// first normalized to a canonical 30x45 grid so that all geometry below can
// be expressed against fixed coordinates.
//
// Recognition runs in three tiers:
// 1.  **Fast paths**: 1 and 7 have such lopsided ink distributions that a
//     handful of column/band pixel counts identifies them without sampling
//     any segments.
// 2.  **Segment sampling**: seven fixed sub-rectangles of the grid (the
//     strokes of a segmented display) are each reduced to a coverage ratio,
//     weighted, and thresholded into an on/off state.
// 3.  **Pattern scoring**: the on/off vector is scored against eleven
//     registered patterns (digits 0-9, with two variants of 7). A matched
//     lit segment contributes its ratio, a matched dark segment a flat 0.3,
//     and each pattern adds one hand-tuned structural bonus. The best score
//     wins only if it clears the acceptance threshold; otherwise the glyph
//     is unrecognized and the caller skips it.
//
// The segment table, pattern table, and every bonus magnitude are tuned
// empirical constants kept verbatim for compatibility - including their
// quirks - rather than re-derived.

use image::imageops::{FilterType, resize};
use image::GrayImage;

/// Canonical glyph grid width.
pub const GRID_WIDTH: u32 = 30;
/// Canonical glyph grid height.
pub const GRID_HEIGHT: u32 = 45;

/// One stroke of the display: a fixed sub-rectangle of the canonical grid
/// plus the weight applied to its coverage ratio.
#[derive(Debug, Clone, Copy)]
pub struct SegmentDefinition {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub weight: f64,
}

const fn seg(x: u32, y: u32, width: u32, height: u32, weight: f64) -> SegmentDefinition {
    SegmentDefinition { x, y, width, height, weight }
}

/// The seven strokes, indexed top, upper-left, upper-right, middle,
/// lower-left, lower-right, bottom.
pub const SEGMENTS: [SegmentDefinition; 7] = [
    seg(8, 0, 14, 3, 1.2),
    seg(2, 3, 3, 18, 1.0),
    seg(25, 3, 3, 18, 1.0),
    seg(8, 21, 14, 3, 1.2),
    seg(2, 24, 3, 18, 1.0),
    seg(25, 24, 3, 18, 1.0),
    seg(8, 42, 14, 3, 1.2),
];

/// A registered lit-segment pattern and the digit it stands for.
#[derive(Debug, Clone, Copy)]
struct DigitPattern {
    digit: u8,
    segments: [bool; 7],
}

const fn pat(digit: u8, segments: [bool; 7]) -> DigitPattern {
    DigitPattern { digit, segments }
}

// Eleven rows: 0-6, two variants of 7 (with and without the upper-left
// stroke), 8, 9. Both 7 rows map back to digit 7.
const PATTERNS: [DigitPattern; 11] = [
    pat(0, [true, true, true, false, true, true, true]),
    pat(1, [false, false, true, false, false, true, false]),
    pat(2, [true, false, true, true, true, false, true]),
    pat(3, [true, false, true, true, false, true, true]),
    pat(4, [false, true, true, true, false, true, false]),
    pat(5, [true, true, false, true, false, true, true]),
    pat(6, [true, true, false, true, true, true, true]),
    pat(7, [true, true, true, false, false, true, false]),
    pat(7, [true, false, true, false, false, true, false]),
    pat(8, [true, true, true, true, true, true, true]),
    pat(9, [true, true, true, true, false, true, true]),
];

/// Scoring knobs. Defaults are the tuned values.
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    /// A segment counts as lit when its weighted coverage exceeds this.
    pub active_threshold: f64,
    /// Best pattern score must strictly exceed this to be accepted.
    pub accept_score: f64,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self { active_threshold: 0.4, accept_score: 2.0 }
    }
}

/// Per-glyph sampling result: lit flags and weighted coverage ratios for the
/// seven segments.
#[derive(Debug, Clone)]
pub struct SegmentState {
    pub active: [bool; 7],
    pub ratios: [f64; 7],
}

/// Classifies one glyph bitmap. `None` means the glyph is unrecognizable and
/// must be skipped by the assembler, never replaced with a placeholder.
pub fn classify(glyph: &GrayImage, config: &RecognizerConfig) -> Option<u8> {
    let normalized = normalize(glyph);

    // Fast paths bypass segment sampling entirely.
    if is_one(&normalized) {
        return Some(1);
    }
    if is_seven(&normalized) {
        return Some(7);
    }

    let state = analyze_segments(&normalized, config.active_threshold);
    map_segments_to_digit(&state, config.accept_score)
}

/// Resizes a glyph to the canonical grid. Nearest neighbor keeps the bitmap
/// strictly two-valued.
fn normalize(glyph: &GrayImage) -> GrayImage {
    resize(glyph, GRID_WIDTH, GRID_HEIGHT, FilterType::Nearest)
}

/// Foreground count inside a sub-rectangle of the grid.
fn count_foreground(grid: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) -> u32 {
    let mut count = 0;
    for y in y0..y1 {
        for x in x0..x1 {
            if grid.get_pixel(x, y)[0] > 0 {
                count += 1;
            }
        }
    }
    count
}

/// A 1 is a heavy right third with a nearly empty left third.
fn is_one(grid: &GrayImage) -> bool {
    let (w, h) = grid.dimensions();
    let right = count_foreground(grid, 2 * w / 3, 0, w, h);
    let left = count_foreground(grid, 0, 0, w / 3, h);
    (right as f64) > h as f64 * 0.6 && (left as f64) < h as f64 * 0.2
}

/// A 7 adds a loaded top band to the right-heavy profile.
fn is_seven(grid: &GrayImage) -> bool {
    let (w, h) = grid.dimensions();
    let top = count_foreground(grid, 0, 0, w, h / 4);
    let right = count_foreground(grid, 2 * w / 3, 0, w, h);
    let left = count_foreground(grid, 0, 0, w / 3, h);
    (top as f64) > w as f64 * 0.6
        && (right as f64) > h as f64 * 0.5
        && (left as f64) < h as f64 * 0.3
}

/// Samples all seven segment rectangles on the canonical grid.
pub fn analyze_segments(grid: &GrayImage, active_threshold: f64) -> SegmentState {
    let mut active = [false; 7];
    let mut ratios = [0.0f64; 7];
    for (index, segment) in SEGMENTS.iter().enumerate() {
        let lit = count_foreground(
            grid,
            segment.x,
            segment.y,
            segment.x + segment.width,
            segment.y + segment.height,
        );
        let total = (segment.width * segment.height) as f64;
        ratios[index] = lit as f64 / total * segment.weight;
        active[index] = ratios[index] > active_threshold;
    }
    SegmentState { active, ratios }
}

/// Scores the segment state against every registered pattern and returns the
/// winning digit, provided the best score strictly clears `accept_score`.
pub fn map_segments_to_digit(state: &SegmentState, accept_score: f64) -> Option<u8> {
    best_candidate(state).filter(|(_, score)| *score > accept_score).map(|(digit, _)| digit)
}

/// The highest-scoring pattern and its score, before the acceptance cut.
pub(crate) fn best_candidate(state: &SegmentState) -> Option<(u8, f64)> {
    let active = &state.active;
    let mut best: Option<(u8, f64)> = None;

    for (index, pattern) in PATTERNS.iter().enumerate() {
        let mut score = 0.0;
        let mut matches = 0;
        for i in 0..7 {
            if pattern.segments[i] == active[i] {
                matches += 1;
                score += if active[i] { state.ratios[i] } else { 0.3 };
            }
        }

        // One structural bonus per pattern, keyed by table row.
        score += match index {
            0 if matches >= 6
                && !active[3]
                && ((active[1] && active[2]) || (active[4] && active[5])) =>
            {
                4.0
            }
            7 | 8
                if active[0]
                    && active[2]
                    && active[5]
                    && !active[3]
                    && !active[6]
                    && active[1] == pattern.segments[1] =>
            {
                4.5
            }
            1 if active[2] && active[5] && !active[0] && !active[4] => 4.0,
            2 if matches >= 5 && active[3] => 2.5,
            3 if active[0] && active[3] && active[6] => 2.5,
            4 if active[2] && active[3] && active[5] => 2.5,
            5 if active[1] && active[3] && active[5] => 2.5,
            6 if matches >= 6 && active[4] => 2.5,
            9 if matches >= 7 => 4.0,
            10 if matches >= 6 && !active[4] => 3.5,
            _ => 0.0,
        };

        let beats_current = match best {
            Some((_, best_score)) => score > best_score,
            None => score > 0.0,
        };
        if beats_current {
            best = Some((pattern.digit, score));
        }
    }

    best
}

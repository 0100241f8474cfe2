// THEORY:
// The `pipeline` module is the top-level API for the whole recognition
// engine. It encapsulates the six stages into one struct with a single
// per-frame entry point, so an embedding application only ever hands in a
// grayscale frame and receives a `FrameReport` back.
//
// Control flows strictly forward through the stages once per frame:
//
//   ROI locate -> enhance -> detect glyphs -> classify -> assemble -> debounce
//
// The only state that survives between frames is the cached ROI rectangle
// and the stabilizer window; both live inside `DisplayPipeline` with no
// external mutation path, which keeps the single-threaded invariant easy to
// audit. Every intermediate bitmap is owned by the current call and dropped
// on every exit path, so a tight camera loop cannot accumulate per-frame
// allocations.
//
// A frame either completes the pipeline or fails as a whole: faults are
// surfaced as `PipelineError` at this boundary, the caller logs and skips
// the frame, and the cross-frame state is left exactly as it was.

use image::GrayImage;
use image::imageops::crop_imm;
use thiserror::Error;

use crate::core_modules::digit_recognizer::{self, RecognizerConfig};
use crate::core_modules::enhancer::{self, EnhancerConfig};
use crate::core_modules::glyph_detector::{self, GlyphFilterConfig};
use crate::core_modules::roi_locator::{RoiConfig, RoiLocator};
use crate::core_modules::stabilizer::{NumberStabilizer, StabilizerConfig};

// Re-export the shared geometry type for the public API.
pub use crate::core_modules::region::Region;

/// Tunable parameters for every stage, aggregated. `Default` carries the
/// tuned constants throughout.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub roi: RoiConfig,
    pub enhancer: EnhancerConfig,
    pub detector: GlyphFilterConfig,
    pub recognizer: RecognizerConfig,
    pub stabilizer: StabilizerConfig,
}

/// The primary output of the pipeline for a single frame, addressed to the
/// rendering collaborator.
#[derive(Debug, Clone)]
pub struct FrameReport {
    /// The display region, for guide drawing.
    pub roi: Region,
    /// Absolute bounding boxes of the recognized glyphs, for highlighting.
    pub glyph_boxes: Vec<Region>,
    /// The candidate number string assembled this frame. Empty when nothing
    /// was recognized - a normal outcome, not an error.
    pub reading: String,
    /// True once the debounce window unanimously agrees with `reading`.
    pub is_stable: bool,
    /// True when no blob survived glyph filtering, for the instructional
    /// "place the display in frame" overlay.
    pub display_missing: bool,
}

/// A fault that abandons the current frame. Never fatal to the pipeline:
/// the caller logs it, skips the frame, and keeps going.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("display region {roi:?} does not fit inside a {width}x{height} frame")]
    RegionOutOfFrame { roi: Region, width: u32, height: u32 },
    #[error("display region has zero area")]
    EmptyRegion,
}

/// The recognition engine. One instance per camera stream, fed frames
/// strictly sequentially.
pub struct DisplayPipeline {
    config: PipelineConfig,
    roi_locator: RoiLocator,
    stabilizer: NumberStabilizer,
}

impl DisplayPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let roi_locator = RoiLocator::new(config.roi.clone());
        let stabilizer = NumberStabilizer::new(config.stabilizer.clone());
        Self { config, roi_locator, stabilizer }
    }

    /// Runs all six stages over one grayscale frame.
    ///
    /// `Err` means the whole frame was abandoned; the ROI cache and the
    /// debounce window are untouched in that case.
    pub fn process_frame(&mut self, gray: &GrayImage) -> Result<FrameReport, PipelineError> {
        let (frame_width, frame_height) = gray.dimensions();

        // Stage 1: ROI selection (computed once, cached for the session).
        let roi = self.roi_locator.locate(frame_height, frame_width);
        if roi.is_empty() {
            return Err(PipelineError::EmptyRegion);
        }
        if !roi.fits_within(frame_width, frame_height) {
            return Err(PipelineError::RegionOutOfFrame {
                roi,
                width: frame_width,
                height: frame_height,
            });
        }

        // Stage 2: binarization of the region.
        let region = crop_imm(gray, roi.x, roi.y, roi.width, roi.height).to_image();
        let binary = enhancer::enhance(&region, &self.config.enhancer);

        // Stages 3-5: glyph detection, classification, assembly.
        let glyphs = glyph_detector::find_glyphs(&binary, &self.config.detector);
        let display_missing = glyphs.is_empty();
        let (reading, local_boxes) = self.read_glyphs(&binary, &glyphs);
        let glyph_boxes: Vec<Region> =
            local_boxes.iter().map(|b| b.translated(roi.x, roi.y)).collect();

        log::debug!(
            "frame {frame_width}x{frame_height}: {} candidates, reading \"{reading}\"",
            glyphs.len(),
        );

        // Stage 6: debouncing. Empty readings never enter the window.
        let is_stable = if reading.is_empty() {
            false
        } else {
            self.stabilizer.submit(&reading)
        };

        Ok(FrameReport { roi, glyph_boxes, reading, is_stable, display_missing })
    }

    /// Classifies each detected glyph and assembles the reading left to
    /// right. Unrecognized glyphs are skipped, never replaced with a
    /// placeholder. Returned boxes are ROI-local and cover recognized
    /// glyphs only.
    fn read_glyphs(
        &self,
        binary: &GrayImage,
        glyphs: &[glyph_detector::GlyphCandidate],
    ) -> (String, Vec<Region>) {
        let mut reading = String::new();
        let mut boxes = Vec::new();
        for glyph in glyphs {
            let bounds = glyph.bounds;
            let bitmap =
                crop_imm(binary, bounds.x, bounds.y, bounds.width, bounds.height).to_image();
            match digit_recognizer::classify(&bitmap, &self.config.recognizer) {
                Some(digit) => {
                    reading.push(char::from(b'0' + digit));
                    boxes.push(bounds);
                }
                None => log::debug!("unrecognized glyph at {bounds:?}"),
            }
        }
        (reading, boxes)
    }

    /// The cached display region, once the first frame has been seen.
    pub fn roi(&self) -> Option<Region> {
        self.roi_locator.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn fill(image: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) {
        for y in y0..y1 {
            for x in x0..x1 {
                image.put_pixel(x, y, Luma([255]));
            }
        }
    }

    /// A "1" shaped blob at glyph scale (30x45): a right bar wide enough to
    /// light both right segments, plus a thin bridge that stretches the
    /// bounding box to full width without lighting anything else.
    fn draw_one(image: &mut GrayImage, x: u32, y: u32) {
        fill(image, x + 20, y, x + 30, y + 45);
        fill(image, x, y + 10, x + 20, y + 12);
    }

    /// A "2": top, upper-right, middle, lower-left, bottom.
    fn draw_two(image: &mut GrayImage, x: u32, y: u32) {
        fill(image, x, y, x + 30, y + 4);
        fill(image, x + 24, y, x + 30, y + 24);
        fill(image, x, y + 21, x + 30, y + 25);
        fill(image, x, y + 21, x + 6, y + 45);
        fill(image, x, y + 41, x + 30, y + 45);
    }

    /// A "3": top, full right bar, middle, bottom, and a half-lit lower-left
    /// stub (which keeps the 3 row ahead of the 9 row's bonus).
    fn draw_three(image: &mut GrayImage, x: u32, y: u32) {
        fill(image, x, y, x + 30, y + 4);
        fill(image, x + 24, y, x + 30, y + 45);
        fill(image, x, y + 21, x + 30, y + 25);
        fill(image, x, y + 41, x + 30, y + 45);
        fill(image, x + 2, y + 24, x + 5, y + 33);
    }

    /// A digit-sized blob that activates no segment at all: two side bars
    /// outside the segment columns joined by a weak connector. It passes the
    /// geometric filter but scores below acceptance on every pattern.
    fn draw_unreadable(image: &mut GrayImage, x: u32, y: u32) {
        fill(image, x, y, x + 2, y + 45);
        fill(image, x + 28, y, x + 30, y + 45);
        fill(image, x, y + 12, x + 30, y + 19);
    }

    fn pipeline() -> DisplayPipeline {
        DisplayPipeline::new(PipelineConfig::default())
    }

    #[test]
    fn assembles_digits_left_to_right() {
        let mut binary = GrayImage::new(160, 100);
        draw_one(&mut binary, 10, 25);
        draw_two(&mut binary, 65, 25);
        draw_three(&mut binary, 120, 25);

        let p = pipeline();
        let glyphs = glyph_detector::find_glyphs(&binary, &p.config.detector);
        assert_eq!(glyphs.len(), 3);
        let (reading, boxes) = p.read_glyphs(&binary, &glyphs);
        assert_eq!(reading, "123");
        assert_eq!(boxes.len(), 3);
        assert!(boxes[0].x < boxes[1].x && boxes[1].x < boxes[2].x);
    }

    #[test]
    fn unrecognized_glyphs_are_skipped_without_placeholder() {
        let mut binary = GrayImage::new(160, 100);
        draw_one(&mut binary, 10, 25);
        draw_unreadable(&mut binary, 65, 25);
        draw_three(&mut binary, 120, 25);

        let p = pipeline();
        let glyphs = glyph_detector::find_glyphs(&binary, &p.config.detector);
        assert_eq!(glyphs.len(), 3, "the unreadable blob still passes the filter");
        let (reading, boxes) = p.read_glyphs(&binary, &glyphs);
        assert_eq!(reading, "13");
        assert_eq!(boxes.len(), 2);
    }

    #[test]
    fn empty_frame_reports_missing_display_and_no_reading() {
        let gray = GrayImage::from_pixel(640, 480, Luma([128]));
        let mut p = pipeline();
        let report = p.process_frame(&gray).expect("uniform frame processes fine");
        assert!(report.display_missing);
        assert_eq!(report.reading, "");
        assert!(!report.is_stable);
        assert!(p.stabilizer.is_empty(), "empty readings never enter the window");
    }

    #[test]
    fn roi_is_cached_across_differing_frames() {
        let mut p = pipeline();
        let first = p.process_frame(&GrayImage::from_pixel(640, 480, Luma([90]))).unwrap();
        let second = p.process_frame(&GrayImage::from_pixel(1920, 1080, Luma([90]))).unwrap();
        assert_eq!(first.roi, second.roi);
    }

    #[test]
    fn a_frame_smaller_than_the_cached_roi_is_a_fault() {
        let mut p = pipeline();
        p.process_frame(&GrayImage::from_pixel(640, 480, Luma([90]))).unwrap();
        let result = p.process_frame(&GrayImage::from_pixel(100, 100, Luma([90])));
        assert!(matches!(result, Err(PipelineError::RegionOutOfFrame { .. })));
        // The fault leaves the cache untouched; a full-size frame recovers.
        let report = p.process_frame(&GrayImage::from_pixel(640, 480, Luma([90]))).unwrap();
        assert_eq!(Some(report.roi), p.roi());
    }
}

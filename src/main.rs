// A small demo of the `sevseg_reader` library: feeds synthetic frames with a
// seven-segment "27" through the pipeline and prints the per-frame reports.
// A real application would pull frames from a camera here instead.

use image::{GrayImage, Luma, RgbImage};
use sevseg_reader::{DisplayPipeline, PipelineConfig, overlay};

const FRAME_WIDTH: u32 = 640;
const FRAME_HEIGHT: u32 = 480;

fn main() {
    env_logger::init();

    let mut pipeline = DisplayPipeline::new(PipelineConfig::default());
    let gray = synthetic_frame();

    // The same frame several times over: watch the reading debounce.
    for frame_index in 0..5 {
        match pipeline.process_frame(&gray) {
            Ok(report) => {
                println!(
                    "frame {frame_index}: reading \"{}\" (stable: {}, glyphs: {})",
                    report.reading,
                    report.is_stable,
                    report.glyph_boxes.len(),
                );
                if frame_index == 4 {
                    let mut annotated = annotatable(&gray);
                    overlay::draw_guidelines(&mut annotated);
                    overlay::draw_roi_guide(&mut annotated, &report.roi);
                    overlay::draw_glyph_boxes(&mut annotated, &report.glyph_boxes);
                    if report.is_stable {
                        overlay::draw_stable_marker(&mut annotated);
                    }
                    println!("annotated {}x{} frame", annotated.width(), annotated.height());
                }
            }
            Err(error) => {
                log::warn!("frame {frame_index} skipped: {error}");
            }
        }
    }
}

/// A light frame with a dark seven-segment "27" drawn inside the region the
/// locator will pick for these dimensions.
fn synthetic_frame() -> GrayImage {
    let mut gray = GrayImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, Luma([205]));
    // Digit cells are 30x45, placed mid-ROI.
    draw_two(&mut gray, 280, 220);
    draw_seven(&mut gray, 330, 220);
    gray
}

fn ink(gray: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) {
    for y in y0..y1 {
        for x in x0..x1 {
            gray.put_pixel(x, y, Luma([25]));
        }
    }
}

/// Top, upper-right, middle, lower-left, bottom.
fn draw_two(gray: &mut GrayImage, x: u32, y: u32) {
    ink(gray, x, y, x + 30, y + 4);
    ink(gray, x + 24, y, x + 30, y + 24);
    ink(gray, x, y + 21, x + 30, y + 25);
    ink(gray, x, y + 21, x + 6, y + 45);
    ink(gray, x, y + 41, x + 30, y + 45);
}

/// Top stroke and a full-height right bar.
fn draw_seven(gray: &mut GrayImage, x: u32, y: u32) {
    ink(gray, x, y, x + 30, y + 5);
    ink(gray, x + 22, y, x + 30, y + 45);
}

fn annotatable(gray: &GrayImage) -> RgbImage {
    let mut rgb = RgbImage::new(gray.width(), gray.height());
    for (x, y, pixel) in gray.enumerate_pixels() {
        let v = pixel[0];
        rgb.put_pixel(x, y, image::Rgb([v, v, v]));
    }
    rgb
}

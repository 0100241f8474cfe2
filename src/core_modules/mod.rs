// The internal stage modules of the recognition engine, in pipeline order.
// `pipeline` wires them together; external consumers go through `lib.rs`.

pub mod region;
pub mod roi_locator;
pub mod enhancer;
pub mod glyph_detector;
pub mod digit_recognizer;
pub mod stabilizer;
pub mod overlay;

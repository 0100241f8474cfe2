// THEORY:
// The `roi_locator` owns the only piece of geometric state that survives
// across frames: the rectangle of the frame expected to contain the display.
// The rectangle is derived from the dimensions of the *first* frame ever seen
// and then cached for the lifetime of the pipeline instance. Subsequent calls
// return the identical rectangle even if they are made with different
// dimensions - stream resolutions do not change mid-session, and a stable
// guide rectangle is what the user aligns the display against.
//
// The derivation itself is a handful of tuned ratios: the ROI is roughly a
// 2:1 landscape band, a quarter-ish of the frame tall, centered horizontally
// and placed at 40% of the frame height.

use crate::core_modules::region::Region;

/// Sizing ratios for the display region. The defaults are the tuned values;
/// they are fixed at construction time, not per frame.
#[derive(Debug, Clone)]
pub struct RoiConfig {
    /// The frame height is divided by this to get the ROI height.
    pub height_divisor: f64,
    /// ROI width is `width_factor * roi_height`, capped by the frame width.
    pub width_factor: u32,
    /// Horizontal margin kept free when the width cap applies.
    pub width_margin: u32,
    /// Vertical placement of the ROI top edge, as a fraction of frame height.
    pub vertical_offset: f64,
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            height_divisor: 4.5,
            width_factor: 2,
            width_margin: 20,
            vertical_offset: 0.4,
        }
    }
}

/// Computes the display region once and hands out the cached copy afterwards.
pub struct RoiLocator {
    config: RoiConfig,
    cached: Option<Region>,
}

impl RoiLocator {
    pub fn new(config: RoiConfig) -> Self {
        Self { config, cached: None }
    }

    /// Returns the display region for the session. The first call derives it
    /// from the given frame dimensions; every later call returns the cached
    /// rectangle unchanged, whatever the arguments.
    pub fn locate(&mut self, frame_height: u32, frame_width: u32) -> Region {
        *self
            .cached
            .get_or_insert_with(|| derive_region(&self.config, frame_height, frame_width))
    }

    /// The cached region, if one has been derived yet.
    pub fn current(&self) -> Option<Region> {
        self.cached
    }
}

fn derive_region(config: &RoiConfig, frame_height: u32, frame_width: u32) -> Region {
    let height = (frame_height as f64 / config.height_divisor) as u32;
    let width = (height * config.width_factor).min(frame_width.saturating_sub(config.width_margin));
    let x = frame_width.saturating_sub(width) / 2;
    let y = (frame_height as f64 * config.vertical_offset) as u32;
    Region::new(x, y, width, height)
}

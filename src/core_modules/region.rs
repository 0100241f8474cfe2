// THEORY:
// The `region` module defines the one geometric primitive the whole pipeline
// shares: an axis-aligned rectangle in frame (or ROI-local) pixel coordinates.
// Every stage speaks in `Region`s - the ROI locator produces one, the glyph
// detector produces one per candidate, and the pipeline translates glyph
// regions back into absolute frame coordinates for the rendering collaborator.
//
// It deliberately stays a "dumb" data container. The only behavior it carries
// is coordinate bookkeeping (edges, translation, containment checks) plus a
// conversion into `imageproc`'s rect type at the drawing seam.

use imageproc::rect::Rect;

/// An axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Left edge, in pixels.
    pub x: u32,
    /// Top edge, in pixels.
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// One past the right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// One past the bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True if the whole rectangle lies inside a `frame_width` x `frame_height` frame.
    pub fn fits_within(&self, frame_width: u32, frame_height: u32) -> bool {
        self.right() <= frame_width && self.bottom() <= frame_height
    }

    /// The same rectangle shifted by an absolute offset, used to map ROI-local
    /// glyph boxes back into full-frame coordinates.
    pub fn translated(&self, dx: u32, dy: u32) -> Region {
        Region::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Width over height, the shape metric the glyph filter cuts on.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f64 / self.height as f64
        }
    }

    /// Conversion for the `imageproc` drawing primitives.
    pub fn to_rect(&self) -> Rect {
        Rect::at(self.x as i32, self.y as i32).of_size(self.width.max(1), self.height.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_and_containment() {
        let r = Region::new(10, 20, 30, 40);
        assert_eq!(r.right(), 40);
        assert_eq!(r.bottom(), 60);
        assert!(r.fits_within(40, 60));
        assert!(!r.fits_within(39, 60));
        assert!(!r.fits_within(40, 59));
    }

    #[test]
    fn translation_is_absolute_offset() {
        let local = Region::new(5, 6, 7, 8);
        let absolute = local.translated(100, 200);
        assert_eq!(absolute, Region::new(105, 206, 7, 8));
    }

    #[test]
    fn aspect_ratio_of_zero_height_is_zero() {
        assert_eq!(Region::new(0, 0, 10, 0).aspect_ratio(), 0.0);
        let half = Region::new(0, 0, 20, 40).aspect_ratio();
        assert!((half - 0.5).abs() < 1e-12);
    }
}

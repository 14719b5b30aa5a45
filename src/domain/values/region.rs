use serde::{Deserialize, Serialize};

/// Face bounding box in pixel coordinates, ordered the way the detector
/// reports it: top, right, bottom, left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl BoundingBox {
    pub fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self { top, right, bottom, left }
    }

    /// Maps a box found on a frame downscaled by `resize_factor` back onto
    /// the original frame. Coordinates truncate toward zero.
    pub fn scale_up(&self, resize_factor: f64) -> Self {
        if resize_factor <= 0.0 {
            return *self;
        }
        let scale = 1.0 / resize_factor;
        let up = |v: i32| (v as f64 * scale) as i32;
        Self {
            top: up(self.top),
            right: up(self.right),
            bottom: up(self.bottom),
            left: up(self.left),
        }
    }
}

impl From<[i32; 4]> for BoundingBox {
    fn from([top, right, bottom, left]: [i32; 4]) -> Self {
        Self { top, right, bottom, left }
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.top, b.right, b.bottom, b.left]
    }
}

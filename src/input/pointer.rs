//! Pointer position tracking
//!
//! One record owns the cursor position; every write path clamps to the
//! current surface bounds, so consumers never see an out-of-range
//! coordinate.

/// Pointer position clamped to `[0, width-1] x [0, height-1]`
#[derive(Debug, Clone, Copy)]
pub struct PointerState {
    x: f64,
    y: f64,
    width: i32,
    height: i32,
}

impl PointerState {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    /// Update the clamping bounds after a surface size change.
    /// The current position is re-clamped against the new bounds.
    pub fn set_bounds(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        let (x, y) = (self.x, self.y);
        self.set_position(x, y);
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Accumulate a relative motion delta, clamped to bounds.
    /// Returns the resulting absolute position.
    pub fn apply_delta(&mut self, dx: f64, dy: f64) -> (f64, f64) {
        let (x, y) = (self.x + dx, self.y + dy);
        self.set_position(x, y)
    }

    /// Set an absolute position, clamped to bounds.
    /// Returns the resulting position.
    pub fn set_position(&mut self, x: f64, y: f64) -> (f64, f64) {
        self.x = x.clamp(0.0, self.max_coord(self.width));
        self.y = y.clamp(0.0, self.max_coord(self.height));
        (self.x, self.y)
    }

    // Largest addressable coordinate on an axis. A degenerate bound
    // (zero or negative extent) pins the axis to 0.
    fn max_coord(&self, extent: i32) -> f64 {
        (extent.max(1) - 1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn delta_accumulates_and_clamps() {
        let mut pointer = PointerState::new(100, 100);
        assert_eq!(pointer.apply_delta(5.0, 5.0), (5.0, 5.0));
        assert_eq!(pointer.apply_delta(-3.0, -3.0), (2.0, 2.0));
        assert_eq!(pointer.apply_delta(-10.0, 500.0), (0.0, 99.0));
    }

    #[test]
    fn absolute_write_clamps() {
        let mut pointer = PointerState::new(1920, 1080);
        assert_eq!(pointer.set_position(5000.0, -3.0), (1919.0, 0.0));
    }

    #[test]
    fn shrinking_bounds_reclamps_position() {
        let mut pointer = PointerState::new(1920, 1080);
        pointer.set_position(1919.0, 1079.0);
        pointer.set_bounds(640, 480);
        assert_eq!(pointer.position(), (639.0, 479.0));
    }

    #[test]
    fn zero_size_bounds_pin_to_origin() {
        let mut pointer = PointerState::new(0, 0);
        assert_eq!(pointer.apply_delta(42.0, -42.0), (0.0, 0.0));
    }

    proptest! {
        // Clamping is total: no delta sequence can escape the bounds.
        #[test]
        fn any_delta_stays_in_bounds(
            deltas in prop::collection::vec((-1e6f64..1e6, -1e6f64..1e6), 0..64),
            width in 1i32..8192,
            height in 1i32..8192,
        ) {
            let mut pointer = PointerState::new(width, height);
            for (dx, dy) in deltas {
                let (x, y) = pointer.apply_delta(dx, dy);
                prop_assert!(x >= 0.0 && x <= (width - 1) as f64);
                prop_assert!(y >= 0.0 && y <= (height - 1) as f64);
            }
        }
    }
}

use super::Vec2;

/// Viewport size in logical pixels.
///
/// Also the conversion basis between screen pixels (top-left origin, +Y down)
/// and normalized device coordinates ([-1, 1], +Y up).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Converts a screen-pixel position to NDC.
    #[inline]
    pub fn px_to_ndc(self, p: Vec2) -> Vec2 {
        Vec2::new(
            2.0 * p.x / self.width - 1.0,
            1.0 - 2.0 * p.y / self.height,
        )
    }

    /// Converts a screen-pixel delta (e.g. a mouse drag) to an NDC delta.
    ///
    /// Unlike positions, deltas carry no origin shift; only the axis flip and
    /// the 2/size scaling apply.
    #[inline]
    pub fn px_delta_to_ndc(self, d: Vec2) -> Vec2 {
        Vec2::new(2.0 * d.x / self.width, -2.0 * d.y / self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_maps_to_origin() {
        let vp = Viewport::new(800.0, 600.0);
        assert_eq!(vp.px_to_ndc(Vec2::new(400.0, 300.0)), Vec2::zero());
    }

    #[test]
    fn corners_map_to_unit_square() {
        let vp = Viewport::new(800.0, 600.0);
        assert_eq!(vp.px_to_ndc(Vec2::zero()), Vec2::new(-1.0, 1.0));
        assert_eq!(vp.px_to_ndc(Vec2::new(800.0, 600.0)), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn delta_flips_y_only() {
        let vp = Viewport::new(200.0, 100.0);
        let d = vp.px_delta_to_ndc(Vec2::new(100.0, 25.0));
        assert_eq!(d, Vec2::new(1.0, -0.5));
    }
}

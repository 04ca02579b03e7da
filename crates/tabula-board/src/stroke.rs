//! Freehand stroke geometry.
//!
//! A drag is turned into a ribbon of quads: each pointer step emits one quad
//! whose long edges run along the drag direction, offset by the half-width in
//! the perpendicular direction. The leading edge of each quad is carried over
//! verbatim as the trailing edge of the next, so consecutive quads share an
//! edge and the ribbon has no seams.
//!
//! The builder is unit-agnostic; the app feeds screen-pixel positions and
//! converts the emitted corners to world space.

use tabula_engine::coords::Vec2;

/// One ribbon segment: two triangles over four corners.
///
/// Corner order: `[trail_a, trail_b, lead_a, lead_b]`, where the `a` side is
/// offset along the left normal and `b` along the right.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RibbonQuad {
    pub corners: [Vec2; 4],
}

impl RibbonQuad {
    /// Index pattern for the two triangles, local to the quad's 4 vertices.
    pub const INDICES: [u32; 6] = [0, 1, 2, 1, 3, 2];

    /// Trailing edge (shared with the previous quad, if any).
    pub fn trailing_edge(&self) -> (Vec2, Vec2) {
        (self.corners[0], self.corners[1])
    }

    /// Leading edge (shared with the next quad, if any).
    pub fn leading_edge(&self) -> (Vec2, Vec2) {
        (self.corners[2], self.corners[3])
    }
}

/// Incremental ribbon builder for one stroke.
pub struct StrokeBuilder {
    half_width: f32,
    prev: Option<Vec2>,
    /// Leading edge of the last emitted quad, reused as the next trailing edge.
    edge: Option<(Vec2, Vec2)>,
}

impl StrokeBuilder {
    pub fn new(half_width: f32) -> Self {
        Self {
            half_width,
            prev: None,
            edge: None,
        }
    }

    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    /// True between the first fed point and the next reset.
    pub fn is_active(&self) -> bool {
        self.prev.is_some()
    }

    /// Feeds the next pointer position.
    ///
    /// The first point primes the builder and emits nothing; every further
    /// point emits the quad between the previous and current position. A
    /// zero-length step emits nothing.
    pub fn feed(&mut self, p: Vec2) -> Option<RibbonQuad> {
        let Some(prev) = self.prev else {
            self.prev = Some(p);
            return None;
        };

        let dir = p - prev;
        if dir.x == 0.0 && dir.y == 0.0 {
            return None;
        }

        let n = dir.normalized().perp() * self.half_width;

        let (trail_a, trail_b) = self.edge.unwrap_or((prev + n, prev - n));
        let (lead_a, lead_b) = (p + n, p - n);

        self.prev = Some(p);
        self.edge = Some((lead_a, lead_b));

        Some(RibbonQuad {
            corners: [trail_a, trail_b, lead_a, lead_b],
        })
    }

    /// Ends the stroke: clears the previous position and the carried edge.
    pub fn reset(&mut self) {
        self.prev = None;
        self.edge = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(builder: &mut StrokeBuilder, points: &[(f32, f32)]) -> Vec<RibbonQuad> {
        points
            .iter()
            .filter_map(|&(x, y)| builder.feed(Vec2::new(x, y)))
            .collect()
    }

    // ── counts ───────────────────────────────────────────────────────────

    #[test]
    fn first_point_emits_nothing() {
        let mut b = StrokeBuilder::new(5.0);
        assert!(b.feed(Vec2::new(10.0, 10.0)).is_none());
        assert!(b.is_active());
    }

    #[test]
    fn n_points_emit_n_minus_one_quads() {
        let mut b = StrokeBuilder::new(5.0);
        let quads = feed_all(
            &mut b,
            &[(0.0, 0.0), (10.0, 0.0), (20.0, 5.0), (30.0, 5.0), (35.0, 10.0)],
        );

        // 5 points → 4 quads → 16 vertices and 24 indices.
        assert_eq!(quads.len(), 4);
        let vertices: usize = quads.iter().map(|q| q.corners.len()).sum();
        let indices = quads.len() * RibbonQuad::INDICES.len();
        assert_eq!(vertices, 16);
        assert_eq!(indices, 24);
    }

    #[test]
    fn repeated_point_emits_nothing() {
        let mut b = StrokeBuilder::new(5.0);
        b.feed(Vec2::new(3.0, 4.0));
        assert!(b.feed(Vec2::new(3.0, 4.0)).is_none());
    }

    // ── seams ────────────────────────────────────────────────────────────

    #[test]
    fn consecutive_quads_share_an_edge() {
        let mut b = StrokeBuilder::new(5.0);
        let quads = feed_all(&mut b, &[(0.0, 0.0), (10.0, 0.0), (20.0, 10.0), (20.0, 25.0)]);

        for pair in quads.windows(2) {
            assert_eq!(pair[0].leading_edge(), pair[1].trailing_edge());
        }
    }

    #[test]
    fn reset_breaks_the_ribbon() {
        let mut b = StrokeBuilder::new(5.0);
        feed_all(&mut b, &[(0.0, 0.0), (10.0, 0.0)]);
        b.reset();
        assert!(!b.is_active());

        // A new stroke starts with a fresh edge, not the old leading edge.
        let quads = feed_all(&mut b, &[(100.0, 100.0), (110.0, 100.0)]);
        assert_eq!(quads.len(), 1);
        assert_eq!(
            quads[0].trailing_edge(),
            (Vec2::new(100.0, 105.0), Vec2::new(100.0, 95.0))
        );
    }

    // ── geometry ─────────────────────────────────────────────────────────

    #[test]
    fn horizontal_drag_spans_half_width_both_ends() {
        let mut b = StrokeBuilder::new(5.0);
        let quads = feed_all(&mut b, &[(100.0, 100.0), (110.0, 100.0)]);
        assert_eq!(quads.len(), 1);

        let q = quads[0];
        let ys: Vec<f32> = q.corners.iter().map(|c| c.y).collect();
        let xs: Vec<f32> = q.corners.iter().map(|c| c.x).collect();

        // Straight horizontal ribbon: y ∈ [95, 105] at both endpoints.
        assert_eq!(ys.iter().cloned().fold(f32::INFINITY, f32::min), 95.0);
        assert_eq!(ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max), 105.0);
        assert_eq!(q.trailing_edge().0.y, 105.0);
        assert_eq!(q.trailing_edge().1.y, 95.0);
        assert_eq!(q.leading_edge().0.y, 105.0);
        assert_eq!(q.leading_edge().1.y, 95.0);

        assert_eq!(xs.iter().cloned().fold(f32::INFINITY, f32::min), 100.0);
        assert_eq!(xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max), 110.0);
    }

    #[test]
    fn offset_is_perpendicular_to_drag_direction() {
        let mut b = StrokeBuilder::new(2.0);
        b.feed(Vec2::new(0.0, 0.0));
        let q = b.feed(Vec2::new(0.0, 10.0)).unwrap();

        // Vertical drag → horizontal offset.
        assert_eq!(q.trailing_edge().0, Vec2::new(-2.0, 0.0));
        assert_eq!(q.trailing_edge().1, Vec2::new(2.0, 0.0));
    }
}

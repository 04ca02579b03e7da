//! Pan/zoom camera.
//!
//! The view matrix maps world space to NDC; its inverse is recomputed
//! eagerly after every mutation so pointer positions can be mapped back into
//! world space for hit-testing new geometry.

use tabula_engine::coords::{Mat3, Vec2, Viewport};

/// Uniform-scale clamp for the camera.
pub const MIN_ZOOM: f32 = 1e-5;
pub const MAX_ZOOM: f32 = 1e5;

/// Wheel notches are conventionally ±120 pixel-equivalents per line.
pub const WHEEL_LINE_PX: f32 = 120.0;

pub struct Camera {
    view: Mat3,
    inverse: Mat3,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            view: Mat3::IDENTITY,
            inverse: Mat3::IDENTITY,
        }
    }

    pub fn view(&self) -> &Mat3 {
        &self.view
    }

    pub fn inverse(&self) -> &Mat3 {
        &self.inverse
    }

    /// Current uniform scale.
    ///
    /// The camera only ever composes translations and uniform scales, so the
    /// first basis column carries the zoom directly.
    pub fn zoom(&self) -> f32 {
        self.view.cols[0][0]
    }

    /// Pans by an NDC-space delta: the translation column moves by exactly
    /// `delta_ndc`, i.e. content follows the pointer.
    pub fn pan(&mut self, delta_ndc: Vec2) {
        let z = self.zoom();
        self.view = self.view.mul(&Mat3::translation(delta_ndc / z));
        self.update_inverse();
    }

    /// Zooms by a wheel delta (pixel-equivalent), anchored at `cursor_ndc`:
    /// the world point under the cursor stays at the same screen position.
    ///
    /// The resulting scale is clamped into `[MIN_ZOOM, MAX_ZOOM]` by a
    /// corrective scale about the same anchor.
    pub fn zoom_at(&mut self, cursor_ndc: Vec2, wheel_delta: f32) {
        let factor = wheel_zoom_factor(wheel_delta);
        if factor == 1.0 {
            return;
        }

        self.scale_about(cursor_ndc, factor);

        let z = self.zoom();
        let clamped = z.clamp(MIN_ZOOM, MAX_ZOOM);
        if clamped != z {
            self.scale_about(cursor_ndc, clamped / z);
        }
    }

    /// Maps a screen-pixel position to world space.
    pub fn screen_to_world(&self, p_px: Vec2, viewport: Viewport) -> Vec2 {
        self.inverse.transform_point(viewport.px_to_ndc(p_px))
    }

    /// Scales uniformly about the world point under `cursor_ndc`:
    /// translate the anchor to the origin, scale, translate back.
    fn scale_about(&mut self, cursor_ndc: Vec2, factor: f32) {
        let anchor = self.inverse.transform_point(cursor_ndc);
        self.view = self
            .view
            .mul(&Mat3::translation(anchor))
            .mul(&Mat3::scaling(factor))
            .mul(&Mat3::translation(-anchor));
        self.update_inverse();
    }

    fn update_inverse(&mut self) {
        // The zoom clamp keeps the view invertible; identity is a safe
        // fallback if numerics degenerate anyway.
        self.inverse = self.view.inverse().unwrap_or(Mat3::IDENTITY);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a wheel delta (pixel-equivalent) to a zoom factor:
/// `1.01 ^ (sign(Δ) · ln(max(|Δ|, 1)))`.
pub fn wheel_zoom_factor(delta: f32) -> f32 {
    if delta == 0.0 {
        return 1.0;
    }
    1.01f32.powf(delta.signum() * delta.abs().max(1.0).ln())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn assert_vec_close(a: Vec2, b: Vec2) {
        assert!((a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS, "{a:?} !~ {b:?}");
    }

    // ── pan ──────────────────────────────────────────────────────────────

    #[test]
    fn pan_moves_translation_column_by_ndc_delta() {
        let mut cam = Camera::new();
        cam.zoom_at(Vec2::zero(), 240.0); // some non-unit zoom first
        let before = cam.view().cols[2];

        let delta = Vec2::new(0.25, -0.125);
        cam.pan(delta);

        let after = cam.view().cols[2];
        assert!((after[0] - before[0] - delta.x).abs() < EPS);
        assert!((after[1] - before[1] - delta.y).abs() < EPS);
    }

    #[test]
    fn pan_shifts_world_points_on_screen() {
        let mut cam = Camera::new();
        cam.zoom_at(Vec2::new(0.3, 0.1), -500.0);

        let w = Vec2::new(0.4, -0.7);
        let before = cam.view().transform_point(w);

        let delta = Vec2::new(-0.1, 0.2);
        cam.pan(delta);

        assert_vec_close(cam.view().transform_point(w), before + delta);
    }

    #[test]
    fn inverse_tracks_every_mutation() {
        let mut cam = Camera::new();
        cam.pan(Vec2::new(0.5, 0.25));
        cam.zoom_at(Vec2::new(-0.2, 0.6), 360.0);
        cam.pan(Vec2::new(-0.1, 0.0));

        let product = cam.view().mul(cam.inverse());
        assert!(product.approx_eq(&Mat3::IDENTITY, EPS));
    }

    // ── zoom ─────────────────────────────────────────────────────────────

    #[test]
    fn zoom_keeps_cursor_anchor_fixed() {
        let mut cam = Camera::new();
        cam.pan(Vec2::new(0.3, -0.2));

        let cursor = Vec2::new(0.5, 0.5);
        let anchor_world = cam.inverse().transform_point(cursor);

        cam.zoom_at(cursor, 240.0);

        // The same world point still lands on the cursor.
        assert_vec_close(cam.view().transform_point(anchor_world), cursor);
    }

    #[test]
    fn zoom_anchor_survives_repeated_steps() {
        let mut cam = Camera::new();
        let cursor = Vec2::new(-0.4, 0.8);
        let anchor_world = cam.inverse().transform_point(cursor);

        for _ in 0..20 {
            cam.zoom_at(cursor, 120.0);
        }

        assert_vec_close(cam.view().transform_point(anchor_world), cursor);
    }

    #[test]
    fn zoom_is_clamped_at_both_ends() {
        let mut cam = Camera::new();
        let cursor = Vec2::zero();

        for _ in 0..10_000 {
            cam.zoom_at(cursor, 1_000.0);
        }
        assert!(cam.zoom() <= MAX_ZOOM * (1.0 + EPS));

        for _ in 0..20_000 {
            cam.zoom_at(cursor, -1_000.0);
        }
        assert!(cam.zoom() >= MIN_ZOOM * (1.0 - EPS));
    }

    #[test]
    fn wheel_factor_direction_and_magnitude() {
        assert!(wheel_zoom_factor(120.0) > 1.0);
        assert!(wheel_zoom_factor(-120.0) < 1.0);
        assert_eq!(wheel_zoom_factor(0.0), 1.0);

        // sign(Δ)·ln|Δ| is symmetric: up then down cancels.
        let f = wheel_zoom_factor(120.0) * wheel_zoom_factor(-120.0);
        assert!((f - 1.0).abs() < EPS);
    }

    #[test]
    fn screen_to_world_roundtrip() {
        let mut cam = Camera::new();
        cam.pan(Vec2::new(0.2, 0.1));
        cam.zoom_at(Vec2::new(0.1, -0.3), 240.0);

        let vp = Viewport::new(800.0, 600.0);
        let px = Vec2::new(123.0, 456.0);

        let world = cam.screen_to_world(px, vp);
        let ndc = cam.view().transform_point(world);
        assert_vec_close(ndc, vp.px_to_ndc(px));
    }
}

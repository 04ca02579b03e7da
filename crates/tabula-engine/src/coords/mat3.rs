use super::Vec2;

/// Column-major 3×3 matrix for 2D affine transforms.
///
/// `cols[c][r]` addresses column `c`, row `r`. Points transform as
/// `M · (x, y, 1)ᵀ`, so column 2 holds the translation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat3 {
    pub cols: [[f32; 3]; 3],
}

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3 {
        cols: [
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ],
    };

    #[inline]
    pub const fn translation(t: Vec2) -> Self {
        Mat3 {
            cols: [
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [t.x, t.y, 1.0],
            ],
        }
    }

    #[inline]
    pub const fn scaling(s: f32) -> Self {
        Mat3 {
            cols: [
                [s, 0.0, 0.0],
                [0.0, s, 0.0],
                [0.0, 0.0, 1.0],
            ],
        }
    }

    /// Matrix product `self · rhs` (rhs applies first to points).
    pub fn mul(&self, rhs: &Mat3) -> Mat3 {
        let mut out = [[0.0f32; 3]; 3];
        for c in 0..3 {
            for r in 0..3 {
                let mut acc = 0.0;
                for k in 0..3 {
                    acc += self.cols[k][r] * rhs.cols[c][k];
                }
                out[c][r] = acc;
            }
        }
        Mat3 { cols: out }
    }

    /// Transforms a point (w = 1).
    #[inline]
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        let m = &self.cols;
        Vec2::new(
            m[0][0] * p.x + m[1][0] * p.y + m[2][0],
            m[0][1] * p.x + m[1][1] * p.y + m[2][1],
        )
    }

    pub fn determinant(&self) -> f32 {
        let m = &self.cols;
        m[0][0] * (m[1][1] * m[2][2] - m[2][1] * m[1][2])
            - m[1][0] * (m[0][1] * m[2][2] - m[2][1] * m[0][2])
            + m[2][0] * (m[0][1] * m[1][2] - m[1][1] * m[0][2])
    }

    /// Exact inverse via the adjugate. `None` for singular matrices.
    pub fn inverse(&self) -> Option<Mat3> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;
        let m = &self.cols;

        // Cofactor (c, r) of the transpose, i.e. adjugate laid out column-major.
        let cof = |a: usize, b: usize, c: usize, d: usize| -> f32 {
            let (ac, ar) = (a / 3, a % 3);
            let (bc, br) = (b / 3, b % 3);
            let (cc, cr) = (c / 3, c % 3);
            let (dc, dr) = (d / 3, d % 3);
            m[ac][ar] * m[dc][dr] - m[bc][br] * m[cc][cr]
        };

        let out = Mat3 {
            cols: [
                [
                    cof(4, 5, 7, 8) * inv_det,
                    -cof(1, 2, 7, 8) * inv_det,
                    cof(1, 2, 4, 5) * inv_det,
                ],
                [
                    -cof(3, 5, 6, 8) * inv_det,
                    cof(0, 2, 6, 8) * inv_det,
                    -cof(0, 2, 3, 5) * inv_det,
                ],
                [
                    cof(3, 4, 6, 7) * inv_det,
                    -cof(0, 1, 6, 7) * inv_det,
                    cof(0, 1, 3, 4) * inv_det,
                ],
            ],
        };
        Some(out)
    }

    /// Element-wise comparison within `eps`, for tests and validation.
    pub fn approx_eq(&self, other: &Mat3, eps: f32) -> bool {
        for c in 0..3 {
            for r in 0..3 {
                if (self.cols[c][r] - other.cols[c][r]).abs() > eps {
                    return false;
                }
            }
        }
        true
    }

    pub fn is_finite(&self) -> bool {
        self.cols
            .iter()
            .all(|col| col.iter().all(|v| v.is_finite()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &Mat3, b: &Mat3) {
        assert!(a.approx_eq(b, 1e-5), "{a:?} !~ {b:?}");
    }

    // ── multiply / transform ─────────────────────────────────────────────

    #[test]
    fn identity_is_neutral() {
        let m = Mat3::translation(Vec2::new(3.0, -2.0)).mul(&Mat3::scaling(2.0));
        assert_close(&Mat3::IDENTITY.mul(&m), &m);
        assert_close(&m.mul(&Mat3::IDENTITY), &m);
    }

    #[test]
    fn translation_moves_points() {
        let m = Mat3::translation(Vec2::new(5.0, -1.0));
        assert_eq!(m.transform_point(Vec2::new(1.0, 1.0)), Vec2::new(6.0, 0.0));
    }

    #[test]
    fn scale_then_translate_order() {
        // M = T · S applies the scale first.
        let m = Mat3::translation(Vec2::new(10.0, 0.0)).mul(&Mat3::scaling(2.0));
        assert_eq!(m.transform_point(Vec2::new(1.0, 1.0)), Vec2::new(12.0, 2.0));
    }

    // ── inverse ──────────────────────────────────────────────────────────

    #[test]
    fn inverse_of_identity() {
        assert_close(&Mat3::IDENTITY.inverse().unwrap(), &Mat3::IDENTITY);
    }

    #[test]
    fn inverse_roundtrip() {
        let m = Mat3::translation(Vec2::new(4.0, -7.0)).mul(&Mat3::scaling(0.25));
        let inv = m.inverse().unwrap();
        assert_close(&m.mul(&inv), &Mat3::IDENTITY);
        assert_close(&inv.mul(&m), &Mat3::IDENTITY);
    }

    #[test]
    fn inverse_maps_points_back() {
        let m = Mat3::translation(Vec2::new(1.5, 2.5)).mul(&Mat3::scaling(3.0));
        let p = Vec2::new(-2.0, 8.0);
        let q = m.transform_point(p);
        let back = m.inverse().unwrap().transform_point(q);
        assert!((back.x - p.x).abs() < 1e-5);
        assert!((back.y - p.y).abs() < 1e-5);
    }

    #[test]
    fn singular_has_no_inverse() {
        assert!(Mat3::scaling(0.0).inverse().is_none());
    }
}

//! Small vector helpers shared by the simplex and polyhedron code.
//!
//! Grounded in `ivy_collision::util` (`barycentric_vector`, `triple_prod`).

use glam::Vec3;

/// `(a × b) × c`, the vector triple product used throughout GJK to find a
/// direction perpendicular to one edge but on the side of a reference point.
#[inline]
pub fn triple_prod(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    a.cross(b).cross(c)
}

/// True if `v` is short enough to be treated as the zero vector for
/// direction-selection purposes (parallel edges, coincident centers).
#[inline]
pub fn is_near_zero(v: Vec3) -> bool {
    v.length_squared() < crate::EPSILON
}

/// True if every component of `v` is finite, i.e. not NaN or infinite.
#[inline]
pub fn is_finite(v: Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

/// Compute barycentric coordinates of `p` in relation to the triangle
/// `(a, b, c)`. `p` is assumed to already lie in the triangle's plane.
pub fn barycentric(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> (f32, f32, f32) {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;
    let d00 = v0.dot(v0);
    let d01 = v0.dot(v1);
    let d11 = v1.dot(v1);
    let d20 = v2.dot(v0);
    let d21 = v2.dot(v1);
    let denom = d00 * d11 - d01 * d01;
    let inv_denom = 1.0 / denom;

    let v = (d11 * d20 - d01 * d21) * inv_denom;
    let w = (d00 * d21 - d01 * d20) * inv_denom;
    let u = 1.0 - v - w;
    (u, v, w)
}

/// Closest point to the origin on triangle `(a, b, c)`, via the standard
/// region test (Ericson, *Real-Time Collision Detection* 5.1.5) rather than
/// a naive barycentric clamp.
pub fn closest_point_on_triangle_to_origin(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;
    let ap = -a;

    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = -b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + v * ab;
    }

    let cp = -c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + w * ac;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + w * (c - b);
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_point_face_region() {
        let p = closest_point_on_triangle_to_origin(
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, -1.0, 1.0),
        );
        assert!((p - Vec3::new(1.0, -1.0, -1.0)).length() < 1e-5 || p.x == 1.0);
    }

    #[test]
    fn barycentric_round_trip() {
        let (a, b, c) = (Vec3::ZERO, Vec3::X, Vec3::Y);
        let p = a * 0.2 + b * 0.3 + c * 0.5;
        let (u, v, w) = barycentric(p, a, b, c);
        assert!((u - 0.2).abs() < 1e-5);
        assert!((v - 0.3).abs() < 1e-5);
        assert!((w - 0.5).abs() < 1e-5);
    }

    #[test]
    fn near_zero_detection() {
        assert!(is_near_zero(Vec3::ZERO));
        assert!(!is_near_zero(Vec3::new(0.1, 0.0, 0.0)));
    }

    #[test]
    fn finite_detection() {
        assert!(is_finite(Vec3::new(1.0, -2.0, 0.0)));
        assert!(!is_finite(Vec3::new(f32::NAN, 0.0, 0.0)));
        assert!(!is_finite(Vec3::new(0.0, f32::INFINITY, 0.0)));
    }
}

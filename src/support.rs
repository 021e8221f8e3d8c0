use glam::{Mat4, Vec3};

/// Opaque body identifier carried through to [`crate::ContactDetails`] so a
/// consuming constraint solver can tell which two bodies collided.
///
/// The core never allocates these; a `Body` implementation hands back
/// whatever id its own rigid-body store already uses (an ECS entity, a
/// slotmap key, an index into a `Vec`). A plain wrapped `u64` is enough
/// here since this crate has no ECS of its own to key into — unlike
/// `ivy_collision::BodyIndex`, which is a `slotmap` key into that crate's
/// own body slab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(pub u64);

/// External capability consumed from a rigid body.
///
/// The core never constructs or owns a `Body`; it only calls `support` and
/// reads the four fields below. The rigid-body representation, broad-phase
/// nomination of pairs, and the constraint solver that consumes contacts
/// are all out of scope for this crate.
pub trait Body {
    /// Stable identifier of this body, copied into the resulting
    /// [`crate::ContactDetails`].
    fn id(&self) -> BodyId;

    /// Farthest world-space point of this body's convex hull in `dir`.
    fn support(&self, dir: Vec3) -> Vec3;

    /// World-space position, used as the fallback GJK search direction and
    /// the fallback contact normal.
    fn position(&self) -> Vec3;

    /// World-to-local transform, used to express the contact point in the
    /// body's local frame.
    fn transform_inverse(&self) -> Mat4;

    fn restitution(&self) -> f32;

    fn friction(&self) -> f32;
}

/// A point on the boundary of the Minkowski difference `A ⊖ B`, carrying
/// the witnesses on `A` and `B` that produced it.
///
/// Invariant: `point == witness_a - witness_b`. Pooled; conceptually owned
/// by whichever [`crate::simplex::Simplex`] or
/// [`crate::polyhedron::Polyhedron`] currently references it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupportPoint {
    pub witness_a: Vec3,
    pub witness_b: Vec3,
    pub point: Vec3,
}

impl SupportPoint {
    pub fn new(witness_a: Vec3, witness_b: Vec3) -> Self {
        Self {
            witness_a,
            witness_b,
            point: witness_a - witness_b,
        }
    }
}

/// Computes the farthest point of the Minkowski difference `A ⊖ B` in
/// `dir`. No failure modes.
#[inline]
pub fn find_support<A: Body, B: Body>(a: &A, b: &B, dir: Vec3) -> SupportPoint {
    let witness_a = a.support(dir);
    let witness_b = b.support(-dir);
    SupportPoint::new(witness_a, witness_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Sphere;

    #[test]
    fn minkowski_identity() {
        let a = Sphere::new(1.0, Vec3::ZERO);
        let b = Sphere::new(1.0, Vec3::new(1.5, 0.0, 0.0));

        let sp = find_support(&a, &b, Vec3::X);
        assert_eq!(sp.point, sp.witness_a - sp.witness_b);
    }

    #[test]
    fn support_correctness_on_sphere() {
        // P1: dot(a.support(d), d) >= dot(v, d) for any vertex v of the hull.
        let sphere = Sphere::new(1.0, Vec3::ZERO);
        let dir = Vec3::new(0.3, 0.7, -0.2).normalize();
        let s = sphere.support(dir);

        for i in 0..64 {
            let theta = i as f32 * std::f32::consts::TAU / 64.0;
            let v = Vec3::new(theta.cos(), theta.sin(), 0.0);
            assert!(s.dot(dir) >= v.dot(dir) - 1e-5);
        }
    }
}

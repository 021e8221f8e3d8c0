use glam::Vec3;

use crate::support::BodyId;

/// A single deepest contact between two convex bodies.
///
/// This core never reduces or merges multiple contact points (Non-goal):
/// one query produces at most one `ContactDetails`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactDetails {
    pub object_a: BodyId,
    pub object_b: BodyId,

    /// Unit vector pointing from `object_a` into `object_b` by convention
    /// when well-defined.
    pub contact_normal: Vec3,

    /// World-space contact point, the midpoint of the two witnesses.
    pub contact_point: Vec3,

    /// Contact point expressed in `object_a`'s local frame.
    pub contact_point_in_a: Vec3,

    /// Contact point expressed in `object_b`'s local frame.
    pub contact_point_in_b: Vec3,

    /// Always `>= 0`.
    pub penetration_depth: f32,

    pub restitution: f32,
    pub friction: f32,
}

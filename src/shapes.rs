//! Minimal convex [`Body`] implementations used by this crate's own tests
//! to exercise collision scenarios end to end.
//!
//! These are ambient test tooling, not the rigid-body data structure: the
//! real `Body` capability stays an external trait a physics engine
//! implements over its own bodies.
//! Grounded in `ivy_collision::primitives::{Sphere, Cube}`, adapted from
//! local-space `CollisionPrimitive` shapes to the world-space `Body`
//! capability this crate consumes.

use glam::{Mat4, Vec3};

use crate::support::{Body, BodyId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub id: BodyId,
    pub radius: f32,
    pub center: Vec3,
    pub restitution: f32,
    pub friction: f32,
}

impl Sphere {
    pub fn new(radius: f32, center: Vec3) -> Self {
        Self {
            id: BodyId(0),
            radius,
            center,
            restitution: 0.0,
            friction: 0.5,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = BodyId(id);
        self
    }
}

impl Body for Sphere {
    fn id(&self) -> BodyId {
        self.id
    }

    fn support(&self, dir: Vec3) -> Vec3 {
        self.center + self.radius * dir.normalize_or_zero()
    }

    fn position(&self) -> Vec3 {
        self.center
    }

    fn transform_inverse(&self) -> Mat4 {
        Mat4::from_translation(-self.center)
    }

    fn restitution(&self) -> f32 {
        self.restitution
    }

    fn friction(&self) -> f32 {
        self.friction
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cuboid {
    pub id: BodyId,
    pub half_extents: Vec3,
    pub center: Vec3,
    pub restitution: f32,
    pub friction: f32,
}

impl Cuboid {
    pub fn new(half_extents: Vec3, center: Vec3) -> Self {
        Self {
            id: BodyId(0),
            half_extents,
            center,
            restitution: 0.0,
            friction: 0.5,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = BodyId(id);
        self
    }
}

impl Body for Cuboid {
    fn id(&self) -> BodyId {
        self.id
    }

    fn support(&self, dir: Vec3) -> Vec3 {
        let local = Vec3::new(
            if dir.x >= 0.0 {
                self.half_extents.x
            } else {
                -self.half_extents.x
            },
            if dir.y >= 0.0 {
                self.half_extents.y
            } else {
                -self.half_extents.y
            },
            if dir.z >= 0.0 {
                self.half_extents.z
            } else {
                -self.half_extents.z
            },
        );

        self.center + local
    }

    fn position(&self) -> Vec3 {
        self.center
    }

    fn transform_inverse(&self) -> Mat4 {
        Mat4::from_translation(-self.center)
    }

    fn restitution(&self) -> f32 {
        self.restitution
    }

    fn friction(&self) -> f32 {
        self.friction
    }
}

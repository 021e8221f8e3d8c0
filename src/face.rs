use glam::Vec3;
use slotmap::new_key_type;

use crate::support::SupportPoint;

new_key_type! {
    /// Stable identifier for a [`Face`] inside a [`crate::polyhedron::Polyhedron`]'s
    /// slab. Dead (inactive) faces keep their id until the polyhedron itself
    /// is dropped.
    pub struct FaceId;
}

/// One triangle of the EPA polytope.
///
/// `neighbors[i]` is the face sharing the edge *opposite* vertex `i`:
/// `neighbors[0]` shares edge `a<->b`, `neighbors[1]` shares `b<->c`,
/// `neighbors[2]` shares `c<->a`.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    pub vertices: [SupportPoint; 3],
    pub normal: Vec3,
    pub active: bool,
    pub neighbors: [FaceId; 3],
}

impl Face {
    pub fn new(a: SupportPoint, b: SupportPoint, c: SupportPoint) -> Self {
        let normal = (b.point - a.point).cross(c.point - a.point).normalize();
        Self {
            vertices: [a, b, c],
            normal,
            active: true,
            neighbors: [FaceId::null(); 3],
        }
    }

    #[inline]
    pub fn a(&self) -> SupportPoint {
        self.vertices[0]
    }

    #[inline]
    pub fn b(&self) -> SupportPoint {
        self.vertices[1]
    }

    #[inline]
    pub fn c(&self) -> SupportPoint {
        self.vertices[2]
    }

    /// `dot(normal, vertex) - dot(normal, a)`. Positive iff `vertex` sees
    /// this face's outward side.
    #[inline]
    pub fn classify(&self, vertex: Vec3) -> f32 {
        self.normal.dot(vertex) - self.normal.dot(self.vertices[0].point)
    }

    #[inline]
    pub fn is_visible_from(&self, point: Vec3) -> bool {
        self.classify(point) > 0.0
    }

    /// The three (ordered) edges of this face, indexed the same way as
    /// `neighbors`: `edges()[0]` is the `a->b` edge shared with
    /// `neighbors[0]`, and so on.
    pub fn edges(&self) -> [(SupportPoint, SupportPoint); 3] {
        [
            (self.vertices[0], self.vertices[1]),
            (self.vertices[1], self.vertices[2]),
            (self.vertices[2], self.vertices[0]),
        ]
    }
}

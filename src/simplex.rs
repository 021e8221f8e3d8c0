use arrayvec::ArrayVec;
use glam::Vec3;
use ordered_float::OrderedFloat;

use crate::pool::{Handle, SupportPointPool};
use crate::support::{find_support, Body, SupportPoint};
use crate::util::{is_near_zero, triple_prod};
use crate::EPSILON;

/// Outcome of one [`Simplex::step`].
#[derive(Debug)]
pub enum StepResult {
    /// A new support point was added; the caller should loop.
    Continue(Handle<SupportPoint>),
    /// The Minkowski difference provably excludes the origin.
    Separated,
    /// The simplex is a tetrahedron enclosing the origin; EPA may proceed.
    Enclosed,
}

enum SimplexUpdate {
    Direction(Vec3),
    Enclosed,
}

/// GJK's 1..4-point simplex state machine over the Minkowski difference.
///
/// Points are stored oldest-first, newest-last: for a 4-point simplex
/// `(a, b, c, d) = (points[3], points[2], points[1], points[0])`; for a
/// triangle `(a, b, c) = (points[2], points[1], points[0])`; for a segment
/// `(a, b) = (points[1], points[0])`. Points are
/// referenced by [`Handle`] into a [`SupportPointPool`] rather than stored
/// inline, so dimensional reduction releases the discarded vertex instead
/// of merely dropping a value.
#[derive(Debug)]
pub struct Simplex {
    points: ArrayVec<Handle<SupportPoint>, 4>,
    next_direction: Vec3,
    iterations: usize,
}

impl Simplex {
    /// Seeds the simplex with a single support point in the initial search
    /// direction `b.position() - a.position()` (or `Vec3::X` if that is
    /// numerically zero, e.g. concentric bodies).
    pub fn new<A: Body, B: Body>(a: &A, b: &B, pool: &mut SupportPointPool) -> Self {
        let mut dir = b.position() - a.position();
        if is_near_zero(dir) {
            dir = Vec3::X;
        }

        let sp = find_support(a, b, dir);
        let handle = pool.acquire(sp);

        let mut points = ArrayVec::new();
        points.push(handle);

        Self {
            points,
            next_direction: -sp.point,
            iterations: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn next_direction(&self) -> Vec3 {
        self.next_direction
    }

    /// Releases every point still held by this simplex back to the pool.
    /// Called by the Driver when GJK proves separation; must NOT be called
    /// after the points have been handed off to a [`crate::polyhedron::Polyhedron`]
    /// (see [`Self::into_handles`]).
    pub fn release_all(&mut self, pool: &mut SupportPointPool) {
        for handle in self.points.drain(..) {
            let _ = pool.release(handle);
        }
    }

    /// Consumes the (necessarily 4-point) simplex, handing its points to
    /// the caller without releasing them. Used at the GJK -> EPA boundary
    /// to transfer ownership into the initial EPA polyhedron.
    pub fn into_handles(mut self) -> [Handle<SupportPoint>; 4] {
        debug_assert_eq!(self.points.len(), 4);
        [
            self.points[0],
            self.points[1],
            self.points[2],
            self.points.pop().unwrap(),
        ]
    }

    fn get(&self, pool: &SupportPointPool, idx: usize) -> SupportPoint {
        *pool.get(self.points[idx])
    }

    fn discard(&mut self, pool: &mut SupportPointPool, idx: usize) {
        let handle = self.points.remove(idx);
        let _ = pool.release(handle);
    }

    /// Attempts to grow or reduce the simplex toward the origin.
    pub fn step<A: Body, B: Body>(
        &mut self,
        a: &A,
        b: &B,
        pool: &mut SupportPointPool,
    ) -> StepResult {
        if self.iterations >= crate::MAX_ITER {
            return StepResult::Separated;
        }

        let dir = self.next_direction;
        let s = find_support(a, b, dir);

        if s.point.dot(dir) < 0.0 {
            return StepResult::Separated;
        }

        let handle = pool.acquire(s);
        self.points.push(handle);
        self.iterations += 1;

        match self.update_direction(pool) {
            SimplexUpdate::Enclosed => StepResult::Enclosed,
            SimplexUpdate::Direction(dir) => {
                self.next_direction = dir;
                StepResult::Continue(handle)
            }
        }
    }

    fn update_direction(&mut self, pool: &mut SupportPointPool) -> SimplexUpdate {
        match self.points.len() {
            1 => {
                let a = self.get(pool, 0);
                SimplexUpdate::Direction(-a.point)
            }
            2 => self.find_from_line(pool),
            3 => self.find_from_triangle(pool),
            4 => self.find_from_tetrahedron(pool),
            _ => unreachable!("simplex cannot exceed 4 points"),
        }
    }

    fn find_from_line(&mut self, pool: &mut SupportPointPool) -> SimplexUpdate {
        let b = self.get(pool, 0);
        let a = self.get(pool, 1);

        let ab = b.point - a.point;
        let ao = -a.point;

        if ab.dot(ao) < 0.0 {
            // A is the only useful vertex.
            self.discard(pool, 0);
            SimplexUpdate::Direction(ao)
        } else {
            let dir = triple_prod(ab, ao, ab);
            if is_near_zero(dir) {
                // ab parallel to ao: degenerate, pick any perpendicular fallback.
                let fallback = Vec3::ONE - ab.normalize().abs();
                SimplexUpdate::Direction(fallback)
            } else {
                SimplexUpdate::Direction(dir)
            }
        }
    }

    fn find_from_triangle(&mut self, pool: &mut SupportPointPool) -> SimplexUpdate {
        let c = self.get(pool, 0);
        let b = self.get(pool, 1);
        let a = self.get(pool, 2);

        let ao = -a.point;
        let ab = b.point - a.point;
        let ac = c.point - a.point;
        let n = ab.cross(ac);
        let e_ab = ab.cross(n);
        let e_ac = n.cross(ac);

        if e_ac.dot(ao) >= 0.0 {
            if ac.dot(ao) >= 0.0 {
                // Edge AC region: keep (C, A), drop B.
                self.discard(pool, 1);
                SimplexUpdate::Direction(triple_prod(ac, ao, ac))
            } else if ab.dot(ao) >= 0.0 {
                // Edge AB region: keep (B, A), drop C.
                self.discard(pool, 0);
                SimplexUpdate::Direction(triple_prod(ab, ao, ab))
            } else {
                self.reduce_to_vertex_a(pool)
            }
        } else if e_ab.dot(ao) >= 0.0 {
            if ab.dot(ao) >= 0.0 {
                self.discard(pool, 0);
                SimplexUpdate::Direction(triple_prod(ab, ao, ab))
            } else {
                self.reduce_to_vertex_a(pool)
            }
        } else if n.dot(ao) >= 0.0 {
            // Origin above the triangle. Points stay (C, B, A), not
            // rewound, so the tetrahedron case below sees a consistent
            // orientation.
            SimplexUpdate::Direction(n)
        } else {
            SimplexUpdate::Direction(-n)
        }
    }

    /// Origin lies in vertex A's Voronoi region: drop B and C, keeping only A.
    fn reduce_to_vertex_a(&mut self, pool: &mut SupportPointPool) -> SimplexUpdate {
        self.discard(pool, 1);
        self.discard(pool, 0);
        let a = self.get(pool, 0);
        SimplexUpdate::Direction(-a.point)
    }

    fn find_from_tetrahedron(&mut self, pool: &mut SupportPointPool) -> SimplexUpdate {
        let d = self.points[0];
        let c = self.points[1];
        let b = self.points[2];
        let a = self.points[3];

        let dv = *pool.get(d);
        let cv = *pool.get(c);
        let bv = *pool.get(b);
        let av = *pool.get(a);

        // (vertices in face order, the vertex discarded if this face is selected)
        let candidates = [
            ([b, c, d], [bv, cv, dv], a),
            ([a, c, b], [av, cv, bv], d),
            ([c, a, d], [cv, av, dv], b),
            ([d, a, b], [dv, av, bv], c),
        ];

        let best = candidates
            .into_iter()
            .filter_map(|(handles, values, discard)| {
                let [p0, p1, p2] = values;
                let centroid = p0.point + p1.point + p2.point;
                let origin_from_centroid = (-centroid).normalize();
                let normal = (p1.point - p0.point).cross(p2.point - p0.point).normalize();
                let value = normal.dot(origin_from_centroid);
                (value > EPSILON).then_some((value, handles, discard))
            })
            .max_by_key(|&(value, _, _)| OrderedFloat(value));

        match best {
            None => SimplexUpdate::Enclosed,
            Some((_, handles, discard)) => {
                self.points.clear();
                for h in handles {
                    self.points.push(h);
                }
                let _ = pool.release(discard);

                let [p0, p1, p2] = handles.map(|h| *pool.get(h));
                let normal = (p1.point - p0.point).cross(p2.point - p0.point).normalize();
                SimplexUpdate::Direction(normal)
            }
        }
    }
}

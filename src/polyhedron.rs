use glam::Vec3;
use ordered_float::OrderedFloat;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::error::Error;
use crate::face::{Face, FaceId};
use crate::pool::{Handle, SupportPointPool};
use crate::simplex::Simplex;
use crate::support::SupportPoint;
use crate::util::closest_point_on_triangle_to_origin;

/// One horizon edge discovered by [`Polyhedron::silhouette`], recorded as a
/// flat tuple to avoid a per-edge allocation.
struct HorizonEdge {
    /// The still-active face bordering the visible region.
    outer_face: FaceId,
    /// Which of `outer_face`'s neighbor slots pointed at the now-dead face.
    outer_neighbor_idx: usize,
    b: SupportPoint,
    a: SupportPoint,
}

/// The growing convex hull of CSO support points EPA maintains, stored as a
/// slab of [`Face`]s addressed by stable [`FaceId`]s. Dead faces stay in
/// the slab until the whole polyhedron is dropped, keeping neighbor ids
/// valid throughout EPA.
#[derive(Debug)]
pub struct Polyhedron {
    faces: SlotMap<FaceId, Face>,
    /// Every pool handle that has become a vertex of the hull, each
    /// recorded exactly once regardless of how many faces reference it.
    /// Lets `release_all` deduplicate vertices shared across faces without
    /// scanning the face list.
    vertex_handles: Vec<Handle<SupportPoint>>,
    pub closest_face: FaceId,
    pub closest_face_distance: f32,
    pub closest_point: Vec3,
}

impl Polyhedron {
    /// Builds the initial tetrahedron from a 4-point GJK simplex that
    /// proved enclosure. Consumes the simplex's support-point handles
    /// directly (ownership transfer at the GJK -> EPA boundary) rather
    /// than re-acquiring them from the pool.
    ///
    /// Winding: reuses exactly the four face orderings the simplex's
    /// tetrahedron case already evaluates —
    /// `(B,C,D)`, `(A,C,B)`, `(C,A,D)`, `(D,A,B)` — verified outward-facing
    /// and mutually consistent by the unit test below (P7, P8 immediately
    /// after construction).
    pub fn from_simplex(simplex: Simplex, pool: &SupportPointPool) -> Self {
        let [d, c, b, a] = simplex.into_handles();

        let get = |h: Handle<SupportPoint>| *pool.get(h);

        let mut faces = SlotMap::with_key();
        let f0 = faces.insert(Face::new(get(b), get(c), get(d)));
        let f1 = faces.insert(Face::new(get(a), get(c), get(b)));
        let f2 = faces.insert(Face::new(get(c), get(a), get(d)));
        let f3 = faces.insert(Face::new(get(d), get(a), get(b)));

        wire_neighbors(&mut faces, &[f0, f1, f2, f3]);

        let mut poly = Self {
            faces,
            vertex_handles: vec![a, b, c, d],
            closest_face: f0,
            closest_face_distance: f32::INFINITY,
            closest_point: Vec3::ZERO,
        };
        poly.find_closest_face();
        poly
    }

    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id]
    }

    pub fn active_face_count(&self) -> usize {
        self.faces.values().filter(|f| f.active).count()
    }

    /// Finds the active face closest to the origin, via the standard
    /// barycentric/region projection.
    pub fn find_closest_face(&mut self) {
        let closest = self
            .faces
            .iter()
            .filter(|(_, face)| face.active)
            .map(|(id, face)| {
                let p =
                    closest_point_on_triangle_to_origin(face.a().point, face.b().point, face.c().point);
                (id, p, p.length_squared())
            })
            .min_by_key(|&(_, _, dist)| OrderedFloat(dist));

        if let Some((id, point, dist)) = closest {
            self.closest_face = id;
            self.closest_face_distance = dist;
            self.closest_point = point;
        }
    }

    /// Marks every face visible from `point` inactive, recording the
    /// horizon edges into `edges`.
    /// Hosted on `Polyhedron` rather than `Face` because the traversal
    /// needs to reach sibling faces through the slab.
    fn silhouette(
        &mut self,
        face_id: FaceId,
        point: Vec3,
        edges: &mut SmallVec<[HorizonEdge; 16]>,
        source: Option<FaceId>,
    ) {
        if !self.faces[face_id].active {
            return;
        }

        if self.faces[face_id].is_visible_from(point) {
            self.faces[face_id].active = false;
            let neighbors = self.faces[face_id].neighbors;
            for neighbor in neighbors {
                self.silhouette(neighbor, point, edges, Some(face_id));
            }
        } else if let Some(source) = source {
            let face = &self.faces[face_id];
            let neighbor_idx = face
                .neighbors
                .iter()
                .position(|&n| n == source)
                .expect("source must be a neighbor of the horizon face");
            let (a, b) = face.edges()[neighbor_idx];
            edges.push(HorizonEdge {
                outer_face: face_id,
                outer_neighbor_idx: neighbor_idx,
                b,
                a,
            });
        }
    }

    /// Inserts the support point at `handle`, carving the silhouette of
    /// faces visible from it and re-stitching the horizon into a fan of new
    /// faces.
    pub fn add_vertex(
        &mut self,
        handle: Handle<SupportPoint>,
        pool: &SupportPointPool,
    ) -> Result<(), Error> {
        let v = *pool.get(handle);

        let mut edges = SmallVec::<[HorizonEdge; 16]>::new();
        self.silhouette(self.closest_face, v.point, &mut edges, None);

        reorder_into_cycle(&mut edges)?;

        let mut new_faces = SmallVec::<[FaceId; 16]>::new();
        for edge in &edges {
            let mut face = Face::new(edge.b, v, edge.a);
            face.neighbors[2] = edge.outer_face;
            let new_id = self.faces.insert(face);
            self.faces[edge.outer_face].neighbors[edge.outer_neighbor_idx] = new_id;
            new_faces.push(new_id);
        }

        let n = new_faces.len();
        for i in 0..n {
            let next = new_faces[(i + 1) % n];
            let prev = new_faces[(i + n - 1) % n];
            let face = &mut self.faces[new_faces[i]];
            face.neighbors[0] = next;
            face.neighbors[1] = prev;
        }

        self.vertex_handles.push(handle);

        Ok(())
    }

    /// Barycentric world/local witnesses of the closest point `p` on
    /// `face`, used by `build_contact`.
    pub fn contact_witnesses(&self, face: &Face, p: Vec3) -> (Vec3, Vec3, (f32, f32, f32)) {
        let (u, v, w) =
            crate::util::barycentric(p, face.a().point, face.b().point, face.c().point);

        let in_a = face.a().witness_a * u + face.b().witness_a * v + face.c().witness_a * w;
        let in_b = face.a().witness_b * u + face.b().witness_b * v + face.c().witness_b * w;

        (in_a, in_b, (u, v, w))
    }

    /// Releases every support point this polyhedron ever acquired as a
    /// vertex back to the pool, exactly once per vertex even though many
    /// faces may reference the same one.
    pub fn release_all(self, pool: &mut SupportPointPool) {
        for handle in self.vertex_handles {
            let _ = pool.release(handle);
        }
    }
}

/// Rotates a flat, unordered list of horizon edges into a single closed
/// cycle: for each successive slot, ensure `edges[i].a == edges[i-1].b`,
/// scanning forward and swapping if not.
///
/// Resolves Open Question 3: the source's loop bound `i < edges.len() - 5`
/// left the final edge unchecked. Here the loop runs over the full range
/// and the result is verified to close into a single cycle; a polytope
/// that doesn't (only possible under numerical error on a convex hull) is
/// rejected rather than silently stitched wrong.
fn reorder_into_cycle(edges: &mut SmallVec<[HorizonEdge; 16]>) -> Result<(), Error> {
    if edges.is_empty() {
        return Err(Error::OpenSilhouette);
    }

    for i in 1..edges.len() {
        if edges[i].a.point != edges[i - 1].b.point {
            let prev_b = edges[i - 1].b.point;
            match (i + 1..edges.len()).find(|&j| edges[j].a.point == prev_b) {
                Some(j) => edges.swap(i, j),
                None => return Err(Error::OpenSilhouette),
            }
        }
    }

    if edges.last().unwrap().b.point != edges[0].a.point {
        return Err(Error::OpenSilhouette);
    }

    Ok(())
}

/// Wires `neighbors` for a closed set of faces by matching each directed
/// edge `(x, y)` in one face against its reverse `(y, x)` in another. Used
/// once, for the initial tetrahedron built from a GJK simplex.
fn wire_neighbors(faces: &mut SlotMap<FaceId, Face>, ids: &[FaceId]) {
    for &id in ids {
        for edge_idx in 0..3 {
            if faces[id].neighbors[edge_idx] != FaceId::default() {
                continue;
            }
            let (x, y) = faces[id].edges()[edge_idx];
            for &other in ids {
                if other == id {
                    continue;
                }
                if let Some(other_idx) = faces[other]
                    .edges()
                    .iter()
                    .position(|&(ox, oy)| ox.point == y.point && oy.point == x.point)
                {
                    faces[id].neighbors[edge_idx] = other;
                    faces[other].neighbors[other_idx] = id;
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Sphere;
    use crate::simplex::{Simplex, StepResult};

    fn enclosed_simplex() -> (Simplex, SupportPointPool, Sphere, Sphere) {
        let mut pool = SupportPointPool::new();
        let a = Sphere::new(1.0, Vec3::ZERO);
        let b = Sphere::new(1.0, Vec3::new(1.5, 0.0, 0.0));
        let mut simplex = Simplex::new(&a, &b, &mut pool);

        loop {
            match simplex.step(&a, &b, &mut pool) {
                StepResult::Continue(_) => continue,
                StepResult::Enclosed => break,
                StepResult::Separated => panic!("expected enclosure"),
            }
        }

        (simplex, pool, a, b)
    }

    #[test]
    fn initial_tetrahedron_satisfies_face_invariants() {
        let (simplex, mut pool, _a, _b) = enclosed_simplex();
        let poly = Polyhedron::from_simplex(simplex, &pool);

        // P7: every active face's normal points away from the origin side
        // it was built from (a.p is on the plane, so dot(normal, a.p) > 0
        // for an outward normal when the origin is strictly inside).
        for face in poly.faces.values() {
            assert!(face.active);
            assert!(face.normal.dot(face.a().point) > 0.0);
        }

        // P8: every active face's every edge is shared with exactly one
        // other active face (all four neighbor slots resolved, no defaults).
        for face in poly.faces.values() {
            for &n in &face.neighbors {
                assert_ne!(n, FaceId::default());
                assert!(poly.faces[n].active);
            }
        }

        assert_eq!(poly.faces.len(), 4);
        assert_eq!(poly.vertex_handles.len(), 4);

        poly.release_all(&mut pool);
    }
}

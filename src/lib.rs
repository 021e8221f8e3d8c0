//! Narrow-phase convex collision detection core.
//!
//! Given two convex [`Body`] implementations, [`gjk_epa`] decides whether
//! they overlap and, if so, returns a [`ContactDetails`] manifold built from
//! a GJK distance test followed by EPA penetration-depth refinement.
//!
//! The broad-phase, the rigid-body representation, and the constraint
//! solver that would consume [`ContactDetails`] all live outside this
//! crate; it only consumes the [`Body`] capability and a [`SupportPointPool`]
//! to amortize allocation across queries.

mod contact;
mod driver;
mod error;
mod face;
mod pool;
mod polyhedron;
mod shapes;
mod simplex;
mod support;
mod util;

pub use contact::ContactDetails;
pub use driver::gjk_epa;
pub use error::{Error, Result};
pub use pool::{ContactPool, Handle, ObjectPool, SupportPointPool};
pub use shapes::{Cuboid, Sphere};
pub use support::{find_support, Body, BodyId, SupportPoint};

/// Shared numerical tolerance used throughout GJK/EPA, equivalent to the
/// consuming physics engine's own `EPSILON`.
pub const EPSILON: f32 = 1e-6;

/// Squared-length gap threshold used to decide EPA convergence.
pub const EPA_EPSILON: f32 = 1e-3;

/// Robustness cap shared by the GJK and EPA loops.
pub const MAX_ITER: usize = 20;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures from the ambient pool/polytope bookkeeping around GJK/EPA.
///
/// The GJK/EPA algorithms themselves have no fallible operations (spec
/// section 7): a query either converges to `Some(ContactDetails)` or falls
/// out to `None`. This enum only covers misuse of the surrounding pool
/// discipline, which is useful to surface in tests (P9) rather than silently
/// corrupting state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("handle was already released from the pool")]
    DoubleRelease,
    #[error("silhouette did not close into a single cycle; rejecting EPA iteration")]
    OpenSilhouette,
}

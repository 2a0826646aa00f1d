//! Errors surfaced by layout construction.
//!
//! Argument sanity is checked by the caller before any constructor runs, so
//! malformed input is an `assert!`, not a variant here. What remains are the
//! faults a correct caller can still hit.

use crate::TypeId;

/// Constructor or pool failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// The block-count scan could not reserve its scratch buffer.
    #[error("out of memory reserving {requested} bytes of scratch space")]
    OutOfMemory { requested: usize },

    /// The combinator has no layout rule at this layer.
    #[error("the {combiner} combinator is not supported")]
    Unsupported { combiner: &'static str },

    /// The handle was freed, or never issued by this pool.
    #[error("unknown datatype handle {id:?}")]
    UnknownType { id: TypeId },
}

use crate::markers::MarkerKind;

/// Construction-time failure for a marker instantiation.
///
/// Wrong parameter arity is an authoring bug, so it fails at the point the
/// marker is built rather than surfacing later as a silently unclassified
/// field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkerError {
    /// The shape was applied to the wrong number of parameters.
    #[error("{kind} requires exactly {expected} parameter(s), got {got}")]
    Arity {
        kind: MarkerKind,
        expected: usize,
        got: usize,
    },
}

use thiserror::Error;

/// Engine error taxonomy. Validation failures carry the violated invariant
/// verbatim so the caller can surface it without re-deriving context.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A required numeric parameter is missing, non-finite, or violates a
    /// structural invariant. Never silently repaired.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Statistics were requested on a recovery distribution with no elements.
    #[error("statistics requested on an empty recovery distribution")]
    EmptyDistribution,

    /// A non-finite value appeared mid-run (extreme parameter combination).
    /// The run fails atomically; no partial distribution is returned.
    #[error("non-finite value during simulation: {0}")]
    NumericOverflow(String),

    /// The run was cancelled externally before completion.
    #[error("simulation cancelled")]
    Cancelled,
}

impl SimError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        SimError::InvalidParameter(msg.into())
    }
}

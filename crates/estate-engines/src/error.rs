//! Error types for the `estate-engines` crate.

/// A failure inside a sub-engine's `initialize` or `update`.
///
/// The orchestrator logs these and records them in the tick summary; a
/// failing engine never stops its siblings from running.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine found the game state in a shape it cannot process.
    #[error("{engine}: inconsistent state: {reason}")]
    InconsistentState {
        /// Engine that detected the problem.
        engine: &'static str,
        /// What is inconsistent.
        reason: String,
    },

    /// A checked arithmetic operation overflowed.
    #[error("{engine}: arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        /// Engine that overflowed.
        engine: &'static str,
        /// Operation that overflowed.
        operation: &'static str,
    },

    /// The engine was updated before being initialized.
    #[error("{engine}: not initialized")]
    NotInitialized {
        /// Engine concerned.
        engine: &'static str,
    },

    /// Any other failure.
    #[error("{engine}: {reason}")]
    Failed {
        /// Engine concerned.
        engine: &'static str,
        /// Explanation.
        reason: String,
    },
}

impl EngineError {
    /// Name of the engine that raised the error.
    pub const fn engine(&self) -> &'static str {
        match self {
            Self::InconsistentState { engine, .. }
            | Self::ArithmeticOverflow { engine, .. }
            | Self::NotInitialized { engine }
            | Self::Failed { engine, .. } => engine,
        }
    }
}

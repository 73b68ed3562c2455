//! Error types for the simulation binary.
//!
//! [`SimError`] wraps every failure mode of startup and the run so that
//! `main` can propagate with `?`.

/// Top-level error for the simulation binary.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: estate_core::config::ConfigError,
    },

    /// The orchestrator could not be built or the save could not be loaded.
    #[error("orchestrator error: {source}")]
    Orchestrator {
        /// The underlying orchestrator error.
        #[from]
        source: estate_core::OrchestratorError,
    },

    /// The tick loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: estate_core::RunnerError,
    },

    /// The log filter directive is invalid.
    #[error("invalid log filter {directive:?}: {message}")]
    LogFilter {
        /// Directive from the config.
        directive: String,
        /// Parser message.
        message: String,
    },
}

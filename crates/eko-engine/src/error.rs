//! Error type for the engine binary.

/// Top-level error for the engine binary.
///
/// Each variant wraps a subsystem error so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: eko_core::ConfigError,
    },

    /// Connecting to or migrating the store failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: eko_db::DbError,
    },

    /// A startup job failed.
    #[error("service error: {source}")]
    Service {
        /// The underlying service error.
        #[from]
        source: eko_core::ServiceError,
    },

    /// Installing the shutdown signal handler failed.
    #[error("signal error: {0}")]
    Signal(std::io::Error),
}

//! Error types for sqlbench.

use thiserror::Error;

/// Result type for sqlbench operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error type for sqlbench.
///
/// Every variant is fatal to the scenario that produced it. The harness never
/// retries: a retried call would be measured as if it were a single call.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed connection descriptor or pool sizing
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A connection could not be established or obtained
    #[error("Connection error: {0}")]
    Connection(String),

    /// Preparing a statement failed
    #[error("Statement error: {0}")]
    Statement(String),

    /// A query or statement failed while executing
    #[error("Execution error: {0}")]
    Execution(String),

    /// A result row did not match the typed destination
    #[error("Decode error: {0}")]
    Decode(String),

    /// One or more workers of a pooled iteration failed
    #[error("{failed} of {workers} workers failed, first failure: {first}")]
    Worker {
        failed: usize,
        workers: usize,
        first: Box<Error>,
    },

    /// Caller contract violation (placeholder mismatch, zero workers, ...)
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure attributed to a scenario and, when known, a repetition
    #[error("scenario `{scenario}` failed{}: {source}", fmt_repetition(.repetition, .warmup))]
    Scenario {
        scenario: &'static str,
        repetition: Option<u64>,
        /// The repetition was an untimed warmup run
        warmup: bool,
        #[source]
        source: Box<Error>,
    },
}

fn fmt_repetition(repetition: &Option<u64>, warmup: &bool) -> String {
    match (repetition, *warmup) {
        (Some(n), true) => format!(" at warmup repetition {}", n),
        (Some(n), false) => format!(" at repetition {}", n),
        (None, _) => String::new(),
    }
}

impl Error {
    /// Returns true if the error indicates the connection is broken and cannot be reused.
    pub fn is_connection_broken(&self) -> bool {
        match self {
            Error::Io(_) | Error::Connection(_) => true,
            Error::Scenario { source, .. } => source.is_connection_broken(),
            _ => false,
        }
    }

    /// Attach scenario context. Already-attributed errors are returned unchanged.
    pub fn in_scenario(self, scenario: &'static str, repetition: Option<u64>) -> Self {
        self.attribute(scenario, repetition, false)
    }

    /// Attach scenario context for a failed warmup run.
    pub fn in_warmup(self, scenario: &'static str, repetition: u64) -> Self {
        self.attribute(scenario, Some(repetition), true)
    }

    fn attribute(self, scenario: &'static str, repetition: Option<u64>, warmup: bool) -> Self {
        match self {
            err @ Error::Scenario { .. } => err,
            err => Error::Scenario {
                scenario,
                repetition,
                warmup,
                source: Box::new(err),
            },
        }
    }

    /// The innermost error, skipping scenario context.
    pub fn root(&self) -> &Error {
        match self {
            Error::Scenario { source, .. } => source.root(),
            err => err,
        }
    }
}

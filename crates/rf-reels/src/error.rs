//! Error types for the reel bank

use thiserror::Error;

/// Reel bank error types
///
/// Everything except the config and IO variants is an invariant violation:
/// the caller wired the bank wrong, and the operation is aborted rather than
/// corrected.
#[derive(Error, Debug)]
pub enum ReelError {
    /// `spin()` on a reel that has not landed yet
    #[error("Reel {reel} is already spinning")]
    AlreadySpinning { reel: usize },

    /// Completion delivered to a reel that is not spinning
    #[error("Reel {reel} reported completion while idle")]
    UnexpectedCompletion { reel: usize },

    /// Second stop report for the same reel in one cycle
    #[error("Reel {reel} already reported a stop in cycle {cycle}")]
    DuplicateStop { reel: usize, cycle: u64 },

    /// New spin requested before the barrier fired
    #[error("Spin cycle {cycle} still in progress")]
    SpinInProgress { cycle: u64 },

    /// Payline with the wrong number of symbols
    #[error("Payline length mismatch: expected {expected}, got {got}")]
    PaylineLength { expected: usize, got: usize },

    /// Reel index outside `0..REEL_COUNT`
    #[error("Reel index {reel} out of range (reel count {count})")]
    ReelOutOfRange { reel: usize, count: usize },

    /// Renderer has no texture for a symbol id
    #[error("No texture registered for symbol {id}")]
    MissingTexture { id: u32 },

    /// Sprite handle no longer resolves
    #[error("Sprite {id} no longer exists")]
    StaleSprite { id: u64 },

    /// Config failed validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Config could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for reel bank operations
pub type ReelResult<T> = Result<T, ReelError>;

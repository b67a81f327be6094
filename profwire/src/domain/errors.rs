//! Structured error types for profwire
//!
//! Using thiserror for automatic Display implementation and error chaining.

use thiserror::Error;

/// Errors surfaced while streaming or finalizing a profile.
///
/// The only fallible operations in the write path are pushes into the
/// compression filter and the final close of the compressed stream; both
/// carry the underlying I/O error. Symbolization misses and unmatched
/// mappings are degraded-but-valid results, not errors.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("failed to write profile data to destination: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to finalize compressed profile stream: {0}")]
    Finish(#[source] std::io::Error),
}

//! Locating the external `op` binary

use std::path::PathBuf;
use tracing::debug;

use crate::error::{EnvelopeError, Result};
use crate::op::OP_BINARY;

/// Resolve `name` against the executable search path
pub fn locate(name: &str) -> Option<PathBuf> {
    match which::which(name) {
        Ok(path) => {
            debug!(binary = name, path = %path.display(), "located binary");
            Some(path)
        }
        Err(e) => {
            debug!(binary = name, error = %e, "binary not found");
            None
        }
    }
}

/// Resolve the 1Password CLI, failing with [`EnvelopeError::BinaryNotFound`]
pub fn locate_op() -> Result<PathBuf> {
    locate(OP_BINARY).ok_or(EnvelopeError::BinaryNotFound)
}

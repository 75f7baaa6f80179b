//! Error taxonomy and classification of `op` failures

use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

/// Tag the 1Password CLI puts in front of its own error lines,
/// e.g. `[ERROR] 2024/01/01 12:00:00 item not found`.
pub const ERROR_TAG: &str = "[ERROR]";

pub type Result<T> = std::result::Result<T, EnvelopeError>;

/// Everything that can go wrong in an Envelope session
#[derive(Error, Debug)]
pub enum EnvelopeError {
    #[error("1Password CLI ('op') not found in your PATH.")]
    BinaryNotFound,

    /// Already classified, see [`classify`]
    #[error("{0}")]
    ExternalTool(String),

    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("no items found in vault '{0}'")]
    EmptyResult(String),

    #[error("failed to write {}: {source}", .path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Turn the combined output of a failed `op` invocation into a clean error.
///
/// `op` reports failures as `[ERROR] <timestamp> <message>`. When the output
/// splits into exactly three whitespace-separated tokens and the first one
/// carries the tag, only the message survives. Anything else keeps the raw
/// process failure and the full output so nothing is lost for diagnosis.
pub fn classify(output: &str, failure: impl Display) -> EnvelopeError {
    let output = output.trim();
    // Every whitespace char is a separator and repeated separators yield empty
    // tokens, so `[ERROR]  a b` keeps `a b`. `op` itself only emits single spaces.
    let parts: Vec<&str> = output.splitn(3, char::is_whitespace).collect();

    if let [tag, _, message] = parts.as_slice() {
        if tag.starts_with(ERROR_TAG) {
            return EnvelopeError::ExternalTool(message.to_string());
        }
    }

    EnvelopeError::ExternalTool(format!(
        "op command failed: {failure}\nOutput: {output}"
    ))
}

//! JSON block parsing for the embody behavior realizer.
//!
//! Inbound blocks arrive as JSON objects with optional per-channel keys,
//! each holding one instruction object or an array of them, plus
//! `composition` and `start`. The parser emits IR; the engine never sees
//! unvalidated input.

mod parse;

pub use parse::parse_block;

/// Error type for block parsing.
///
/// Only structural problems error out. Per-instruction problems (bad
/// field types, missing lexemes) skip that instruction with a log line,
/// and unknown channel keys are ignored for forward compatibility.
#[derive(Debug, thiserror::Error)]
pub enum BmlError {
    /// The payload was not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level JSON value was not an object.
    #[error("block payload is not a JSON object")]
    NotAnObject,

    /// An instruction entry could not be built.
    #[error("bad {channel} instruction: {reason}")]
    BadInstruction {
        channel: &'static str,
        reason: &'static str,
    },
}

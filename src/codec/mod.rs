//! Encoding and decoding of session data.
//!
//! Persisted sessions use the classic line-item format: for every entry the
//! key, a `|`, and a self-delimiting serialized value, concatenated without
//! separators (`counter|i:3;user|s:5:"alice";`). Every item encoding declares
//! its own exact length, so the stream can be cut apart without ambiguity.
//! Anything reading the raw store bytes must speak the identical format.

mod decoder;
mod encoder;


pub use decoder::decode;
pub use encoder::encode;

/// Errors while decoding persisted session bytes.
///
/// Decoding never returns partial data: silently dropping half of a session
/// is worse than a visible failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CodecError {
    /// The input does not follow the session encoding
    #[error("corrupt session encoding at byte {offset}: {reason}")]
    Corrupt { offset: usize, reason: String },
}

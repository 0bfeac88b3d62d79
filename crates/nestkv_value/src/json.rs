//! Value-preserving JSON text encoding.
//!
//! Values are stored as compact JSON text. Encoding is deterministic
//! for a given value: object pairs are written in their stored order,
//! so decode-encode is the identity on well-formed stored text.

use crate::error::{CodecError, CodecResult};
use crate::value::Value;

/// Encodes a value to its JSON text form.
///
/// # Errors
///
/// Returns [`CodecError::NonFiniteFloat`] if the value contains a NaN
/// or infinite float, or [`CodecError::EncodingFailed`] if
/// serialization fails.
pub fn to_json_text(value: &Value) -> CodecResult<String> {
    if value.has_non_finite() {
        return Err(CodecError::NonFiniteFloat);
    }
    serde_json::to_string(value).map_err(|e| CodecError::encoding_failed(e.to_string()))
}

/// Decodes a value from its JSON text form.
///
/// # Errors
///
/// Returns [`CodecError::DecodingFailed`] if the text is not valid
/// JSON.
pub fn from_json_text(text: &str) -> CodecResult<Value> {
    serde_json::from_str(text).map_err(|e| CodecError::decoding_failed(e.to_string()))
}

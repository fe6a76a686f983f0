//! Encoding and decoding of annotation tokens.
//!
//! A token is the record serialized to canonical JSON, base64-encoded, and
//! wrapped in fixed framing:
//!
//! ```text
//! $imx$<base64 payload>$
//! ```
//!
//! The framing lengths are stable constants ([`TOKEN_HEADER`] is 5 bytes,
//! [`TOKEN_FOOTER`] is 1 byte); downstream consumers slice the payload out
//! at those fixed offsets. `$` is not part of the base64 alphabet, so the
//! token is also self-delimiting inside surrounding text and can never
//! contain the `*/` sequence that would close a SQL block comment.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;

use crate::record::AnnotationRecord;

/// Leading token frame. Fixed width: 5 bytes.
pub const TOKEN_HEADER: &str = "$imx$";

/// Trailing token frame. Fixed width: 1 byte.
pub const TOKEN_FOOTER: &str = "$";

/// Failure to decode a token back into a record.
///
/// Raised only on the decode path; the forward annotate path never returns
/// these.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("token too short to carry framing ({0} bytes)")]
    TooShort(usize),

    #[error("token framing is malformed")]
    BadFraming,

    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not a valid annotation record: {0}")]
    Record(#[from] serde_json::Error),
}

/// Serialize and frame a record into a transport-safe token.
pub fn encode(record: &AnnotationRecord) -> String {
    // Serializing a concrete struct with string keys cannot fail.
    let json = serde_json::to_vec(record).expect("annotation record serializes to JSON");
    format!("{TOKEN_HEADER}{}{TOKEN_FOOTER}", BASE64_STANDARD.encode(json))
}

/// Strip the framing from a token and reconstruct the record.
pub fn decode(token: &str) -> Result<AnnotationRecord, DecodeError> {
    if token.len() < TOKEN_HEADER.len() + TOKEN_FOOTER.len() {
        return Err(DecodeError::TooShort(token.len()));
    }
    let payload = token
        .strip_prefix(TOKEN_HEADER)
        .and_then(|rest| rest.strip_suffix(TOKEN_FOOTER))
        .ok_or(DecodeError::BadFraming)?;

    let json = BASE64_STANDARD.decode(payload)?;
    Ok(serde_json::from_slice(&json)?)
}

/// Slice the framed token out of annotated SQL.
///
/// Returns the token including its framing, ready for [`decode`], or `None`
/// when the text carries no token.
pub fn extract_token(sql: &str) -> Option<&str> {
    let start = sql.find(TOKEN_HEADER)?;
    let body = start + TOKEN_HEADER.len();
    let end = body + sql[body..].find(TOKEN_FOOTER)?;
    Some(&sql[start..end + TOKEN_FOOTER.len()])
}

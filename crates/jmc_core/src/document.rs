//! JSON input validation and file ingestion

use crate::Error;
use serde_json::Value;

/// Parse raw JSON text into a document.
///
/// Any syntax error collapses into [`Error::InvalidJson`]; the parser's own
/// message is not shown to the user.
///
/// # Example
/// ```
/// use jmc_core::parse_document;
///
/// assert!(parse_document(r#"{"a": 1}"#).is_ok());
/// assert_eq!(parse_document(r#"{"a":"#).unwrap_err().to_string(), "Invalid JSON");
/// ```
pub fn parse_document(text: &str) -> Result<Value, Error> {
    serde_json::from_str(text).map_err(|e| {
        tracing::debug!(error = %e, "rejected JSON input");
        Error::InvalidJson
    })
}

/// Pretty-print a JSON value with 2-space indentation.
pub fn pretty(value: &Value) -> String {
    // Serializing a `Value` into a string cannot fail.
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Decode an uploaded file as UTF-8 text.
///
/// Files are not filtered by type; malformed byte sequences become U+FFFD
/// and the text goes through [`parse_document`] like pasted input.
pub fn decode_upload(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

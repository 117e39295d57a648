//! jmc_core - natural-language to JMESPath playground core
//!
//! This library validates JSON documents, infers their structural shape,
//! composes query-generation requests for a chat-completion service and
//! evaluates JMESPath queries against the document.

pub mod document;
pub mod generator;
pub mod prompt;
pub mod query;
pub mod schema;
pub mod session;

pub use document::{decode_upload, parse_document, pretty};
pub use generator::QueryGenerator;
#[cfg(feature = "openai")]
pub use generator::OpenAiClient;
pub use prompt::{ChatMessage, QueryRequest, Role};
pub use query::{QueryResult, evaluate, run_query, sanitize_query};
pub use schema::{PrimitiveType, SchemaShape, infer};
pub use session::{Activity, Session};

/// Fixed message shown when the JSON input cannot be parsed.
pub const INVALID_JSON: &str = "Invalid JSON";

/// Error type for playground operations
///
/// Every variant except `InvalidJson` carries the underlying service or
/// evaluator message unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Invalid JSON")]
    InvalidJson,

    #[error("{0}")]
    InvalidCredential(String),

    #[error("{0}")]
    GenerationFailed(String),

    #[error("{0}")]
    QueryEvaluationFailed(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invalid_json_message() {
        assert_eq!(Error::InvalidJson.to_string(), "Invalid JSON");
    }

    #[test]
    fn test_messages_are_verbatim() {
        let err = Error::GenerationFailed("Incorrect API key provided".to_string());
        assert_eq!(err.to_string(), "Incorrect API key provided");
    }

    #[test]
    fn test_live_query_end_to_end() {
        let json = parse_document(r#"{"a":[{"b":1}]}"#).unwrap();
        assert_eq!(run_query("a[0].b", &json), QueryResult::Output("1".to_string()));
    }

    #[test]
    fn test_schema_reexport() {
        let shape = infer(&json!({"a": [1, 2]}));
        assert_eq!(shape.to_string(), r#"{"a":["number"]}"#);
    }
}

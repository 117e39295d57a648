//! Chat-completion request composition

use crate::schema::SchemaShape;
use serde::{Deserialize, Serialize};

pub const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A role-tagged chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Schema plus user intent, consumed by one generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub schema: SchemaShape,
    pub intent: String,
}

impl QueryRequest {
    pub fn new(schema: SchemaShape, intent: impl Into<String>) -> Self {
        Self {
            schema,
            intent: intent.into(),
        }
    }

    /// User message embedding the compact schema and the intent.
    pub fn user_instruction(&self) -> String {
        format!(
            "I need a jmespath query, only reply with the raw jmespath query. \
             The json spec to follow is {} and I need the query to: {}. \
             only reply with the raw jmespath query ONLY RESPOND WITH RAW JMESPATH QUERY",
            self.schema, self.intent
        )
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(SYSTEM_INSTRUCTION),
            ChatMessage::user(self.user_instruction()),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::schema::infer;
    use serde_json::json;

    fn request() -> QueryRequest {
        QueryRequest::new(infer(&json!({"users": [{"name": "a"}]})), "list every user name")
    }

    #[test]
    fn test_user_instruction_embeds_schema_and_intent() {
        let text = request().user_instruction();
        let opening = "I need a jmespath query, only reply with the raw jmespath query.";
        assert!(text.starts_with(opening));
        assert!(text.contains(r#"The json spec to follow is {"users":[{"name":"string"}]} and"#));
        assert!(text.contains("I need the query to: list every user name."));
        assert!(text.contains("ONLY RESPOND WITH RAW JMESPATH QUERY"));
    }

    #[test]
    fn test_messages_order() {
        let messages = request().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatMessage::system("You are a helpful assistant."));
        assert_eq!(messages[1].role, Role::User);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let value = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(value, json!({"role": "user", "content": "hi"}));
    }
}

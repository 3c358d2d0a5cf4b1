use crate::models::Assistant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use validator::{Validate, ValidationError};

/// Rejects empty and whitespace-only strings with `message`.
fn require_text(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::Borrowed(message));
        return Err(err);
    }
    Ok(())
}

/// Reads `null` as an empty string so it is reported by validation rather
/// than rejected as a malformed body.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn name_present(value: &str) -> Result<(), ValidationError> {
    require_text(value, "Assistant name is required")
}

fn response_text_present(value: &str) -> Result<(), ValidationError> {
    require_text(value, "Response text is required")
}

fn message_present(value: &str) -> Result<(), ValidationError> {
    require_text(value, "Message is required and cannot be empty")
}

/// Body of `POST /api/assistants`. Missing and null fields deserialize as
/// empty so they are reported per field by validation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertAssistantRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(
        custom(function = "name_present"),
        length(
            max = 100,
            message = "Assistant name must not exceed 100 characters"
        )
    )]
    pub name: String,

    #[serde(default, rename = "responseText", deserialize_with = "null_as_empty")]
    #[validate(
        custom(function = "response_text_present"),
        length(
            max = 1000,
            message = "Response text must not exceed 1000 characters"
        )
    )]
    pub response_text: String,
}

/// Body of `POST /api/assistants/{name}/message`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MessageRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(
        custom(function = "message_present"),
        length(max = 500, message = "Message must not exceed 500 characters")
    )]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertAssistantResponse {
    pub success: bool,
    pub message: String,
    pub operation: String,
    pub assistant: Assistant,
}

/// Reply to a message. `response` is the stored text, untouched by the input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub assistant_name: String,
    pub response: String,
    pub original_message: String,
    pub timestamp: DateTime<Utc>,
}

impl MessageResponse {
    pub fn new(assistant: Assistant, original_message: String) -> Self {
        Self {
            assistant_name: assistant.name,
            response: assistant.response_text,
            original_message,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAssistantResponse {
    pub success: bool,
    pub message: String,
    pub assistant_name: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub total_assistants: usize,
    pub timestamp: DateTime<Utc>,
    pub endpoints: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDownResponse {
    pub status: String,
    pub error: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use service_core::error::field_messages;

    fn upsert(name: &str, text: &str) -> UpsertAssistantRequest {
        UpsertAssistantRequest {
            name: name.to_string(),
            response_text: text.to_string(),
        }
    }

    #[test]
    fn accepts_limits_inclusive() {
        let request = upsert(&"n".repeat(100), &"t".repeat(1000));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn rejects_101_character_name() {
        let errors = upsert(&"n".repeat(101), "Hi").validate().unwrap_err();
        let fields = field_messages(&errors);

        assert_eq!(
            fields.get("name").map(String::as_str),
            Some("Assistant name must not exceed 100 characters")
        );
        assert!(!fields.contains_key("responseText"));
    }

    #[test]
    fn counts_characters_not_bytes() {
        // 100 two-byte characters.
        let request = upsert(&"é".repeat(100), "Hi");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn reports_every_blank_field() {
        let errors = upsert("   ", "").validate().unwrap_err();
        let fields = field_messages(&errors);

        assert_eq!(
            fields.get("name").map(String::as_str),
            Some("Assistant name is required")
        );
        assert_eq!(
            fields.get("responseText").map(String::as_str),
            Some("Response text is required")
        );
    }

    #[test]
    fn missing_fields_deserialize_as_blank() {
        let request: UpsertAssistantRequest = serde_json::from_str("{}").unwrap();
        let fields = field_messages(&request.validate().unwrap_err());

        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("responseText"));
    }

    #[test]
    fn null_fields_deserialize_as_blank() {
        let request: UpsertAssistantRequest =
            serde_json::from_str(r#"{"name":null,"responseText":"Hi"}"#).unwrap();
        let fields = field_messages(&request.validate().unwrap_err());

        assert_eq!(
            fields.get("name").map(String::as_str),
            Some("Assistant name is required")
        );
        assert!(!fields.contains_key("responseText"));

        let message: MessageRequest = serde_json::from_str(r#"{"message":null}"#).unwrap();
        assert!(message.validate().is_err());
    }

    #[test]
    fn message_limit_is_500_characters() {
        let ok = MessageRequest {
            message: "m".repeat(500),
        };
        let too_long = MessageRequest {
            message: "m".repeat(501),
        };

        assert!(ok.validate().is_ok());
        let fields = field_messages(&too_long.validate().unwrap_err());
        assert_eq!(
            fields.get("message").map(String::as_str),
            Some("Message must not exceed 500 characters")
        );
    }

    #[test]
    fn message_response_echoes_stored_text() {
        let assistant = Assistant::new("Bot".to_string(), "Hi".to_string());

        let response = MessageResponse::new(assistant, "hello".to_string());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["assistantName"], "Bot");
        assert_eq!(json["response"], "Hi");
        assert_eq!(json["originalMessage"], "hello");
        assert!(json.get("timestamp").is_some());
    }
}

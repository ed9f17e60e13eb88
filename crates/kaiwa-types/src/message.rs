use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a conversation turn, fixed by the chat-completions protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl MessageRole {
    /// Lowercase name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }

    /// Parse a wire role, case-insensitively. Unrecognized values are
    /// rejected; defaulting for a *missing* role field is the codec's call.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "system" => Some(Self::System),
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            "tool" => Some(Self::Tool),
            _ => None,
        }
    }
}

/// One piece of message content.
///
/// A message holds at most one accumulating `Text` part and at most one
/// accumulating `Reasoning` part; `Image` parts may repeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagePart {
    Text { text: String },
    Image { url: String },
    Reasoning { reasoning: String },
}

/// Citation attached to a message as a whole, not to a specific part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageAnnotation {
    UrlCitation { title: String, url: String },
}

/// One turn in a conversation. Providers convert this into their own wire
/// DTOs; the reassembler grows it chunk by chunk during streaming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default = "generate_id")]
    pub id: String,
    pub role: MessageRole,
    pub parts: Vec<MessagePart>,
    #[serde(default)]
    pub annotations: Vec<MessageAnnotation>,
}

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

impl Message {
    pub fn new(role: MessageRole, parts: Vec<MessagePart>) -> Self {
        Self {
            id: generate_id(),
            role,
            parts,
            annotations: Vec::new(),
        }
    }

    /// Single-text-part message.
    pub fn text(role: MessageRole, text: impl Into<String>) -> Self {
        Self::new(role, vec![MessagePart::Text { text: text.into() }])
    }

    pub fn with_annotations(mut self, annotations: Vec<MessageAnnotation>) -> Self {
        self.annotations = annotations;
        self
    }

    /// Accumulated answer text, if any.
    pub fn text_content(&self) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            MessagePart::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Accumulated reasoning content, if any.
    pub fn reasoning_content(&self) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            MessagePart::Reasoning { reasoning } => Some(reasoning.as_str()),
            _ => None,
        })
    }

    /// Whether the message carries anything representable on the wire:
    /// a non-blank text part or at least one image.
    pub fn is_valid_to_upload(&self) -> bool {
        self.parts.iter().any(|part| match part {
            MessagePart::Text { text } => !text.trim().is_empty(),
            MessagePart::Image { .. } => true,
            MessagePart::Reasoning { .. } => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_wire_names() {
        for role in [
            MessageRole::System,
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::Tool,
        ] {
            assert_eq!(MessageRole::from_wire(role.as_str()), Some(role));
        }
    }

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!(MessageRole::from_wire("ASSISTANT"), Some(MessageRole::Assistant));
        assert_eq!(MessageRole::from_wire("User"), Some(MessageRole::User));
    }

    #[test]
    fn unrecognized_role_is_rejected() {
        assert_eq!(MessageRole::from_wire("developer"), None);
    }

    #[test]
    fn blank_text_is_not_uploadable() {
        let message = Message::text(MessageRole::User, "   ");
        assert!(!message.is_valid_to_upload());
    }

    #[test]
    fn image_alone_is_uploadable() {
        let message = Message::new(
            MessageRole::User,
            vec![MessagePart::Image {
                url: "file:///tmp/cat.png".to_string(),
            }],
        );
        assert!(message.is_valid_to_upload());
    }

    #[test]
    fn reasoning_alone_is_not_uploadable() {
        let message = Message::new(
            MessageRole::Assistant,
            vec![MessagePart::Reasoning {
                reasoning: "thinking".to_string(),
            }],
        );
        assert!(!message.is_valid_to_upload());
    }

    #[test]
    fn part_serde_uses_type_tag() {
        let part = MessagePart::Text {
            text: "hi".to_string(),
        };
        let json = serde_json::to_string(&part).unwrap();
        assert!(json.contains("\"type\":\"text\""));

        let annotation = MessageAnnotation::UrlCitation {
            title: "Docs".to_string(),
            url: "https://example.com".to_string(),
        };
        let json = serde_json::to_string(&annotation).unwrap();
        assert!(json.contains("\"type\":\"url_citation\""));
    }

    #[test]
    fn missing_id_gets_generated_on_deserialize() {
        let message: Message = serde_json::from_str(
            r#"{"role":"user","parts":[{"type":"text","text":"hi"}]}"#,
        )
        .unwrap();
        assert!(!message.id.is_empty());
        assert!(message.annotations.is_empty());
    }
}

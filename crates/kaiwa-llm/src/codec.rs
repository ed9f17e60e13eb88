//! Conversion between the message model and the provider's JSON shapes.
//!
//! Field names here are a wire contract with OpenAI-style APIs and must
//! match exactly; payloads are built by hand with `json!` rather than
//! derived so the contract stays visible in one place.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use kaiwa_types::{Choice, Message, MessageAnnotation, MessageChunk, MessagePart, MessageRole};

use crate::config::GenerationParams;
use crate::encode::encode_image_data_uri;
use crate::error::LlmError;
use crate::transform::{apply_transformers, MessageTransformer};

/// An available model as reported by the provider's listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub display_name: String,
}

/// Build the `/chat/completions` request body. Transformers run first, then
/// messages with nothing uploadable are dropped silently.
pub fn build_chat_completion_request(
    messages: Vec<Message>,
    params: &GenerationParams,
    stream: bool,
    transformers: &[Box<dyn MessageTransformer>],
) -> Value {
    let messages = apply_transformers(messages, transformers);
    json!({
        "model": params.model,
        "messages": build_messages(&messages),
        "temperature": params.temperature,
        "top_p": params.top_p,
        "stream": stream,
    })
}

fn build_messages(messages: &[Message]) -> Value {
    let encoded: Vec<Value> = messages
        .iter()
        .filter(|message| message.is_valid_to_upload())
        .map(|message| {
            json!({
                "role": message.role.as_str(),
                "content": build_content(message),
            })
        })
        .collect();
    Value::Array(encoded)
}

fn build_content(message: &Message) -> Value {
    let parts: Vec<Value> = message
        .parts
        .iter()
        .filter_map(|part| match part {
            MessagePart::Text { text } => Some(json!({ "type": "text", "text": text })),
            MessagePart::Image { url } => Some(match encode_image_data_uri(url) {
                Ok(data_uri) => json!({
                    "type": "image_url",
                    "image_url": { "url": data_uri },
                }),
                Err(error) => {
                    // Degrade rather than fail the whole request.
                    warn!(url = %url, %error, "image encoding failed, sending empty text");
                    json!({ "type": "text", "text": "" })
                }
            }),
            MessagePart::Reasoning { .. } => {
                debug!("reasoning parts have no wire representation, skipping");
                None
            }
        })
        .collect();
    Value::Array(parts)
}

/// Parse a `message` or `delta` object from a response.
///
/// A missing `role` defaults to assistant; an unrecognized role string is a
/// decode error. Reasoning content may arrive under either
/// `reasoning_content` or `reasoning` and precedes the text part.
pub fn parse_message(value: &Value) -> Result<Message, LlmError> {
    let role = match value.get("role").and_then(Value::as_str) {
        Some(name) => MessageRole::from_wire(name)
            .ok_or_else(|| LlmError::Decode(format!("unrecognized role: {name}")))?,
        None => MessageRole::Assistant,
    };

    let reasoning = value
        .get("reasoning_content")
        .or_else(|| value.get("reasoning"))
        .and_then(Value::as_str);

    let content = value.get("content").and_then(Value::as_str).unwrap_or("");

    let mut parts = Vec::new();
    if let Some(reasoning) = reasoning {
        parts.push(MessagePart::Reasoning {
            reasoning: reasoning.to_string(),
        });
    }
    parts.push(MessagePart::Text {
        text: content.to_string(),
    });

    let annotations = match value.get("annotations").and_then(Value::as_array) {
        Some(entries) => parse_annotations(entries)?,
        None => Vec::new(),
    };

    Ok(Message::new(role, parts).with_annotations(annotations))
}

/// Strict by intent: one malformed or unknown annotation fails the whole
/// message parse, never a partial list.
fn parse_annotations(entries: &[Value]) -> Result<Vec<MessageAnnotation>, LlmError> {
    entries
        .iter()
        .map(|entry| {
            let kind = entry
                .get("type")
                .and_then(Value::as_str)
                .ok_or_else(|| LlmError::Decode("annotation is missing a type".to_string()))?;
            match kind {
                "url_citation" => {
                    let citation = entry.get("url_citation");
                    let field = |name: &str| {
                        citation
                            .and_then(|c| c.get(name))
                            .and_then(Value::as_str)
                            .unwrap_or("")
                            .to_string()
                    };
                    Ok(MessageAnnotation::UrlCitation {
                        title: field("title"),
                        url: field("url"),
                    })
                }
                other => Err(LlmError::Decode(format!("unknown annotation type: {other}"))),
            }
        })
        .collect()
}

/// Parse a non-streaming completion body into a single-choice chunk.
pub fn parse_completion(body: &str) -> Result<MessageChunk, LlmError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| LlmError::Decode(format!("invalid completion body: {e}")))?;

    let id = string_field(&value, "id");
    let model = string_field(&value, "model");

    let choice = value
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or_else(|| LlmError::Decode("response has no choices".to_string()))?;

    let message = choice
        .get("message")
        .filter(|m| m.is_object())
        .ok_or_else(|| LlmError::Decode("choice has no message".to_string()))?;

    Ok(MessageChunk {
        id,
        model,
        choices: vec![Choice {
            index: 0,
            delta: None,
            message: Some(parse_message(message)?),
            finish_reason: finish_reason(choice),
        }],
    })
}

/// Parse one streaming event payload. A payload may carry several
/// newline-separated JSON objects; each becomes its own chunk, in order.
/// Objects without choices (keep-alive frames) are skipped.
pub fn parse_chunk_payload(payload: &str) -> Result<Vec<MessageChunk>, LlmError> {
    let mut chunks = Vec::new();
    for line in payload.trim().split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value: Value = serde_json::from_str(line)
            .map_err(|e| LlmError::Decode(format!("invalid chunk: {e}")))?;

        let Some(choice) = value
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
        else {
            continue;
        };

        let (delta, message) = if let Some(delta) = choice.get("delta").filter(|v| v.is_object()) {
            (Some(parse_message(delta)?), None)
        } else if let Some(complete) = choice.get("message").filter(|v| v.is_object()) {
            (None, Some(parse_message(complete)?))
        } else {
            return Err(LlmError::Decode(
                "chunk choice has neither delta nor message".to_string(),
            ));
        };

        chunks.push(MessageChunk {
            id: string_field(&value, "id"),
            model: string_field(&value, "model"),
            choices: vec![Choice {
                index: 0,
                delta,
                message,
                finish_reason: finish_reason(choice),
            }],
        });
    }
    Ok(chunks)
}

/// Parse the `/models` listing. Entries without an `id` are skipped; a
/// missing `data` field is an empty catalog, not an error.
pub fn parse_model_list(body: &str) -> Result<Vec<ModelInfo>, LlmError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| LlmError::Decode(format!("invalid model list: {e}")))?;

    let Some(data) = value.get("data").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    Ok(data
        .iter()
        .filter_map(|entry| {
            let id = entry.get("id").and_then(Value::as_str)?;
            Some(ModelInfo {
                id: id.to_string(),
                display_name: id.to_string(),
            })
        })
        .collect())
}

/// Pull a human-readable message out of a structured API error body:
/// `error.message` on an object, `[0].error.message` on an array.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = match &value {
        Value::Object(_) => value.get("error")?,
        Value::Array(entries) => entries.first()?.get("error")?,
        _ => return None,
    };
    error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn string_field(value: &Value, name: &str) -> String {
    value
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn finish_reason(choice: &Value) -> String {
    choice
        .get("finish_reason")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// One increment of model output for an exchange, streaming or final.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageChunk {
    pub id: String,
    pub model: String,
    pub choices: Vec<Choice>,
}

impl MessageChunk {
    /// This design only ever consumes the first choice.
    pub fn first_choice(&self) -> Option<&Choice> {
        self.choices.first()
    }
}

/// A single completion alternative. Exactly one of `delta` (streaming
/// partial) or `message` (complete) is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub index: u32,
    pub delta: Option<Message>,
    pub message: Option<Message>,
    pub finish_reason: String,
}

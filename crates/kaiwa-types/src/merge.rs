use thiserror::Error;
use tracing::warn;

use crate::chunk::MessageChunk;
use crate::message::{Message, MessagePart};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChunkError {
    #[error("messages must not be empty")]
    EmptyConversation,

    #[error("chunk carries neither delta nor message")]
    MissingPayload,
}

impl Message {
    /// Fold a streaming chunk's delta into this message, returning the grown
    /// message. Text and reasoning fragments append to their existing part
    /// (or start one); a chunk without a delta leaves the message unchanged.
    pub fn apply_chunk(&self, chunk: &MessageChunk) -> Message {
        let Some(delta) = chunk.first_choice().and_then(|choice| choice.delta.as_ref()) else {
            return self.clone();
        };

        let mut next = self.clone();
        for delta_part in &delta.parts {
            match delta_part {
                MessagePart::Text { text } => {
                    append_fragment(&mut next.parts, text, FragmentKind::Text);
                }
                MessagePart::Reasoning { reasoning } => {
                    append_fragment(&mut next.parts, reasoning, FragmentKind::Reasoning);
                }
                MessagePart::Image { url } => {
                    // Images never arrive incrementally; nothing to merge.
                    warn!(url = %url, "ignoring non-streamable delta part");
                }
            }
        }
        next
    }
}

#[derive(Clone, Copy)]
enum FragmentKind {
    Text,
    Reasoning,
}

fn append_fragment(parts: &mut Vec<MessagePart>, fragment: &str, kind: FragmentKind) {
    for part in parts.iter_mut() {
        match (part, kind) {
            (MessagePart::Text { text }, FragmentKind::Text) => {
                text.push_str(fragment);
                return;
            }
            (MessagePart::Reasoning { reasoning }, FragmentKind::Reasoning) => {
                reasoning.push_str(fragment);
                return;
            }
            _ => {}
        }
    }
    parts.push(match kind {
        FragmentKind::Text => MessagePart::Text {
            text: fragment.to_string(),
        },
        FragmentKind::Reasoning => MessagePart::Reasoning {
            reasoning: fragment.to_string(),
        },
    });
}

/// Apply a chunk to a conversation. A role change against the last message
/// starts a new turn (the incoming message is appended as-is); the same role
/// continues the current turn by growing the last message. Role continuity
/// is the only turn-boundary signal the wire protocol offers.
pub fn handle_message_chunk(
    messages: &[Message],
    chunk: &MessageChunk,
) -> Result<Vec<Message>, ChunkError> {
    let (last, head) = messages.split_last().ok_or(ChunkError::EmptyConversation)?;

    let choice = chunk.first_choice().ok_or(ChunkError::MissingPayload)?;
    let incoming = choice
        .delta
        .as_ref()
        .or(choice.message.as_ref())
        .ok_or(ChunkError::MissingPayload)?;

    if last.role != incoming.role {
        let mut next = messages.to_vec();
        next.push(incoming.clone());
        Ok(next)
    } else {
        let mut next = head.to_vec();
        next.push(last.apply_chunk(chunk));
        Ok(next)
    }
}

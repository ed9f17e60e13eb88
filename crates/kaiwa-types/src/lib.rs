pub mod chunk;
pub mod merge;
pub mod message;

pub use chunk::{Choice, MessageChunk};
pub use merge::{handle_message_chunk, ChunkError};
pub use message::{Message, MessageAnnotation, MessagePart, MessageRole};

pub mod client;
pub mod codec;
pub mod config;
pub mod encode;
pub mod error;
pub mod streaming;
pub mod transform;

pub use client::OpenAiClient;
pub use codec::ModelInfo;
pub use config::{GenerationParams, ProviderConfig};
pub use encode::EncodeError;
pub use error::LlmError;
pub use streaming::ChunkStream;
pub use transform::{apply_transformers, MessageTransformer};

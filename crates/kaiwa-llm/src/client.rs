use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use tracing::warn;

use kaiwa_types::{Message, MessageChunk};

use crate::codec;
use crate::codec::ModelInfo;
use crate::config::{GenerationParams, ProviderConfig};
use crate::error::LlmError;
use crate::streaming::{open_chunk_stream, ChunkStream};
use crate::transform::MessageTransformer;

const ATTRIBUTION_TITLE: &str = "Kaiwa";
const ATTRIBUTION_REFERER: &str = "https://github.com/kaiwa-chat/kaiwa";

// Model generation is slow; keep the per-call timeouts long.
const CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for one OpenAI-compatible provider endpoint. Construct once and
/// share; the underlying connection pool is reused across calls.
pub struct OpenAiClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl OpenAiClient {
    pub fn new(config: ProviderConfig) -> Result<Self, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert("X-Title", HeaderValue::from_static(ATTRIBUTION_TITLE));
        headers.insert("HTTP-Referer", HeaderValue::from_static(ATTRIBUTION_REFERER));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(CALL_TIMEOUT)
            .read_timeout(CALL_TIMEOUT)
            .build()?;

        Ok(Self { http, config })
    }

    /// List the models the provider offers.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let request = self
            .http
            .get(format!("{}/models", self.config.base_url))
            .bearer_auth(&self.config.api_key);

        let response = send_with_reconnect(request).await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body = response.text().await?;
        codec::parse_model_list(&body)
    }

    /// Single-shot completion: suspends until the full response arrives and
    /// returns it as a one-choice chunk with `message` set.
    pub async fn generate_text(
        &self,
        messages: Vec<Message>,
        params: &GenerationParams,
        transformers: &[Box<dyn MessageTransformer>],
    ) -> Result<MessageChunk, LlmError> {
        let payload = codec::build_chat_completion_request(messages, params, false, transformers);
        let request = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&payload);

        let response = send_with_reconnect(request).await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body = response.text().await?;
        codec::parse_completion(&body)
    }

    /// Streaming completion. Returns immediately; the request is issued when
    /// the stream is first polled, and dropping the stream cancels it.
    pub fn stream_text(
        &self,
        messages: Vec<Message>,
        params: &GenerationParams,
        transformers: &[Box<dyn MessageTransformer>],
    ) -> ChunkStream {
        let payload = codec::build_chat_completion_request(messages, params, true, transformers);
        let request = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&payload);

        open_chunk_stream(request)
    }
}

async fn api_error(response: reqwest::Response) -> LlmError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    LlmError::Api { status, body }
}

/// One retry after a low-level connection failure, nothing more. Mirrors an
/// HTTP stack's built-in reconnect, not an application retry policy.
pub(crate) async fn send_with_reconnect(
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, LlmError> {
    let retry = request.try_clone();
    match request.send().await {
        Ok(response) => Ok(response),
        Err(error) if error.is_connect() => {
            let Some(retry) = retry else {
                return Err(error.into());
            };
            warn!(%error, "connection failed, retrying once");
            Ok(retry.send().await?)
        }
        Err(error) => Err(error.into()),
    }
}

//! SSE consumption for streaming completions.
//!
//! The subscription is a lazily pulled, finite sequence of chunks. It ends
//! in exactly one of three ways: the `[DONE]` sentinel (clean completion,
//! no item emitted for it), a terminal `Err` item, or the caller dropping
//! the stream, which tears down the connection and emits nothing further.

use std::collections::VecDeque;
use std::pin::Pin;

use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use kaiwa_types::MessageChunk;

use crate::codec::{extract_error_message, parse_chunk_payload};
use crate::error::LlmError;

/// Chunk subscription handle. Dropping it cancels the request.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<MessageChunk, LlmError>> + Send>>;

const DONE_SENTINEL: &str = "[DONE]";

/// Send the request and expose the response's SSE events as chunks. All
/// failures, including a non-2xx status at open, arrive as the terminal
/// stream item rather than an early return.
pub(crate) fn open_chunk_stream(request: reqwest::RequestBuilder) -> ChunkStream {
    Box::pin(async_stream::stream! {
        let response = match crate::client::send_with_reconnect(request).await {
            Ok(response) => response,
            Err(error) => {
                // Transport failure with no response body to inspect.
                yield Err(error);
                return;
            }
        };

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            let message =
                extract_error_message(&body).unwrap_or_else(|| "unknown error".to_string());
            yield Err(LlmError::Stream(message));
            return;
        }

        let mut byte_chunks = Box::pin(response.bytes_stream());
        let mut buffer: VecDeque<u8> = VecDeque::with_capacity(8192);
        let mut event_data: Vec<String> = Vec::new();

        'receive: while let Some(chunk_result) = byte_chunks.next().await {
            let bytes = match chunk_result {
                Ok(bytes) => bytes,
                Err(error) => {
                    yield Err(LlmError::Stream(error.to_string()));
                    return;
                }
            };
            buffer.extend(bytes);

            while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();
                let Ok(line) = std::str::from_utf8(&line_bytes) else {
                    warn!("skipping non-UTF-8 line in event stream");
                    continue;
                };
                let line = line.trim_end_matches(['\n', '\r']);

                if line.is_empty() {
                    // Blank line terminates the event.
                    if event_data.is_empty() {
                        continue;
                    }
                    let payload = event_data.join("\n");
                    event_data.clear();

                    if payload == DONE_SENTINEL {
                        debug!("received stream termination sentinel");
                        break 'receive;
                    }
                    match parse_chunk_payload(&payload) {
                        Ok(chunks) => {
                            for chunk in chunks {
                                yield Ok(chunk);
                            }
                        }
                        Err(error) => {
                            yield Err(error);
                            return;
                        }
                    }
                } else if let Some(data) = line.strip_prefix("data:") {
                    event_data.push(data.strip_prefix(' ').unwrap_or(data).to_string());
                }
                // Other SSE fields (event:, id:, retry:, comments) are ignored.
            }
        }

        // A final event may arrive without a trailing blank line.
        if !event_data.is_empty() {
            let payload = event_data.join("\n");
            if payload != DONE_SENTINEL {
                match parse_chunk_payload(&payload) {
                    Ok(chunks) => {
                        for chunk in chunks {
                            yield Ok(chunk);
                        }
                    }
                    Err(error) => yield Err(error),
                }
            }
        }
    })
}

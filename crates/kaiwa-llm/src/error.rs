use reqwest::StatusCode;
use thiserror::Error;

/// Failure taxonomy for a completion call.
///
/// Upload-side degradations (empty messages, parts with no wire
/// representation, image encoding failures) are not errors; the codec drops
/// or degrades them and logs.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Non-2xx HTTP status, with the raw response body for display.
    #[error("API error ({status}): {body}")]
    Api { status: StatusCode, body: String },

    /// Connection failure or timeout below the HTTP layer.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Malformed or unexpected JSON shape. Fails the call fast rather than
    /// guessing at provider intent.
    #[error("decode error: {0}")]
    Decode(String),

    /// Failure surfaced mid-subscription; always the terminal stream item.
    #[error("stream error: {0}")]
    Stream(String),
}

//! Wire format for status broadcasts.
//!
//! A message travels as two datagrams: a 2-byte big-endian length prefix,
//! then the UTF-8 payload `"<worker>: <text>"`, optionally padded with NULs.
//! A prefix of zero tells listeners to shut down.

use thiserror::Error;

use crate::domain::models::StatusMessage;

/// Largest payload that fits in a single IPv4 UDP datagram
pub const MAX_PAYLOAD: usize = 65_507;

/// Length of the prefix datagram
pub const PREFIX_LEN: usize = 2;

/// Errors decoding a payload datagram
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("payload has no ':' separator: {0:?}")]
    MissingSeparator(String),

    #[error("payload is not valid UTF-8")]
    InvalidUtf8,
}

/// An encoded status message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub prefix: [u8; PREFIX_LEN],
    pub payload: Vec<u8>,
}

/// Encode `message`, truncating it at a character boundary if it exceeds
/// [`MAX_PAYLOAD`]
pub fn encode_frame(message: &str) -> Frame {
    let mut end = message.len().min(MAX_PAYLOAD);
    while !message.is_char_boundary(end) {
        end -= 1;
    }

    let payload = message.as_bytes()[..end].to_vec();
    // end <= MAX_PAYLOAD < u16::MAX
    let len = u16::try_from(payload.len()).unwrap_or(u16::MAX);

    Frame {
        prefix: len.to_be_bytes(),
        payload,
    }
}

/// Read the payload length from a prefix datagram
///
/// Returns `None` unless the datagram is exactly [`PREFIX_LEN`] bytes.
pub fn decode_length(datagram: &[u8]) -> Option<u16> {
    <[u8; PREFIX_LEN]>::try_from(datagram)
        .ok()
        .map(u16::from_be_bytes)
}

/// Build the payload text for a worker's output line
pub fn format_status(worker: &str, text: &str) -> String {
    format!("{worker}: {}\0\0", text.trim())
}

/// Split a payload into worker name and message text
pub fn parse_status(payload: &[u8]) -> Result<StatusMessage, FrameError> {
    let text = std::str::from_utf8(payload).map_err(|_| FrameError::InvalidUtf8)?;
    let (worker, message) = text
        .split_once(':')
        .ok_or_else(|| FrameError::MissingSeparator(text.trim_end_matches('\0').to_string()))?;

    let message = message.strip_prefix(' ').unwrap_or(message);
    Ok(StatusMessage {
        worker: worker.to_string(),
        text: message.trim_end_matches('\0').to_string(),
    })
}

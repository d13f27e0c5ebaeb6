//! Length-prefixed message framing for IPC.
//!
//! ```text
//! +----------------+------------------+
//! | length (4 BE)  |  JSON payload    |
//! +----------------+------------------+
//! ```

use serde::{Serialize, de::DeserializeOwned};

use crate::MAX_MESSAGE_SIZE;
use crate::error::{ProtocolError, ProtocolResult};

/// Size of the length prefix.
pub const FRAME_HEADER_LEN: usize = 4;

/// Encodes a message to bytes with length prefix.
pub fn encode_message<T: Serialize>(message: &T) -> ProtocolResult<Vec<u8>> {
    let json = serde_json::to_vec(message)?;
    let len = u32::try_from(json.len()).map_err(|_| ProtocolError::MessageTooLarge {
        size: u32::MAX,
        max: MAX_MESSAGE_SIZE,
    })?;
    check_frame_len(len)?;

    let mut buffer = Vec::with_capacity(FRAME_HEADER_LEN + json.len());
    buffer.extend_from_slice(&len.to_be_bytes());
    buffer.extend_from_slice(&json);
    Ok(buffer)
}

/// Decodes a complete framed message (prefix + payload).
pub fn decode_message<T: DeserializeOwned>(data: &[u8]) -> ProtocolResult<T> {
    let Some(header) = data.get(..FRAME_HEADER_LEN) else {
        return Err(ProtocolError::IncompleteMessage {
            expected: FRAME_HEADER_LEN,
            received: data.len(),
        });
    };

    let len = check_frame_len(decode_header(header))?;
    let end = FRAME_HEADER_LEN + len;

    if data.len() < end {
        return Err(ProtocolError::IncompleteMessage {
            expected: end,
            received: data.len(),
        });
    }

    decode_payload(&data[FRAME_HEADER_LEN..end])
}

/// Reads the big-endian length from a 4-byte header.
///
/// Bytes beyond the first four are ignored; shorter input reads as zero.
pub fn decode_header(header: &[u8]) -> u32 {
    let mut bytes = [0u8; FRAME_HEADER_LEN];
    if let Some(prefix) = header.get(..FRAME_HEADER_LEN) {
        bytes.copy_from_slice(prefix);
    }
    u32::from_be_bytes(bytes)
}

/// Validates a frame length read off the wire and returns it as `usize`.
pub fn check_frame_len(len: u32) -> ProtocolResult<usize> {
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }
    if len == 0 {
        return Err(ProtocolError::EmptyMessage);
    }
    Ok(len as usize)
}

/// Parses a JSON payload that has already been unframed.
pub fn decode_payload<T: DeserializeOwned>(payload: &[u8]) -> ProtocolResult<T> {
    Ok(serde_json::from_slice(payload)?)
}

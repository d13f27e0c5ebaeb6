//! IPC framing and request/response types for meetbook.
//!
//! Protocol v1: each message is a 4-byte big-endian length followed by a
//! JSON [`Envelope`] carrying `protocol_version`, a `request_id`, and the
//! [`Request`] or [`Response`] payload.
//!
//! ```rust
//! use meetbook_protocol::{Envelope, Request, SlotQuery, encode_message, decode_message};
//!
//! let request = Envelope::request("req-1", Request::get_slots(SlotQuery::new("30", "2026-02-09")));
//! let bytes = encode_message(&request).unwrap();
//! let decoded: Envelope<Request> = decode_message(&bytes).unwrap();
//! assert_eq!(decoded, request);
//! ```

mod error;
mod framing;
mod types;

pub use error::{ProtocolError, ProtocolResult};
pub use framing::{
    FRAME_HEADER_LEN, check_frame_len, decode_header, decode_message, decode_payload,
    encode_message,
};
pub use types::{
    BookingRequest, BookingResponse, BookingStatus, Envelope, ErrorCode, ErrorResponse, Request,
    Response, SlotQuery, SlotsResponse, StatusInfo,
};

/// Protocol version constant.
pub const PROTOCOL_VERSION: &str = "1";

/// Maximum message size (1 MiB).
pub const MAX_MESSAGE_SIZE: u32 = 1024 * 1024;

//! Length-prefixed JSON message framing for browser native messaging.
//!
//! Every message on the wire is framed with:
//! - A 4-byte little-endian payload length
//! - The payload: that many bytes of UTF-8 encoded JSON
//!
//! The byte order is fixed little-endian on every build target so two
//! machines of different endianness framing the same message produce the
//! same bytes. No partial reads, no buffer management in user code.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{decode_frame, encode_frame, FrameConfig, DEFAULT_MAX_PAYLOAD, HEADER_SIZE};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;

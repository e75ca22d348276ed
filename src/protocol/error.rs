//! CA framing error types

use thiserror::Error;

use crate::transport::TransportError;

/// CA framing errors
#[derive(Error, Debug)]
pub enum Error {
    /// Message needs the extended header but the peer is too old to read it
    #[error(
        "extended header requires minor revision 9, peer has {minor_revision} \
         (payload {payload_size} bytes, count {data_count})"
    )]
    ExtendedHeaderUnsupported {
        /// Negotiated minor revision of the peer
        minor_revision: u16,
        /// Requested payload size
        payload_size: u32,
        /// Requested element count
        data_count: u32,
    },

    /// String field contains a zero byte and cannot be zero-terminated
    #[error("{field} contains an interior NUL byte at offset {offset}")]
    InteriorNul {
        /// Name of the offending field
        field: &'static str,
        /// Byte offset of the first zero byte
        offset: usize,
    },

    /// Payload cannot be represented in its size field
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Payload size
        size: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Priority outside the range accepted by servers
    #[error("invalid priority {value} (expected 0..=99)")]
    InvalidPriority {
        /// Requested priority
        value: u16,
    },

    /// Transport refused to hand out a send buffer
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

//! EPICS Channel Access client message framing
//!
//! This library builds the byte-aligned messages a Channel Access (CA) client
//! sends while setting up a connection: version negotiation, host and user
//! identification, channel creation, and UDP channel searches.
//!
//! # Quick Start
//!
//! ```rust
//! use ca_frame::{MemoryTransport, TransportConfig, VersionTag};
//!
//! let mut transport = MemoryTransport::new(TransportConfig::default());
//!
//! ca_frame::version_message(&mut transport, VersionTag::Priority(0))?;
//! ca_frame::host_name_message(&mut transport, "ioc-host")?;
//! ca_frame::create_channel_message(&mut transport, "SR:CURRENT", 1)?;
//!
//! assert_eq!(transport.flushed().len(), 3);
//! # Ok::<(), ca_frame::Error>(())
//! ```
//!
//! # Wire Format
//!
//! - 16-byte standard header, 24-byte extended header for payloads or element
//!   counts of `0xFFFF` and above (peer revision 9 or later)
//! - every message padded with zeros to a multiple of 8 bytes
//! - big-endian fields
//!
//! Builders borrow a send buffer from a [`Transport`] and always release it,
//! discarding the partial message when anything fails.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod protocol;
pub mod transport;

pub use protocol::{
    Command, EXTENDED_HEADER_SIZE, Error, HEADER_SIZE, MessageHeader, Result, VersionTag,
    aligned_size, create_channel_message, host_name_message, search_request_message,
    start_message, user_name_message, version_message, version_request_message,
};
pub use transport::{
    MemoryTransport, SearchBatch, SearchConfig, SendGuard, Transport, TransportConfig,
    TransportError,
};

/// Minor protocol revision this client speaks
pub const CA_MINOR_PROTOCOL_REVISION: u16 = 13;

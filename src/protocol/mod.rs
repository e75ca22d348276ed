//! Channel Access wire format
//!
//! This module provides the header model, size arithmetic, and the message
//! builders a CA client uses during connection setup.

mod codec;
mod error;
mod header;
mod message;
mod types;

pub use codec::{aligned_size, put_padded_str, start_message};
pub use error::{Error, Result};
pub use header::MessageHeader;
pub use message::{
    create_channel_message, host_name_message, search_request_message, user_name_message,
    version_message, version_request_message,
};
pub use types::{
    Command, PRIORITY_DEFAULT, PRIORITY_MAX, PRIORITY_MIN, SEARCH_DONT_REPLY,
    VersionTag,
};

/// Standard header size in bytes
pub const HEADER_SIZE: usize = 16;

/// Extended header size in bytes
pub const EXTENDED_HEADER_SIZE: usize = 24;

/// Every message (header + payload) is padded to a multiple of this
pub const MESSAGE_ALIGNMENT: usize = 8;

/// Payload sizes and element counts at or above this value need the extended header
pub const EXTENDED_THRESHOLD: u32 = 0xFFFF;

/// Value written to the payload size slot of an extended header
pub const EXTENDED_SIZE_SENTINEL: u16 = 0xFFFF;

/// Value written to the data count slot of an extended header
pub const EXTENDED_COUNT_SENTINEL: u16 = 0x0000;

/// Lowest peer revision that understands the extended header
pub const MIN_REVISION_EXTENDED_HEADER: u16 = 9;

/// Lowest peer revision that accepts host name and user name messages
pub const MIN_REVISION_CLIENT_IDENTITY: u16 = 1;

/// Lowest peer revision that binds channels by name
pub const MIN_REVISION_NAMED_CHANNEL: u16 = 4;

/// Largest datagram a client sends over UDP
pub const MAX_UDP_SEND: usize = 1024;

/// Largest message a client sends over a virtual circuit
pub const MAX_TCP_SEND: usize = 0x4000 + HEADER_SIZE;

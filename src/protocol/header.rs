//! CA message header
//!
//! A header is 16 bytes, or 24 bytes when the payload size or element count
//! does not fit in 16 bits. All fields are big-endian.

use bytes::BufMut;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    Command, EXTENDED_COUNT_SENTINEL, EXTENDED_HEADER_SIZE, EXTENDED_SIZE_SENTINEL,
    EXTENDED_THRESHOLD, HEADER_SIZE,
};

/// CA message header
///
/// # Wire Format
///
/// Standard (16 bytes):
///
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |         Command (2)           |       Payload Size (2)        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |        Data Type (2)          |        Data Count (2)         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        Parameter 1 (4)                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        Parameter 2 (4)                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Extended (24 bytes): payload size slot holds `0xFFFF`, data count slot
/// holds `0x0000`, and the real 32-bit values follow parameter 2:
///
/// ```text
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |         Command (2)           |            0xFFFF             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |        Data Type (2)          |            0x0000             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        Parameter 1 (4)                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        Parameter 2 (4)                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                       Payload Size (4)                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        Data Count (4)                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MessageHeader {
    command: Command,
    payload_size: u32,
    data_type: u16,
    data_count: u32,
    parameter1: u32,
    parameter2: u32,
}

impl MessageHeader {
    /// Create a new message header
    #[must_use]
    pub const fn new(
        command: Command,
        payload_size: u32,
        data_type: u16,
        data_count: u32,
        parameter1: u32,
        parameter2: u32,
    ) -> Self {
        Self {
            command,
            payload_size,
            data_type,
            data_count,
            parameter1,
            parameter2,
        }
    }

    /// Get command
    #[must_use]
    pub const fn command(&self) -> Command {
        self.command
    }

    /// Get payload size
    #[must_use]
    pub const fn payload_size(&self) -> u32 {
        self.payload_size
    }

    /// Get data type
    #[must_use]
    pub const fn data_type(&self) -> u16 {
        self.data_type
    }

    /// Get data count
    #[must_use]
    pub const fn data_count(&self) -> u32 {
        self.data_count
    }

    /// Get parameter 1
    #[must_use]
    pub const fn parameter1(&self) -> u32 {
        self.parameter1
    }

    /// Get parameter 2
    #[must_use]
    pub const fn parameter2(&self) -> u32 {
        self.parameter2
    }

    /// Whether the sizes force the 24-byte layout
    #[must_use]
    pub const fn is_extended(&self) -> bool {
        self.payload_size >= EXTENDED_THRESHOLD || self.data_count >= EXTENDED_THRESHOLD
    }

    /// Encoded header length in bytes
    #[must_use]
    pub const fn wire_size(&self) -> usize {
        if self.is_extended() {
            EXTENDED_HEADER_SIZE
        } else {
            HEADER_SIZE
        }
    }

    /// Write the header (big-endian) at the buffer's cursor
    pub fn write_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16(self.command.as_u16());
        if self.is_extended() {
            buf.put_u16(EXTENDED_SIZE_SENTINEL);
            buf.put_u16(self.data_type);
            buf.put_u16(EXTENDED_COUNT_SENTINEL);
            buf.put_u32(self.parameter1);
            buf.put_u32(self.parameter2);
            buf.put_u32(self.payload_size);
            buf.put_u32(self.data_count);
        } else {
            // both are below 0xFFFF here, so the narrowing is lossless
            buf.put_u16(self.payload_size as u16);
            buf.put_u16(self.data_type);
            buf.put_u16(self.data_count as u16);
            buf.put_u32(self.parameter1);
            buf.put_u32(self.parameter2);
        }
    }

    /// Convert to bytes (big-endian)
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.wire_size());
        self.write_to(&mut bytes);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_layout() {
        let header = MessageHeader::new(Command::CreateChannel, 8, 0, 0, 5, 13);
        let bytes = header.to_bytes();

        assert!(!header.is_extended());
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(
            bytes,
            [0, 18, 0, 8, 0, 0, 0, 0, 0, 0, 0, 5, 0, 0, 0, 13]
        );
    }

    #[test]
    fn test_extended_layout() {
        let header = MessageHeader::new(Command::HostName, 70_000, 7, 3, 0x0102_0304, 9);
        let bytes = header.to_bytes();

        assert!(header.is_extended());
        assert_eq!(bytes.len(), EXTENDED_HEADER_SIZE);
        assert_eq!(&bytes[0..2], &21u16.to_be_bytes());
        assert_eq!(&bytes[2..4], &[0xFF, 0xFF]);
        assert_eq!(&bytes[4..6], &7u16.to_be_bytes());
        assert_eq!(&bytes[6..8], &[0x00, 0x00]);
        assert_eq!(&bytes[8..12], &[1, 2, 3, 4]);
        assert_eq!(&bytes[12..16], &9u32.to_be_bytes());
        assert_eq!(&bytes[16..20], &70_000u32.to_be_bytes());
        assert_eq!(&bytes[20..24], &3u32.to_be_bytes());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let below = MessageHeader::new(Command::Version, 0xFFFE, 0, 0xFFFE, 0, 0);
        let at_size = MessageHeader::new(Command::Version, 0xFFFF, 0, 0, 0, 0);
        let at_count = MessageHeader::new(Command::Version, 0, 0, 0xFFFF, 0, 0);

        assert!(!below.is_extended());
        assert!(at_size.is_extended());
        assert!(at_count.is_extended());
        assert_eq!(at_count.wire_size(), EXTENDED_HEADER_SIZE);
    }
}

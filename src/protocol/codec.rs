//! CA message framing primitives
//!
//! Size alignment, header emission into a transport send buffer, and the
//! zero-terminated padded string payload shared by several commands.

use bytes::{BufMut, BytesMut};
use tracing::{debug, trace};

use super::{Error, MESSAGE_ALIGNMENT, MIN_REVISION_EXTENDED_HEADER, MessageHeader, Result};
use crate::transport::Transport;

/// Round `size` up to the next multiple of `align`.
///
/// `align` must be non-zero.
#[must_use]
pub const fn aligned_size(align: usize, size: usize) -> usize {
    size.div_ceil(align) * align
}

/// Length of a zero-terminated string field padded to the message alignment.
#[must_use]
pub(crate) const fn padded_str_len(len: usize) -> usize {
    aligned_size(MESSAGE_ALIGNMENT, len + 1)
}

/// Append `value`, a zero terminator, and zero padding up to the next
/// 8-byte boundary. Returns the number of bytes written.
///
/// Nothing is written when `value` contains a zero byte.
pub fn put_padded_str<B: BufMut>(buf: &mut B, field: &'static str, value: &str) -> Result<usize> {
    if let Some(offset) = value.bytes().position(|b| b == 0) {
        return Err(Error::InteriorNul { field, offset });
    }

    let total = padded_str_len(value.len());
    buf.put_slice(value.as_bytes());
    buf.put_bytes(0, total - value.len());
    Ok(total)
}

/// Acquire a send buffer from `transport` and write `header` into it.
///
/// Returns the buffer positioned right after the header, ready for the
/// payload. Fails when the header needs the extended layout and the peer's
/// minor revision is below 9; this is a caller bug, not a runtime condition.
pub fn start_message<'t, T: Transport + ?Sized>(
    transport: &'t mut T,
    header: &MessageHeader,
) -> Result<&'t mut BytesMut> {
    let minor_revision = transport.minor_revision();

    if header.is_extended() {
        if minor_revision < MIN_REVISION_EXTENDED_HEADER {
            debug!(
                command = %header.command(),
                minor_revision,
                payload_size = header.payload_size(),
                data_count = header.data_count(),
                "extended header rejected by peer revision"
            );
            return Err(Error::ExtendedHeaderUnsupported {
                minor_revision,
                payload_size: header.payload_size(),
                data_count: header.data_count(),
            });
        }
        trace!(command = %header.command(), "using extended header");
    }

    let buffer = transport.acquire_send_buffer(header.wire_size())?;
    header.write_to(buffer);
    Ok(buffer)
}

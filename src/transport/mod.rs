//! Send-side transport collaborator
//!
//! The framing layer never owns a socket. It borrows a send buffer from a
//! [`Transport`], writes one message into it, and hands it back through
//! [`Transport::release_send_buffer`].

mod buffer;
mod datagram;
mod error;
mod guard;

use bytes::BytesMut;

pub use buffer::{MemoryTransport, TransportConfig};
pub use datagram::{SearchBatch, SearchConfig};
pub use error::TransportError;
pub use guard::SendGuard;

/// Send-side view of a CA virtual circuit or datagram endpoint.
pub trait Transport {
    /// Minor protocol revision negotiated with the peer.
    fn minor_revision(&self) -> u16;

    /// Borrow a send buffer with room for at least `min_size` bytes.
    ///
    /// The returned buffer is empty; it may already have a larger capacity.
    /// Every successful or failed acquisition is followed by exactly one
    /// [`release_send_buffer`](Self::release_send_buffer) call.
    fn acquire_send_buffer(&mut self, min_size: usize) -> Result<&mut BytesMut, TransportError>;

    /// Finish the current send buffer.
    ///
    /// With `discard` set the buffered message is dropped; otherwise it is
    /// queued for sending. `more_follows` lets the transport hold back the
    /// flush because another message is about to be appended.
    fn release_send_buffer(&mut self, discard: bool, more_follows: bool);
}

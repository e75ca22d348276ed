//! Scoped send buffer release.

use tracing::trace;

use super::Transport;

/// Releases the transport's send buffer when dropped.
///
/// The buffer is discarded unless [`commit`](Self::commit) was called, so an
/// early return, an error, or a panic while building a message never leaves a
/// half-written message queued. The release happens exactly once.
pub struct SendGuard<'t, T: Transport + ?Sized> {
    transport: &'t mut T,
    discard: bool,
}

impl<'t, T: Transport + ?Sized> SendGuard<'t, T> {
    /// Start guarding `transport`; the default outcome is discard.
    pub fn new(transport: &'t mut T) -> Self {
        Self {
            transport,
            discard: true,
        }
    }

    /// Access the guarded transport to acquire and fill its buffer.
    pub fn transport(&mut self) -> &mut T {
        self.transport
    }

    /// Mark the message complete and release it for sending.
    pub fn commit(mut self) {
        self.discard = false;
    }
}

impl<T: Transport + ?Sized> Drop for SendGuard<'_, T> {
    fn drop(&mut self) {
        trace!(discard = self.discard, "releasing send buffer");
        self.transport.release_send_buffer(self.discard, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MemoryTransport, TransportConfig};
    use bytes::BufMut;

    #[test]
    fn test_uncommitted_guard_discards() {
        let mut transport = MemoryTransport::new(TransportConfig::default());
        {
            let mut guard = SendGuard::new(&mut transport);
            let buffer = guard.transport().acquire_send_buffer(16).unwrap();
            buffer.put_slice(&[1; 16]);
        }

        assert_eq!(transport.releases(), 1);
        assert_eq!(transport.discards(), 1);
        assert!(transport.flushed().is_empty());
    }

    #[test]
    fn test_committed_guard_sends() {
        let mut transport = MemoryTransport::new(TransportConfig::default());
        let mut guard = SendGuard::new(&mut transport);
        let buffer = guard.transport().acquire_send_buffer(16).unwrap();
        buffer.put_slice(&[2; 16]);
        guard.commit();

        assert_eq!(transport.releases(), 1);
        assert_eq!(transport.discards(), 0);
        assert_eq!(transport.flushed().len(), 1);
        assert_eq!(transport.flushed()[0].as_ref(), &[2; 16]);
    }

    #[test]
    fn test_guard_releases_on_panic() {
        let mut transport = MemoryTransport::new(TransportConfig::default());
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut guard = SendGuard::new(&mut transport);
            guard.transport().acquire_send_buffer(16).unwrap();
            panic!("payload construction failed");
        }));

        assert!(result.is_err());
        assert_eq!(transport.releases(), 1);
        assert_eq!(transport.discards(), 1);
    }
}

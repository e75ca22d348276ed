//! In-memory transport that batches released messages.

use std::collections::VecDeque;

use bytes::{Bytes, BytesMut};
use tracing::{debug, instrument, trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Transport, TransportError};
use crate::CA_MINOR_PROTOCOL_REVISION;
use crate::protocol::MAX_TCP_SEND;

/// Configuration for [`MemoryTransport`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransportConfig {
    /// Minor revision reported to the message builders.
    pub minor_revision: u16,
    /// Largest single message the transport will lend a buffer for.
    pub max_message_size: usize,
    /// Capacity reserved for each freshly lent buffer.
    pub initial_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            minor_revision: CA_MINOR_PROTOCOL_REVISION,
            max_message_size: MAX_TCP_SEND,
            initial_capacity: 1024,
        }
    }
}

/// [`Transport`] that keeps sent messages in memory.
///
/// Each acquisition lends an empty buffer. Releasing it with `discard` drops
/// the message; otherwise it is appended to the pending batch, and the batch
/// becomes one flushed segment once a release arrives without `more_follows`.
#[derive(Debug)]
pub struct MemoryTransport {
    config: TransportConfig,
    current: BytesMut,
    lent: bool,
    pending: BytesMut,
    flushed: VecDeque<Bytes>,
    closed: bool,
    acquisitions: u64,
    releases: u64,
    discards: u64,
}

impl MemoryTransport {
    /// Create a transport using the provided configuration.
    #[must_use]
    pub fn new(config: TransportConfig) -> Self {
        Self {
            current: BytesMut::with_capacity(config.initial_capacity),
            pending: BytesMut::new(),
            config,
            lent: false,
            flushed: VecDeque::new(),
            closed: false,
            acquisitions: 0,
            releases: 0,
            discards: 0,
        }
    }

    /// Change the revision reported to the builders, as after renegotiation.
    pub fn set_minor_revision(&mut self, minor_revision: u16) {
        self.config.minor_revision = minor_revision;
    }

    /// Refuse further acquisitions.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Segments flushed so far, oldest first.
    #[must_use]
    pub fn flushed(&self) -> &VecDeque<Bytes> {
        &self.flushed
    }

    /// Remove and return the oldest flushed segment.
    pub fn pop_flushed(&mut self) -> Option<Bytes> {
        self.flushed.pop_front()
    }

    /// Bytes released with `more_follows` that have not been flushed yet.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Number of successful buffer acquisitions.
    #[must_use]
    pub const fn acquisitions(&self) -> u64 {
        self.acquisitions
    }

    /// Number of release calls, including discards.
    #[must_use]
    pub const fn releases(&self) -> u64 {
        self.releases
    }

    /// Number of releases that discarded their message.
    #[must_use]
    pub const fn discards(&self) -> u64 {
        self.discards
    }
}

impl Transport for MemoryTransport {
    fn minor_revision(&self) -> u16 {
        self.config.minor_revision
    }

    #[instrument(level = "trace", skip(self))]
    fn acquire_send_buffer(&mut self, min_size: usize) -> Result<&mut BytesMut, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        if self.lent {
            return Err(TransportError::BufferInUse);
        }
        if min_size > self.config.max_message_size {
            return Err(TransportError::BufferTooSmall {
                required: min_size,
                available: self.config.max_message_size,
            });
        }

        self.current.clear();
        self.current.reserve(min_size.max(self.config.initial_capacity));
        self.lent = true;
        self.acquisitions += 1;
        Ok(&mut self.current)
    }

    #[instrument(level = "trace", skip(self))]
    fn release_send_buffer(&mut self, discard: bool, more_follows: bool) {
        self.releases += 1;
        if !self.lent {
            // acquisition failed; nothing was written
            trace!("release without lent buffer");
        }
        self.lent = false;

        if discard {
            self.discards += 1;
            if !self.current.is_empty() {
                debug!(bytes = self.current.len(), "discarding partial message");
            }
            self.current.clear();
        } else {
            if self.current.len() > self.config.max_message_size {
                warn!(
                    bytes = self.current.len(),
                    max = self.config.max_message_size,
                    "queued message exceeds configured maximum"
                );
            }
            self.pending.extend_from_slice(&self.current);
            self.current.clear();
        }

        if !more_follows && !self.pending.is_empty() {
            let segment = self.pending.split().freeze();
            trace!(bytes = segment.len(), "flushing send batch");
            self.flushed.push_back(segment);
        }
    }
}

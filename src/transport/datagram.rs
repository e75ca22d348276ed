//! Search datagram packing.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::CA_MINOR_PROTOCOL_REVISION;
use crate::protocol::{
    Error, HEADER_SIZE, MAX_UDP_SEND, MESSAGE_ALIGNMENT, Result, VersionTag, aligned_size,
    search_request_message, version_request_message,
};

/// Configuration for search datagrams.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchConfig {
    /// Maximum datagram length in bytes.
    pub max_datagram_size: usize,
    /// Minor revision advertised in every request.
    pub minor_revision: u16,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_datagram_size: MAX_UDP_SEND,
            minor_revision: CA_MINOR_PROTOCOL_REVISION,
        }
    }
}

/// One outbound search datagram under construction.
///
/// Each datagram opens with a version message carrying the batch sequence
/// number, followed by as many search requests as fit.
#[derive(Debug)]
pub struct SearchBatch {
    config: SearchConfig,
    buffer: BytesMut,
    sequence: u32,
    requests: usize,
}

impl SearchBatch {
    /// Start a batch whose first datagram carries `sequence`.
    ///
    /// A `max_datagram_size` below one header is raised to one header.
    #[must_use]
    pub fn new(mut config: SearchConfig, sequence: u32) -> Self {
        if config.max_datagram_size < HEADER_SIZE {
            warn!(
                max = config.max_datagram_size,
                min = HEADER_SIZE,
                "search datagram size below one header, clamping"
            );
            config.max_datagram_size = HEADER_SIZE;
        }

        let mut batch = Self {
            buffer: BytesMut::with_capacity(config.max_datagram_size),
            config,
            sequence,
            requests: 0,
        };
        batch.begin();
        batch
    }

    fn begin(&mut self) {
        self.requests = 0;
        let remaining = self.config.max_datagram_size.saturating_sub(self.buffer.len());
        let mut limited = (&mut self.buffer).limit(remaining);
        let written = version_request_message(
            &mut limited,
            self.config.minor_revision,
            VersionTag::SequenceNumber(self.sequence),
        );
        debug_assert!(written, "datagram size is at least one header");
    }

    /// Append a search request.
    ///
    /// Returns `Ok(false)` when the request does not fit; send the datagram
    /// with [`take`](Self::take) and push it again. A request that would not
    /// fit even an empty datagram is `Error::PayloadTooLarge`.
    pub fn push(&mut self, name: &str, cid: u32) -> Result<bool> {
        let remaining = self.config.max_datagram_size.saturating_sub(self.buffer.len());
        let mut limited = (&mut self.buffer).limit(remaining);
        let queued = search_request_message(&mut limited, self.config.minor_revision, name, cid)?;
        if queued {
            self.requests += 1;
            trace!(cid, len = self.buffer.len(), "queued search request");
        } else if self.requests == 0 {
            return Err(Error::PayloadTooLarge {
                size: aligned_size(MESSAGE_ALIGNMENT, HEADER_SIZE + name.len() + 1),
                max: self.config.max_datagram_size - HEADER_SIZE,
            });
        }
        Ok(queued)
    }

    /// Number of search requests in the current datagram.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.requests
    }

    /// Whether the current datagram holds no search requests.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.requests == 0
    }

    /// Sequence number carried by the current datagram.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Bytes still free in the current datagram.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.config.max_datagram_size.saturating_sub(self.buffer.len())
    }

    /// Finish the current datagram and start the next one.
    ///
    /// Returns `None` when no search request was queued.
    pub fn take(&mut self) -> Option<Bytes> {
        if self.is_empty() {
            return None;
        }

        let datagram = self.buffer.split().freeze();
        debug!(
            sequence = self.sequence,
            requests = self.requests,
            len = datagram.len(),
            "search datagram ready"
        );
        self.sequence = self.sequence.wrapping_add(1);
        self.begin();
        Some(datagram)
    }
}

//! Transport-level error types for send buffer handling.

use core::fmt;

/// Errors a [`Transport`](super::Transport) reports when lending a send buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The transport was closed and accepts no more messages.
    Closed,
    /// A send buffer is already lent out and has not been released.
    BufferInUse,
    /// The requested size exceeds what the transport can send in one message.
    BufferTooSmall {
        /// Number of bytes requested.
        required: usize,
        /// Largest message the transport accepts.
        available: usize,
    },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "transport closed"),
            Self::BufferInUse => write!(f, "send buffer already acquired"),
            Self::BufferTooSmall {
                required,
                available,
            } => write!(
                f,
                "buffer too small: need {required} bytes, have {available}"
            ),
        }
    }
}

impl std::error::Error for TransportError {}

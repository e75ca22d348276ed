//! CA command codes and tagged header slots

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Error, Result};

/// Lowest channel priority
pub const PRIORITY_MIN: u16 = 0;
/// Highest channel priority
pub const PRIORITY_MAX: u16 = 99;
/// Priority used when the caller does not choose one
pub const PRIORITY_DEFAULT: u16 = PRIORITY_MIN;

/// Search flag: servers that do not host the channel stay silent
pub const SEARCH_DONT_REPLY: u16 = 5;

/// Commands a CA client sends during connection setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u16)]
pub enum Command {
    /// Protocol version negotiation and priority announcement
    Version = 0,
    /// Channel name search (UDP)
    Search = 6,
    /// Create or bind a channel on a virtual circuit
    CreateChannel = 18,
    /// Announce the client's user name
    ClientName = 20,
    /// Announce the client's host name
    HostName = 21,
}

impl Command {
    /// Convert from the wire code
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::Version),
            6 => Some(Self::Search),
            18 => Some(Self::CreateChannel),
            20 => Some(Self::ClientName),
            21 => Some(Self::HostName),
            _ => None,
        }
    }

    /// Convert to the wire code
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Version => "Version",
            Self::Search => "Search",
            Self::CreateChannel => "CreateChannel",
            Self::ClientName => "ClientName",
            Self::HostName => "HostName",
        };
        write!(f, "{name}")
    }
}

/// Contents of the data type slot of a version message.
///
/// The slot carries either the client priority or, when a sequence number is
/// attached, a "sequence number valid" flag. A sequence number always takes
/// the slot; the priority is then not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VersionTag {
    /// Announce the client priority
    Priority(u16),
    /// Attach a sequence number (search datagrams)
    SequenceNumber(u32),
}

impl VersionTag {
    /// Priority tag, checked against the range servers accept
    pub fn priority(value: u16) -> Result<Self> {
        if value > PRIORITY_MAX {
            return Err(Error::InvalidPriority { value });
        }
        Ok(Self::Priority(value))
    }

    /// Value written to the data type slot
    #[must_use]
    pub const fn data_type(self) -> u16 {
        match self {
            Self::Priority(priority) => priority,
            Self::SequenceNumber(_) => 1,
        }
    }

    /// Value written to parameter 1
    #[must_use]
    pub const fn parameter1(self) -> u32 {
        match self {
            Self::Priority(_) => 0,
            Self::SequenceNumber(sequence) => sequence,
        }
    }
}

impl Default for VersionTag {
    fn default() -> Self {
        Self::Priority(PRIORITY_DEFAULT)
    }
}

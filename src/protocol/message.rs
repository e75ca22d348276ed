//! CA client control messages
//!
//! Builders for the messages a client sends while setting up a virtual
//! circuit, plus the connectionless variants packed into search datagrams.

use bytes::{BufMut, BytesMut};
use tracing::{debug, trace};

use super::codec::padded_str_len;
use super::{
    Command, EXTENDED_THRESHOLD, Error, HEADER_SIZE, MESSAGE_ALIGNMENT,
    MIN_REVISION_CLIENT_IDENTITY, MIN_REVISION_NAMED_CHANNEL, MessageHeader, Result,
    SEARCH_DONT_REPLY, VersionTag, aligned_size, put_padded_str, start_message,
};
use crate::transport::{SendGuard, Transport};

/// Write `header` and a payload into a guarded send buffer.
///
/// The buffer is released exactly once: for sending when `fill` succeeds,
/// discarded on any error.
fn send_message<T, F>(transport: &mut T, header: &MessageHeader, fill: F) -> Result<()>
where
    T: Transport + ?Sized,
    F: FnOnce(&mut BytesMut) -> Result<()>,
{
    let mut guard = SendGuard::new(transport);
    let buffer = start_message(guard.transport(), header)?;
    fill(buffer)?;
    guard.commit();
    Ok(())
}

fn payload_size(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::PayloadTooLarge {
        size: len,
        max: u32::MAX as usize,
    })
}

/// Send a version message announcing our revision and priority or sequence number.
pub fn version_message<T: Transport + ?Sized>(transport: &mut T, tag: VersionTag) -> Result<()> {
    let header = MessageHeader::new(
        Command::Version,
        0,
        tag.data_type(),
        u32::from(transport.minor_revision()),
        tag.parameter1(),
        0,
    );
    send_message(transport, &header, |_| Ok(()))
}

/// Send the local host name. Skipped for peers older than revision 1.
pub fn host_name_message<T: Transport + ?Sized>(transport: &mut T, host_name: &str) -> Result<()> {
    identity_message(transport, Command::HostName, "host name", host_name)
}

/// Send the local user name. Skipped for peers older than revision 1.
pub fn user_name_message<T: Transport + ?Sized>(transport: &mut T, user_name: &str) -> Result<()> {
    identity_message(transport, Command::ClientName, "user name", user_name)
}

fn identity_message<T: Transport + ?Sized>(
    transport: &mut T,
    command: Command,
    field: &'static str,
    value: &str,
) -> Result<()> {
    let minor_revision = transport.minor_revision();
    if minor_revision < MIN_REVISION_CLIENT_IDENTITY {
        trace!(%command, minor_revision, "peer predates client identity messages");
        return Ok(());
    }

    let size = payload_size(padded_str_len(value.len()))?;
    let header = MessageHeader::new(command, size, 0, 0, 0, 0);
    send_message(transport, &header, |buffer| {
        put_padded_str(buffer, field, value).map(drop)
    })
}

/// Ask the server to create channel `channel_name` for client id `cid`.
///
/// Peers older than revision 4 do not bind by name; they take `cid` as the
/// server id, so the name is left out and the payload is empty.
pub fn create_channel_message<T: Transport + ?Sized>(
    transport: &mut T,
    channel_name: &str,
    cid: u32,
) -> Result<()> {
    let minor_revision = transport.minor_revision();
    let name = (minor_revision >= MIN_REVISION_NAMED_CHANNEL).then_some(channel_name);
    if name.is_none() {
        debug!(
            cid,
            minor_revision, "binding channel by id, peer predates named channels"
        );
    }

    let size = name.map_or(0, |name| padded_str_len(name.len()));
    let header = MessageHeader::new(
        Command::CreateChannel,
        payload_size(size)?,
        0,
        0,
        cid,
        u32::from(minor_revision),
    );
    send_message(transport, &header, |buffer| match name {
        Some(name) => put_padded_str(buffer, "channel name", name).map(drop),
        None => Ok(()),
    })
}

/// Append a version header to a connectionless (UDP) datagram.
///
/// Returns `false` without writing when `buffer` has fewer than 16 bytes left.
pub fn version_request_message<B: BufMut>(
    buffer: &mut B,
    minor_revision: u16,
    tag: VersionTag,
) -> bool {
    if buffer.remaining_mut() < HEADER_SIZE {
        return false;
    }

    MessageHeader::new(
        Command::Version,
        0,
        tag.data_type(),
        u32::from(minor_revision),
        tag.parameter1(),
        0,
    )
    .write_to(buffer);
    true
}

/// Append a search request for `name` to a shared datagram buffer.
///
/// Returns `Ok(false)` and writes nothing when the aligned request does not
/// fit in the space left in `buffer`; the caller then sends the datagram and
/// retries with a fresh one. Both parameter slots carry `cid`.
pub fn search_request_message<B: BufMut>(
    buffer: &mut B,
    minor_revision: u16,
    name: &str,
    cid: u32,
) -> Result<bool> {
    if let Some(offset) = name.bytes().position(|b| b == 0) {
        return Err(Error::InteriorNul {
            field: "channel name",
            offset,
        });
    }

    let message_size = aligned_size(MESSAGE_ALIGNMENT, HEADER_SIZE + name.len() + 1);
    let payload = message_size - HEADER_SIZE;
    if payload >= EXTENDED_THRESHOLD as usize {
        return Err(Error::PayloadTooLarge {
            size: payload,
            max: EXTENDED_THRESHOLD as usize - 1,
        });
    }

    if buffer.remaining_mut() < message_size {
        trace!(
            cid,
            needed = message_size,
            remaining = buffer.remaining_mut(),
            "search request does not fit"
        );
        return Ok(false);
    }

    MessageHeader::new(
        Command::Search,
        payload_size(payload)?,
        SEARCH_DONT_REPLY,
        u32::from(minor_revision),
        cid,
        cid,
    )
    .write_to(buffer);
    put_padded_str(buffer, "channel name", name)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MemoryTransport, TransportConfig};

    fn transport(minor_revision: u16) -> MemoryTransport {
        MemoryTransport::new(TransportConfig {
            minor_revision,
            ..TransportConfig::default()
        })
    }

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_be_bytes([bytes[offset], bytes[offset + 1]])
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_be_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_version_with_sequence_number() {
        let mut transport = transport(13);
        version_message(&mut transport, VersionTag::SequenceNumber(42)).unwrap();

        let sent = transport.pop_flushed().unwrap();
        assert_eq!(sent.len(), HEADER_SIZE);
        assert_eq!(u16_at(&sent, 0), 0);
        assert_eq!(u16_at(&sent, 2), 0);
        assert_eq!(u16_at(&sent, 4), 1);
        assert_eq!(u16_at(&sent, 6), 13);
        assert_eq!(u32_at(&sent, 8), 42);
        assert_eq!(u32_at(&sent, 12), 0);
    }

    #[test]
    fn test_version_with_priority() {
        let mut transport = transport(11);
        version_message(&mut transport, VersionTag::Priority(3)).unwrap();

        let sent = transport.pop_flushed().unwrap();
        assert_eq!(u16_at(&sent, 4), 3);
        assert_eq!(u16_at(&sent, 6), 11);
        assert_eq!(u32_at(&sent, 8), 0);
        assert_eq!(transport.releases(), 1);
    }

    #[test]
    fn test_host_name_gated_below_revision_1() {
        let mut transport = transport(0);
        host_name_message(&mut transport, "ioc-host").unwrap();
        user_name_message(&mut transport, "operator").unwrap();

        assert_eq!(transport.acquisitions(), 0);
        assert_eq!(transport.releases(), 0);
        assert!(transport.flushed().is_empty());
    }

    #[test]
    fn test_host_and_user_name_payloads() {
        let mut transport = transport(1);
        host_name_message(&mut transport, "ioc-host").unwrap();
        user_name_message(&mut transport, "op").unwrap();

        let host = transport.pop_flushed().unwrap();
        assert_eq!(u16_at(&host, 0), 21);
        assert_eq!(u16_at(&host, 2), 16);
        assert_eq!(&host[16..], b"ioc-host\0\0\0\0\0\0\0\0");
        assert_eq!(&host[4..16], &[0; 12]);

        let user = transport.pop_flushed().unwrap();
        assert_eq!(u16_at(&user, 0), 20);
        assert_eq!(u16_at(&user, 2), 8);
        assert_eq!(&user[16..], b"op\0\0\0\0\0\0");
    }

    #[test]
    fn test_interior_nul_discards_buffer() {
        let mut transport = transport(13);
        let result = host_name_message(&mut transport, "bad\0host");

        assert!(matches!(result, Err(Error::InteriorNul { offset: 3, .. })));
        assert_eq!(transport.acquisitions(), 1);
        assert_eq!(transport.releases(), 1);
        assert_eq!(transport.discards(), 1);
        assert!(transport.flushed().is_empty());
    }

    #[test]
    fn test_create_channel_by_name() {
        let mut transport = transport(4);
        create_channel_message(&mut transport, "foo", 5).unwrap();

        let sent = transport.pop_flushed().unwrap();
        assert_eq!(sent.len(), 24);
        assert_eq!(u16_at(&sent, 0), 18);
        assert_eq!(u16_at(&sent, 2), 8);
        assert_eq!(u32_at(&sent, 8), 5);
        assert_eq!(u32_at(&sent, 12), 4);
        assert_eq!(&sent[16..], b"foo\0\0\0\0\0");
    }

    #[test]
    fn test_create_channel_legacy_peer_drops_name() {
        let mut transport = transport(3);
        create_channel_message(&mut transport, "foo", 5).unwrap();

        let sent = transport.pop_flushed().unwrap();
        assert_eq!(sent.len(), HEADER_SIZE);
        assert_eq!(u16_at(&sent, 2), 0);
        assert_eq!(u32_at(&sent, 8), 5);
        assert_eq!(u32_at(&sent, 12), 3);
    }

    #[test]
    fn test_transport_failure_still_releases() {
        let mut transport = transport(13);
        transport.close();
        let result = create_channel_message(&mut transport, "foo", 1);

        assert!(matches!(result, Err(Error::Transport(_))));
        assert_eq!(transport.releases(), 1);
        assert_eq!(transport.discards(), 1);
    }

    #[test]
    fn test_search_request_exact_fit() {
        // 16 + "foo" + NUL = 20, aligned to 24
        let mut storage = [0xAAu8; 24];
        let mut buffer = &mut storage[..];
        assert!(search_request_message(&mut buffer, 13, "foo", 7).unwrap());
        assert!(buffer.is_empty());

        assert_eq!(u16_at(&storage, 0), 6);
        assert_eq!(u16_at(&storage, 2), 8);
        assert_eq!(u16_at(&storage, 4), SEARCH_DONT_REPLY);
        assert_eq!(u16_at(&storage, 6), 13);
        assert_eq!(u32_at(&storage, 8), 7);
        assert_eq!(u32_at(&storage, 12), 7);
        assert_eq!(&storage[16..], b"foo\0\0\0\0\0");
    }

    #[test]
    fn test_search_request_one_byte_short() {
        let mut storage = [0xAAu8; 23];
        let mut buffer = &mut storage[..];
        assert!(!search_request_message(&mut buffer, 13, "foo", 7).unwrap());
        assert_eq!(buffer.len(), 23);
        assert!(storage.iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn test_version_request_into_datagram() {
        let mut datagram = Vec::new();
        assert!(version_request_message(
            &mut datagram,
            13,
            VersionTag::SequenceNumber(9)
        ));
        assert_eq!(datagram.len(), HEADER_SIZE);
        assert_eq!(u16_at(&datagram, 4), 1);
        assert_eq!(u32_at(&datagram, 8), 9);

        let mut storage = [0u8; 15];
        let mut short = &mut storage[..];
        assert!(!version_request_message(
            &mut short,
            13,
            VersionTag::default()
        ));
    }
}

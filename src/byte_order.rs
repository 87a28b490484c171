//! Helpers for explicit wire byte-order conversions.
//!
//! Every multi-byte field in the protocol is a big-endian `u16`. Keeping the
//! conversions here scopes the Clippy expectations to the conversion points.

/// Serialise a `u16` in network byte order (big-endian).
///
/// # Examples
///
/// ```
/// use nibbleframe::byte_order::write_network_u16;
///
/// assert_eq!(write_network_u16(0x1234), [0x12, 0x34]);
/// ```
#[must_use]
pub fn write_network_u16(value: u16) -> [u8; 2] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Wire fields are big-endian by definition."
    )]
    value.to_be_bytes()
}

/// Parse a network-order `u16` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use nibbleframe::byte_order::read_network_u16;
///
/// assert_eq!(read_network_u16([0x12, 0x34]), 0x1234);
/// ```
#[must_use]
pub fn read_network_u16(bytes: [u8; 2]) -> u16 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Wire fields are big-endian by definition."
    )]
    u16::from_be_bytes(bytes)
}

/// Read the big-endian `u16` starting at `offset`, if two bytes are present.
#[must_use]
pub fn read_network_u16_at(bytes: &[u8], offset: usize) -> Option<u16> {
    let end = offset.checked_add(2)?;
    let pair = bytes.get(offset..end)?;
    <[u8; 2]>::try_from(pair).ok().map(read_network_u16)
}

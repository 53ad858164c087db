//! Minimal DER reader: just enough ASN.1 to read an RSA public key.
//!
//! Supports SEQUENCE, INTEGER, BIT STRING, OBJECT IDENTIFIER and NULL.
//! Tags are matched on their low five bits (the tag number).

use thiserror::Error;

/// INTEGER tag number.
pub const TAG_INTEGER: u8 = 0x02;
/// BIT STRING tag number.
pub const TAG_BIT_STRING: u8 = 0x03;
/// NULL tag number.
pub const TAG_NULL: u8 = 0x05;
/// OBJECT IDENTIFIER tag number.
pub const TAG_OID: u8 = 0x06;
/// SEQUENCE tag number.
pub const TAG_SEQUENCE: u8 = 0x10;

const TAG_NUMBER_MASK: u8 = 0x1f;

/// Structural DER failures. Offsets are relative to the buffer being read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DerError {
    /// A header or value extends past the end of the buffer.
    #[error("DER truncated at offset {offset}")]
    Truncated { offset: usize },

    /// Indefinite or oversized long-form length.
    #[error("invalid DER length encoding at offset {offset}")]
    InvalidLength { offset: usize },

    /// The element does not carry the tag the reader expects.
    #[error("expected DER tag {expected:#04x}, found {found:#04x}")]
    UnexpectedTag { expected: u8, found: u8 },

    /// BIT STRING with a nonzero unused-bits count.
    #[error("BIT STRING with {0} unused bits is not supported")]
    UnsupportedBitString(u8),
}

/// A tag/length/value view into a buffer. Never owns the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerNode {
    pub tag: u8,
    pub content_start: usize,
    pub content_end: usize,
}

impl DerNode {
    /// Tag number without class and constructed bits.
    pub fn tag_number(&self) -> u8 {
        self.tag & TAG_NUMBER_MASK
    }

    /// The node's content bytes within `buf`.
    pub fn content<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.content_start..self.content_end]
    }

    pub fn len(&self) -> usize {
        self.content_end - self.content_start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn expect(&self, expected: u8) -> Result<(), DerError> {
        if self.tag_number() == expected {
            Ok(())
        } else {
            Err(DerError::UnexpectedTag {
                expected,
                found: self.tag,
            })
        }
    }
}

/// Read one element starting at `offset`.
///
/// Returns the node and the offset of the next sibling. The returned content
/// range is always within `buf`.
///
/// # Errors
///
/// [`DerError::Truncated`] if the header or content runs past `buf`,
/// [`DerError::InvalidLength`] for indefinite or oversized lengths.
pub fn read_node(buf: &[u8], offset: usize) -> Result<(DerNode, usize), DerError> {
    let tag = *buf.get(offset).ok_or(DerError::Truncated { offset })?;
    let len_offset = offset + 1;
    let first = *buf
        .get(len_offset)
        .ok_or(DerError::Truncated { offset: len_offset })?;

    let (length, header_end) = if first & 0x80 == 0 {
        (usize::from(first), len_offset + 1)
    } else {
        let count = usize::from(first & 0x7f);
        if count == 0 || count > std::mem::size_of::<usize>() {
            return Err(DerError::InvalidLength { offset: len_offset });
        }
        let bytes_start = len_offset + 1;
        let bytes = buf
            .get(bytes_start..bytes_start + count)
            .ok_or(DerError::Truncated {
                offset: bytes_start,
            })?;
        let length = bytes
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | usize::from(b));
        (length, bytes_start + count)
    };

    let content_end = header_end
        .checked_add(length)
        .filter(|&end| end <= buf.len())
        .ok_or(DerError::Truncated { offset: header_end })?;

    let node = DerNode {
        tag,
        content_start: header_end,
        content_end,
    };
    Ok((node, content_end))
}

/// An INTEGER with its sign-disambiguation byte removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerInteger<'a> {
    /// Big-endian magnitude bytes.
    pub bytes: &'a [u8],
}

/// Sequential reader over the elements of one DER region.
///
/// Constructed readers ([`DerCursor::read_sequence`]) return a child cursor
/// bounded by the parent element's content, so children can never read past
/// their parent.
#[derive(Debug, Clone)]
pub struct DerCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> DerCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// `true` once every element in the region has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Tag of the next element without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// Read the next element of any type.
    pub fn read_node(&mut self) -> Result<DerNode, DerError> {
        let (node, next) = read_node(self.buf, self.pos)?;
        self.pos = next;
        Ok(node)
    }

    fn read_tagged(&mut self, expected: u8) -> Result<&'a [u8], DerError> {
        let (node, next) = read_node(self.buf, self.pos)?;
        node.expect(expected)?;
        self.pos = next;
        Ok(node.content(self.buf))
    }

    /// Read a SEQUENCE and return a cursor over its elements.
    pub fn read_sequence(&mut self) -> Result<DerCursor<'a>, DerError> {
        self.read_tagged(TAG_SEQUENCE).map(DerCursor::new)
    }

    /// Read an INTEGER, dropping one leading `0x00` sign byte when the
    /// content is longer than one byte.
    pub fn read_integer(&mut self) -> Result<DerInteger<'a>, DerError> {
        let offset = self.pos;
        let content = self.read_tagged(TAG_INTEGER)?;
        let bytes = match content {
            [] => return Err(DerError::Truncated { offset }),
            [0x00, rest @ ..] if !rest.is_empty() => rest,
            all => all,
        };
        Ok(DerInteger { bytes })
    }

    /// Read a byte-aligned BIT STRING and return the bits after the
    /// unused-bits prefix.
    pub fn read_bit_string(&mut self) -> Result<&'a [u8], DerError> {
        let offset = self.pos;
        match self.read_tagged(TAG_BIT_STRING)? {
            [] => Err(DerError::Truncated { offset }),
            [0x00, rest @ ..] => Ok(rest),
            [unused, ..] => Err(DerError::UnsupportedBitString(*unused)),
        }
    }

    /// Read an OBJECT IDENTIFIER and return its raw encoded arcs.
    pub fn read_oid(&mut self) -> Result<&'a [u8], DerError> {
        self.read_tagged(TAG_OID)
    }

    pub fn read_null(&mut self) -> Result<(), DerError> {
        self.read_tagged(TAG_NULL).map(|_| ())
    }
}

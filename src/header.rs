// Copyright 2026 The obex-client Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use tracing::trace;

use crate::error::PacketError;
use crate::{Decodable, Encodable};

mod obex_string;
pub use obex_string::ObexString;

/// The Header Encoding is the upper 2 bits of the Header Identifier (HI) and describes the type
/// of payload included in the Header.
/// Defined in OBEX 1.5 Section 2.1.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(u8)]
enum HeaderEncoding {
    /// A Header with null terminated Unicode text. The text is encoded in UTF-16 format. The
    /// text length is encoded as a two byte unsigned integer.
    Text = 0x00,
    /// A Header with a byte sequence. The sequence length is encoded as a two byte unsigned
    /// integer.
    Bytes = 0x40,
    /// A Header with a 1-byte payload.
    OneByte = 0x80,
    /// A Header with a 4-byte payload.
    FourBytes = 0xC0,
}

impl From<u8> for HeaderEncoding {
    fn from(src: u8) -> Self {
        // Only the upper 2 bits select the encoding, so every byte maps to a class.
        match src & 0xc0 {
            0x00 => HeaderEncoding::Text,
            0x40 => HeaderEncoding::Bytes,
            0x80 => HeaderEncoding::OneByte,
            _ => HeaderEncoding::FourBytes,
        }
    }
}

/// The OBEX Header Identifier (HI) identifies the type of OBEX Header.
///
/// The HI is a one-byte unsigned value and is split into the upper 2 bits and lower 6 bits. The
/// upper 2 bits indicate the header encoding and the lower 6 bits indicate the type of the
/// header.
/// Defined in OBEX 1.5 Section 2.1.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(u8)]
pub enum HeaderIdentifier {
    /// Number of objects.
    Count = 0xC0,
    /// Name of the object (typically a file name).
    Name = 0x01,
    /// Type of object (e.g. text, html, ...)
    Type = 0x42,
    /// The length of the object in bytes.
    Length = 0xC3,
    /// Date/time stamp - ISO 8601. This representation is preferred.
    TimeIso8601 = 0x44,
    /// Date/time stamp - 4 byte representation.
    Time4Byte = 0xC4,
    /// Text description of the object.
    Description = 0x05,
    /// Name of the service that the operation is targeting.
    Target = 0x46,
    /// An HTTP 1.x header.
    Http = 0x47,
    /// A chunk of the object body.
    Body = 0x48,
    /// The final chunk of the object body.
    EndOfBody = 0x49,
    /// Identifies the OBEX application session.
    Who = 0x4A,
    /// An identifier associated with the OBEX connection - used for connection multiplexing.
    ConnectionId = 0xCB,
    /// Extended information about the OBEX connection.
    ApplicationParameters = 0x4C,
    /// Authentication digest challenge.
    AuthenticationChallenge = 0x4D,
    /// Authentication digest response.
    AuthenticationResponse = 0x4E,
    /// Indicates the creator of the object.
    CreatorId = 0xCF,
    /// Uniquely identifies the network client.
    WanUuid = 0x50,
    /// Class of an OBEX object,
    ObjectClass = 0x51,
    /// Parameters associated with the OBEX session.
    SessionParameters = 0x52,
    /// Sequence number included in each OBEX packet - used for reliability.
    SessionSequenceNumber = 0x93,
    /// Specifies the type of ACTION Operation.
    ActionId = 0x94,
    /// The destination for an object - used in certain ACTION Operations.
    DestName = 0x15,
    /// Bit mask for setting permissions.
    Permissions = 0xD6,
    /// Indicates that Single Response Mode (SRM) should be used.
    SingleResponseMode = 0x97,
    /// Specifies the parameters used during SRM.
    SingleResponseModeParameters = 0x98,
    // 0x30 to 0x3F, 0x70 to 0x7F, 0xB0 to 0xBF, 0xF0 to 0xFF, is user defined.
    User(u8),
    // 0x19 to 0x2F, 0x59 to 0x6F, 0x99 to 0xAF, 0xD9 to 0xEF, is RFA.
}

impl HeaderIdentifier {
    fn is_user(id: u8) -> bool {
        // The user-defined space is between 0x30 and 0x3f and includes all combinations of the
        // upper 2 bits of the `id`.
        let lower_6_bits = id & 0x3f;
        lower_6_bits >= 0x30 && lower_6_bits <= 0x3f
    }

    fn is_reserved(id: u8) -> bool {
        // The reserved space is between 0x19 and 0x2f and includes all combinations of the
        // upper 2 bits of the `id`.
        let lower_6_bits = id & 0x3f;
        lower_6_bits >= 0x19 && lower_6_bits <= 0x2f
    }

    fn encoding(&self) -> HeaderEncoding {
        let id_raw: u8 = self.into();
        // The encoding is the upper 2 bits of the HeaderIdentifier.
        HeaderEncoding::from(id_raw)
    }
}

impl TryFrom<u8> for HeaderIdentifier {
    type Error = PacketError;

    fn try_from(src: u8) -> Result<Self, Self::Error> {
        match src {
            0xC0 => Ok(Self::Count),
            0x01 => Ok(Self::Name),
            0x42 => Ok(Self::Type),
            0xC3 => Ok(Self::Length),
            0x44 => Ok(Self::TimeIso8601),
            0xC4 => Ok(Self::Time4Byte),
            0x05 => Ok(Self::Description),
            0x46 => Ok(Self::Target),
            0x47 => Ok(Self::Http),
            0x48 => Ok(Self::Body),
            0x49 => Ok(Self::EndOfBody),
            0x4A => Ok(Self::Who),
            0xCB => Ok(Self::ConnectionId),
            0x4C => Ok(Self::ApplicationParameters),
            0x4D => Ok(Self::AuthenticationChallenge),
            0x4E => Ok(Self::AuthenticationResponse),
            0xCF => Ok(Self::CreatorId),
            0x50 => Ok(Self::WanUuid),
            0x51 => Ok(Self::ObjectClass),
            0x52 => Ok(Self::SessionParameters),
            0x93 => Ok(Self::SessionSequenceNumber),
            0x94 => Ok(Self::ActionId),
            0x15 => Ok(Self::DestName),
            0xD6 => Ok(Self::Permissions),
            0x97 => Ok(Self::SingleResponseMode),
            0x98 => Ok(Self::SingleResponseModeParameters),
            id if HeaderIdentifier::is_user(id) => Ok(Self::User(id)),
            id if HeaderIdentifier::is_reserved(id) => Err(Self::Error::Reserved),
            id => Err(Self::Error::Identifier(id)),
        }
    }
}

impl From<&HeaderIdentifier> for u8 {
    fn from(src: &HeaderIdentifier) -> u8 {
        match src {
            HeaderIdentifier::Count => 0xC0,
            HeaderIdentifier::Name => 0x01,
            HeaderIdentifier::Type => 0x42,
            HeaderIdentifier::Length => 0xC3,
            HeaderIdentifier::TimeIso8601 => 0x44,
            HeaderIdentifier::Time4Byte => 0xC4,
            HeaderIdentifier::Description => 0x05,
            HeaderIdentifier::Target => 0x46,
            HeaderIdentifier::Http => 0x47,
            HeaderIdentifier::Body => 0x48,
            HeaderIdentifier::EndOfBody => 0x49,
            HeaderIdentifier::Who => 0x4A,
            HeaderIdentifier::ConnectionId => 0xCB,
            HeaderIdentifier::ApplicationParameters => 0x4C,
            HeaderIdentifier::AuthenticationChallenge => 0x4D,
            HeaderIdentifier::AuthenticationResponse => 0x4E,
            HeaderIdentifier::CreatorId => 0xCF,
            HeaderIdentifier::WanUuid => 0x50,
            HeaderIdentifier::ObjectClass => 0x51,
            HeaderIdentifier::SessionParameters => 0x52,
            HeaderIdentifier::SessionSequenceNumber => 0x93,
            HeaderIdentifier::ActionId => 0x94,
            HeaderIdentifier::DestName => 0x15,
            HeaderIdentifier::Permissions => 0xD6,
            HeaderIdentifier::SingleResponseMode => 0x97,
            HeaderIdentifier::SingleResponseModeParameters => 0x98,
            HeaderIdentifier::User(id) => *id,
        }
    }
}

/// Represents a user-defined Header type.
#[derive(Clone, Debug, PartialEq)]
pub struct UserDefinedHeader {
    /// The Header Identifier (HI) - the lower 6 bits can be any value between 0x30 and 0x3f. See
    /// `HeaderIdentifier::User` for more details.
    identifier: u8,
    /// The user data, already in its on-wire payload form.
    value: Vec<u8>,
}

impl UserDefinedHeader {
    pub fn new(identifier: u8, value: Vec<u8>) -> Self {
        Self { identifier, value }
    }
}

/// The building block of an OBEX object. A single OBEX object consists of one or more Headers.
#[derive(Clone, Debug, PartialEq)]
pub enum Header {
    Count(u32),
    Name(String),
    Type(String),
    /// Number of bytes.
    Length(u32),
    /// Time represented as a String "YYYYMMDDTHHMMSSZ".
    TimeIso8601(String),
    Time4Byte(u32),
    Description(String),
    Target(Vec<u8>),
    Http(Vec<u8>),
    Body(Vec<u8>),
    EndOfBody(Vec<u8>),
    Who(Vec<u8>),
    ConnectionId(u32),
    ApplicationParameters(Vec<u8>),
    AuthenticationChallenge(Vec<u8>),
    AuthenticationResponse(Vec<u8>),
    CreatorId(u32),
    WanUuid([u8; 16]),
    ObjectClass(Vec<u8>),
    SessionParameters(Vec<u8>),
    SessionSequenceNumber(u8),
    ActionId(u8),
    DestName(String),
    /// 4-byte bit mask.
    Permissions(u32),
    SingleResponseMode(u8),
    SingleResponseModeParameters(u8),
    /// User defined Header type.
    User(UserDefinedHeader),
}

impl Header {
    /// The minimal Header contains at least a 1-byte identifier.
    const MIN_HEADER_LENGTH_BYTES: usize = 1;

    /// A Unicode or Byte Sequence Header must be at least 3 bytes - 1 byte for the HI and 2 bytes
    /// for the encoded data length.
    const MIN_UNICODE_OR_BYTE_SEQ_LENGTH_BYTES: usize = 3;

    pub fn identifier(&self) -> HeaderIdentifier {
        match &self {
            Self::Count(_) => HeaderIdentifier::Count,
            Self::Name(_) => HeaderIdentifier::Name,
            Self::Type(_) => HeaderIdentifier::Type,
            Self::Length(_) => HeaderIdentifier::Length,
            Self::TimeIso8601(_) => HeaderIdentifier::TimeIso8601,
            Self::Time4Byte(_) => HeaderIdentifier::Time4Byte,
            Self::Description(_) => HeaderIdentifier::Description,
            Self::Target(_) => HeaderIdentifier::Target,
            Self::Http(_) => HeaderIdentifier::Http,
            Self::Body(_) => HeaderIdentifier::Body,
            Self::EndOfBody(_) => HeaderIdentifier::EndOfBody,
            Self::Who(_) => HeaderIdentifier::Who,
            Self::ConnectionId(_) => HeaderIdentifier::ConnectionId,
            Self::ApplicationParameters(_) => HeaderIdentifier::ApplicationParameters,
            Self::AuthenticationChallenge(_) => HeaderIdentifier::AuthenticationChallenge,
            Self::AuthenticationResponse(_) => HeaderIdentifier::AuthenticationResponse,
            Self::CreatorId(_) => HeaderIdentifier::CreatorId,
            Self::WanUuid(_) => HeaderIdentifier::WanUuid,
            Self::ObjectClass(_) => HeaderIdentifier::ObjectClass,
            Self::SessionParameters(_) => HeaderIdentifier::SessionParameters,
            Self::SessionSequenceNumber(_) => HeaderIdentifier::SessionSequenceNumber,
            Self::ActionId(_) => HeaderIdentifier::ActionId,
            Self::DestName(_) => HeaderIdentifier::DestName,
            Self::Permissions(_) => HeaderIdentifier::Permissions,
            Self::SingleResponseMode(_) => HeaderIdentifier::SingleResponseMode,
            Self::SingleResponseModeParameters(_) => HeaderIdentifier::SingleResponseModeParameters,
            Self::User(UserDefinedHeader { identifier, .. }) => HeaderIdentifier::User(*identifier),
        }
    }

    /// Returns the on-wire payload bytes for this Header - the value portion only, not the HI or
    /// the optional length prefix.
    fn payload(&self) -> Vec<u8> {
        match &self {
            Self::Count(v)
            | Self::Length(v)
            | Self::Time4Byte(v)
            | Self::ConnectionId(v)
            | Self::CreatorId(v)
            | Self::Permissions(v) => v.to_be_bytes().to_vec(),
            Self::Name(s)
            | Self::Type(s)
            | Self::TimeIso8601(s)
            | Self::Description(s)
            | Self::DestName(s) => ObexString::from(s.as_str()).to_be_bytes(),
            Self::Target(b)
            | Self::Http(b)
            | Self::Body(b)
            | Self::EndOfBody(b)
            | Self::Who(b)
            | Self::ApplicationParameters(b)
            | Self::AuthenticationChallenge(b)
            | Self::AuthenticationResponse(b)
            | Self::ObjectClass(b)
            | Self::SessionParameters(b) => b.clone(),
            Self::WanUuid(uuid) => uuid.to_vec(),
            Self::SessionSequenceNumber(v)
            | Self::ActionId(v)
            | Self::SingleResponseMode(v)
            | Self::SingleResponseModeParameters(v) => vec![*v],
            Self::User(UserDefinedHeader { value, .. }) => value.clone(),
        }
    }

    /// Attempts to parse a single Header from the start of `buf`. Returns the Header and the
    /// number of bytes consumed on success.
    fn parse(buf: &[u8]) -> Result<(Self, usize), PacketError> {
        // The buffer should contain at least the Header Identifier.
        if buf.len() < Self::MIN_HEADER_LENGTH_BYTES {
            return Err(PacketError::BufferTooSmall);
        }

        let id = HeaderIdentifier::try_from(buf[0])?;
        let mut start_idx = Self::MIN_HEADER_LENGTH_BYTES;
        let data_length = match id.encoding() {
            HeaderEncoding::Text | HeaderEncoding::Bytes => {
                if buf.len() < Self::MIN_UNICODE_OR_BYTE_SEQ_LENGTH_BYTES {
                    return Err(PacketError::BufferTooSmall);
                }
                // For Unicode Text and Byte Sequences, the payload length is encoded in the next
                // two bytes - this value includes 1 byte for the HI and 2 bytes for the length.
                let total_length = u16::from_be_bytes(
                    buf[Self::MIN_HEADER_LENGTH_BYTES..Self::MIN_UNICODE_OR_BYTE_SEQ_LENGTH_BYTES]
                        .try_into()
                        .expect("checked length"),
                ) as usize;
                let data_length = total_length
                    .checked_sub(Self::MIN_UNICODE_OR_BYTE_SEQ_LENGTH_BYTES)
                    .ok_or(PacketError::DataLength)?;
                start_idx = Self::MIN_UNICODE_OR_BYTE_SEQ_LENGTH_BYTES;
                data_length
            }
            HeaderEncoding::OneByte => 1,
            HeaderEncoding::FourBytes => 4,
        };
        trace!(?id, %data_length, "parsed OBEX header");

        if buf.len() < start_idx + data_length {
            return Err(PacketError::BufferTooSmall);
        }

        let data = &buf[start_idx..start_idx + data_length];
        let consumed = start_idx + data_length;
        let header = match id {
            HeaderIdentifier::Count => Header::Count(u32_from_be_bytes(data)?),
            HeaderIdentifier::Name => Header::Name(ObexString::try_from(data)?.into()),
            HeaderIdentifier::Type => Header::Type(ObexString::try_from(data)?.into()),
            HeaderIdentifier::Length => Header::Length(u32_from_be_bytes(data)?),
            HeaderIdentifier::TimeIso8601 => Header::TimeIso8601(ObexString::try_from(data)?.into()),
            HeaderIdentifier::Time4Byte => Header::Time4Byte(u32_from_be_bytes(data)?),
            HeaderIdentifier::Description => Header::Description(ObexString::try_from(data)?.into()),
            HeaderIdentifier::Target => Header::Target(data.to_vec()),
            HeaderIdentifier::Http => Header::Http(data.to_vec()),
            HeaderIdentifier::Body => Header::Body(data.to_vec()),
            HeaderIdentifier::EndOfBody => Header::EndOfBody(data.to_vec()),
            HeaderIdentifier::Who => Header::Who(data.to_vec()),
            HeaderIdentifier::ConnectionId => Header::ConnectionId(u32_from_be_bytes(data)?),
            HeaderIdentifier::ApplicationParameters => Header::ApplicationParameters(data.to_vec()),
            HeaderIdentifier::AuthenticationChallenge => {
                Header::AuthenticationChallenge(data.to_vec())
            }
            HeaderIdentifier::AuthenticationResponse => {
                Header::AuthenticationResponse(data.to_vec())
            }
            HeaderIdentifier::CreatorId => Header::CreatorId(u32_from_be_bytes(data)?),
            HeaderIdentifier::WanUuid => {
                let bytes: [u8; 16] = data.try_into().map_err(|_| PacketError::DataLength)?;
                Header::WanUuid(bytes)
            }
            HeaderIdentifier::ObjectClass => Header::ObjectClass(data.to_vec()),
            HeaderIdentifier::SessionParameters => Header::SessionParameters(data.to_vec()),
            HeaderIdentifier::SessionSequenceNumber => Header::SessionSequenceNumber(data[0]),
            HeaderIdentifier::ActionId => Header::ActionId(data[0]),
            HeaderIdentifier::DestName => Header::DestName(ObexString::try_from(data)?.into()),
            HeaderIdentifier::Permissions => Header::Permissions(u32_from_be_bytes(data)?),
            HeaderIdentifier::SingleResponseMode => Header::SingleResponseMode(data[0]),
            HeaderIdentifier::SingleResponseModeParameters => {
                Header::SingleResponseModeParameters(data[0])
            }
            HeaderIdentifier::User(identifier) => {
                Header::User(UserDefinedHeader { identifier, value: data.to_vec() })
            }
        };
        Ok((header, consumed))
    }
}

fn u32_from_be_bytes(data: &[u8]) -> Result<u32, PacketError> {
    let bytes: [u8; 4] = data.try_into().map_err(|_| PacketError::DataLength)?;
    Ok(u32::from_be_bytes(bytes))
}

impl Encodable for Header {
    type Error = PacketError;

    fn encoded_len(&self) -> usize {
        match self.identifier().encoding() {
            // One byte for the HI and two bytes for the encoded length prefix.
            HeaderEncoding::Text | HeaderEncoding::Bytes => {
                Self::MIN_UNICODE_OR_BYTE_SEQ_LENGTH_BYTES + self.payload().len()
            }
            HeaderEncoding::OneByte => Self::MIN_HEADER_LENGTH_BYTES + 1,
            HeaderEncoding::FourBytes => Self::MIN_HEADER_LENGTH_BYTES + 4,
        }
    }

    fn encode(&self, buf: &mut [u8]) -> Result<(), Self::Error> {
        let encoded_len = self.encoded_len();
        if buf.len() < encoded_len {
            return Err(PacketError::BufferTooSmall);
        }

        let id = self.identifier();
        buf[0] = (&id).into();
        let payload = self.payload();
        let payload_idx = match id.encoding() {
            HeaderEncoding::Text | HeaderEncoding::Bytes => {
                // The encoded length includes the HI and the length prefix itself.
                let total = (encoded_len as u16).to_be_bytes();
                buf[Self::MIN_HEADER_LENGTH_BYTES..Self::MIN_UNICODE_OR_BYTE_SEQ_LENGTH_BYTES]
                    .copy_from_slice(&total);
                Self::MIN_UNICODE_OR_BYTE_SEQ_LENGTH_BYTES
            }
            HeaderEncoding::OneByte | HeaderEncoding::FourBytes => Self::MIN_HEADER_LENGTH_BYTES,
        };
        buf[payload_idx..payload_idx + payload.len()].copy_from_slice(&payload);
        Ok(())
    }
}

impl Decodable for Header {
    type Error = PacketError;

    fn decode(buf: &[u8]) -> Result<Self, Self::Error> {
        Self::parse(buf).map(|(header, _consumed)| header)
    }
}

/// A collection of OBEX Headers keyed by their [`HeaderIdentifier`].
///
/// A packet carries at most one value per identifier - setting an identifier that is already
/// present overwrites the previous value. Iteration and wire encoding preserve insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeaderSet {
    headers: Vec<Header>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self { headers: Vec::new() }
    }

    pub fn from_header(header: Header) -> Self {
        let mut set = Self::new();
        set.set(header);
        set
    }

    pub fn from_headers(headers: Vec<Header>) -> Self {
        let mut set = Self::new();
        for header in headers {
            set.set(header);
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn contains_header(&self, id: &HeaderIdentifier) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &HeaderIdentifier) -> Option<&Header> {
        self.headers.iter().find(|h| h.identifier() == *id)
    }

    /// Adds `header` to the collection, replacing any existing value with the same identifier.
    /// A replaced header keeps its original position in the insertion order.
    pub fn set(&mut self, header: Header) {
        let id = header.identifier();
        match self.headers.iter_mut().find(|h| h.identifier() == id) {
            Some(existing) => *existing = header,
            None => self.headers.push(header),
        }
    }

    /// Removes and returns the header with the provided `id`, if present.
    pub fn remove(&mut self, id: &HeaderIdentifier) -> Option<Header> {
        let position = self.headers.iter().position(|h| h.identifier() == *id)?;
        Some(self.headers.remove(position))
    }

    /// Returns an iterator over the headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.headers.iter()
    }

    /// Appends `bytes` to the Body header, adopting `bytes` as the Body if none is present.
    /// Used when reassembling a multi-packet response body - concatenation order is wire
    /// arrival order.
    pub fn append_body(&mut self, mut bytes: Vec<u8>) {
        match self.headers.iter_mut().find(|h| h.identifier() == HeaderIdentifier::Body) {
            Some(Header::Body(existing)) => existing.append(&mut bytes),
            _ => self.set(Header::Body(bytes)),
        }
    }

    /// Returns the Body payload, if present.
    pub fn body(&self) -> Option<&[u8]> {
        match self.get(&HeaderIdentifier::Body) {
            Some(Header::Body(bytes)) => Some(&bytes[..]),
            _ => None,
        }
    }
}

impl Encodable for HeaderSet {
    type Error = PacketError;

    fn encoded_len(&self) -> usize {
        self.headers.iter().map(Encodable::encoded_len).sum()
    }

    fn encode(&self, buf: &mut [u8]) -> Result<(), Self::Error> {
        if buf.len() < self.encoded_len() {
            return Err(PacketError::BufferTooSmall);
        }

        let mut idx = 0;
        for header in &self.headers {
            header.encode(&mut buf[idx..])?;
            idx += header.encoded_len();
        }
        Ok(())
    }
}

impl Decodable for HeaderSet {
    type Error = PacketError;

    fn decode(buf: &[u8]) -> Result<Self, Self::Error> {
        let mut set = Self::new();
        let mut idx = 0;
        while idx < buf.len() {
            let (header, consumed) = Header::parse(&buf[idx..])?;
            set.set(header);
            idx += consumed;
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn is_user_id() {
        let ids = [0x00, 0x10, 0x29, 0x40, 0x80, 0xc0];
        for id in ids {
            assert!(!HeaderIdentifier::is_user(id));
        }

        let ids = [0x30, 0x3f, 0x71, 0x7f, 0xb5, 0xbf, 0xf0, 0xff];
        for id in ids {
            assert!(HeaderIdentifier::is_user(id));
        }
    }

    #[test]
    fn is_reserved_id() {
        let ids = [0x00, 0x10, 0x30, 0x70, 0xb0, 0xf0];
        for id in ids {
            assert!(!HeaderIdentifier::is_reserved(id));
        }

        let ids = [0x19, 0x2f, 0x60, 0x6f, 0x99, 0xae, 0xd9, 0xef];
        for id in ids {
            assert!(HeaderIdentifier::is_reserved(id));
        }
    }

    #[test]
    fn valid_header_id_parsed_ok() {
        let valid = 0x15;
        let result = HeaderIdentifier::try_from(valid);
        assert_matches!(result, Ok(HeaderIdentifier::DestName));
    }

    #[test]
    fn user_header_id_is_ok() {
        let user_header_id_raw = 0x33;
        let result = HeaderIdentifier::try_from(user_header_id_raw);
        assert_matches!(result, Ok(HeaderIdentifier::User(_)));
    }

    #[test]
    fn rfa_header_id_is_reserved_error() {
        let rfa_header_id_raw = 0x20;
        let result = HeaderIdentifier::try_from(rfa_header_id_raw);
        assert_matches!(result, Err(PacketError::Reserved));
    }

    #[test]
    fn unknown_header_id_is_error() {
        // The lower 6 bits of this represent the Length Header. However, the upper 2 bits are
        // incorrect - therefore the Header ID is considered invalid.
        let unknown_header_id_raw = 0x03;
        let result = HeaderIdentifier::try_from(unknown_header_id_raw);
        assert_matches!(result, Err(PacketError::Identifier(_)));
    }

    #[test]
    fn header_encoding_from_identifier() {
        assert_eq!(HeaderIdentifier::SessionSequenceNumber.encoding(), HeaderEncoding::OneByte);
        assert_eq!(HeaderIdentifier::Count.encoding(), HeaderEncoding::FourBytes);
        assert_eq!(HeaderIdentifier::Name.encoding(), HeaderEncoding::Text);
        assert_eq!(HeaderIdentifier::Target.encoding(), HeaderEncoding::Bytes);
    }

    #[test]
    fn decode_empty_header_is_error() {
        assert_matches!(Header::decode(&[]), Err(PacketError::BufferTooSmall));
    }

    #[test]
    fn decode_header_no_payload_is_error() {
        // Valid Count Header but no contents.
        assert_matches!(Header::decode(&[0xc0]), Err(PacketError::BufferTooSmall));
    }

    #[test]
    fn decode_byte_seq_invalid_length_is_error() {
        // Valid `Name` Header (Text) but the provided length is only 1 byte.
        let buf = [0x01, 0x07];
        assert_matches!(Header::decode(&buf), Err(PacketError::BufferTooSmall));

        // Valid `Target` Header (Byte Seq) but the provided length is only 1 byte.
        let buf = [0x46, 0x05];
        assert_matches!(Header::decode(&buf), Err(PacketError::BufferTooSmall));

        // Valid `Body` Header (Byte Seq) but the declared length is too small - it must be >= 3.
        let buf = [0x48, 0x00, 0x02];
        assert_matches!(Header::decode(&buf), Err(PacketError::DataLength));
    }

    #[test]
    fn decode_header_invalid_payload_is_error() {
        // The provided payload doesn't match the expected data length.
        let buf = [
            0x42, // `Type` Header (Text)
            0x00, 0x0b, // Total length = 11 implies a data length of 8.
            0x00, 0x68, 0x00, 0x69, 0x00,
            0x00, // Payload = "hi" with a null terminator -> 6 length
        ];
        assert_matches!(Header::decode(&buf), Err(PacketError::BufferTooSmall));

        // The provided payload doesn't match the expected data length.
        let buf = [
            0xc3, // `Length` Header (4 bytes)
            0x00, 0x00, 0x00, // Payload = 3 bytes (should be 4).
        ];
        assert_matches!(Header::decode(&buf), Err(PacketError::BufferTooSmall));

        // The provided payload doesn't match the expected data length.
        let buf = [
            0x94, // `ActionId` Header (Expect 1 byte payload)
        ];
        assert_matches!(Header::decode(&buf), Err(PacketError::BufferTooSmall));

        // The provided payload doesn't match the expected data length.
        let buf = [
            0x49, // `EndOfBody` Header (Byte seq)
            0x00, 0x06, // Total length = 6 implies a data length of 3.
            0x12, 0x34, // Payload = 2 bytes (should be 3),
        ];
        assert_matches!(Header::decode(&buf), Err(PacketError::BufferTooSmall));
    }

    #[test]
    fn decode_valid_header_success() {
        // Text Header
        let name_buf = [
            0x01, // HI = Name
            0x00, 0x17, // Total length = 23 bytes
            0x00, 0x54, 0x00, 0x48, 0x00, 0x49,
            0x00, // 20 byte payload = "THING.DOC" (utf-16)
            0x4e, 0x00, 0x47, 0x00, 0x2e, 0x00, 0x44, 0x00, 0x4f, 0x00, 0x43, 0x00, 0x00,
        ];
        let result = Header::decode(&name_buf).expect("can decode name header");
        assert_eq!(result, Header::Name("THING.DOC".to_string()));

        // Byte Sequence Header
        let object_class_buf = [
            0x51, // HI = Object Class
            0x00, 0x0a, // Total length = 10 bytes
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, // 7 byte payload
        ];
        let result = Header::decode(&object_class_buf).expect("can decode object class header");
        assert_eq!(result, Header::ObjectClass(vec![0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06]));

        // One-byte Header
        let session_seq_num_buf = [
            0x93, // HI = Session Sequence Number
            0x05, // 1 byte payload
        ];
        let result = Header::decode(&session_seq_num_buf).expect("can decode valid header");
        assert_eq!(result, Header::SessionSequenceNumber(5));

        // Four-byte Header
        let connection_id_buf = [
            0xcb, // HI = Connection Id
            0x00, 0x00, 0x12, 0x34, // 4 byte payload
        ];
        let result = Header::decode(&connection_id_buf).expect("can decode connection id header");
        assert_eq!(result, Header::ConnectionId(0x1234));
    }

    #[test]
    fn decode_user_data_header_success() {
        let user_buf = [
            0xb3, // HI = Random User defined
            0x05, // Upper 2 bits of HI indicate 1 byte payload
        ];
        let result = Header::decode(&user_buf).expect("can decode user header");
        assert_eq!(result, Header::User(UserDefinedHeader::new(0xb3, vec![0x05])));
    }

    #[test]
    fn encode_header_success() {
        // Text Header - total length counts the HI and length prefix.
        let name = Header::Name("THING.DOC".to_string());
        assert_eq!(name.encoded_len(), 23);
        let mut buf = vec![0; name.encoded_len()];
        name.encode(&mut buf).expect("can encode name header");
        let expected = [
            0x01, 0x00, 0x17, 0x00, 0x54, 0x00, 0x48, 0x00, 0x49, 0x00, 0x4e, 0x00, 0x47, 0x00,
            0x2e, 0x00, 0x44, 0x00, 0x4f, 0x00, 0x43, 0x00, 0x00,
        ];
        assert_eq!(buf, expected);

        // Byte Sequence Header.
        let target = Header::Target(vec![0x00, 0x02, 0x04]);
        assert_eq!(target.encoded_len(), 6);
        let mut buf = vec![0; target.encoded_len()];
        target.encode(&mut buf).expect("can encode target header");
        assert_eq!(buf, [0x46, 0x00, 0x06, 0x00, 0x02, 0x04]);

        // One-byte Header.
        let action = Header::ActionId(2);
        assert_eq!(action.encoded_len(), 2);
        let mut buf = vec![0; action.encoded_len()];
        action.encode(&mut buf).expect("can encode action header");
        assert_eq!(buf, [0x94, 0x02]);

        // Four-byte Header.
        let length = Header::Length(0xf483);
        assert_eq!(length.encoded_len(), 5);
        let mut buf = vec![0; length.encoded_len()];
        length.encode(&mut buf).expect("can encode length header");
        assert_eq!(buf, [0xc3, 0x00, 0x00, 0xf4, 0x83]);
    }

    #[test]
    fn encode_header_buffer_too_small_is_error() {
        let header = Header::ConnectionId(1);
        let mut buf = vec![0; header.encoded_len() - 1];
        assert_matches!(header.encode(&mut buf), Err(PacketError::BufferTooSmall));
    }

    #[test]
    fn header_roundtrip() {
        let headers = vec![
            Header::Name("inbox".to_string()),
            Header::Target(vec![0x01, 0x02, 0x03]),
            Header::ConnectionId(0xf00d),
            Header::ActionId(0x01),
            Header::WanUuid([0xab; 16]),
        ];
        for header in headers {
            let mut buf = vec![0; header.encoded_len()];
            header.encode(&mut buf).expect("can encode header");
            let decoded = Header::decode(&buf).expect("can decode header");
            assert_eq!(decoded, header);
        }
    }

    #[test]
    fn header_set_overwrites_duplicate_id() {
        let mut headers = HeaderSet::new();
        headers.set(Header::Name("first".to_string()));
        headers.set(Header::ConnectionId(1));
        assert_eq!(headers.len(), 2);

        // Setting the same identifier again replaces the value, keeping its position.
        headers.set(Header::Name("second".to_string()));
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get(&HeaderIdentifier::Name), Some(&Header::Name("second".to_string())));
        let first = headers.iter().next().expect("nonempty");
        assert_eq!(first.identifier(), HeaderIdentifier::Name);
    }

    #[test]
    fn header_set_preserves_insertion_order() {
        let headers = HeaderSet::from_headers(vec![
            Header::ConnectionId(1),
            Header::Name("a".to_string()),
            Header::Length(10),
        ]);
        let ids: Vec<HeaderIdentifier> = headers.iter().map(Header::identifier).collect();
        assert_eq!(
            ids,
            vec![HeaderIdentifier::ConnectionId, HeaderIdentifier::Name, HeaderIdentifier::Length]
        );

        // Encoding preserves the same order.
        let mut buf = vec![0; headers.encoded_len()];
        headers.encode(&mut buf).expect("can encode header set");
        assert_eq!(buf[0], 0xcb); // ConnectionId first.
        assert_eq!(buf[5], 0x01); // Name second.
    }

    #[test]
    fn header_set_roundtrip() {
        let headers = HeaderSet::from_headers(vec![
            Header::Name("app".to_string()),
            Header::Body(vec![1, 2, 3]),
            Header::Length(3),
        ]);
        let mut buf = vec![0; headers.encoded_len()];
        headers.encode(&mut buf).expect("can encode header set");
        let decoded = HeaderSet::decode(&buf).expect("can decode header set");
        assert_eq!(decoded, headers);
    }

    #[test]
    fn decode_header_set_with_truncated_header_is_error() {
        // A valid ConnectionId header followed by a Body header whose declared length overruns
        // the remaining bytes.
        let buf = [
            0xcb, 0x00, 0x00, 0x00, 0x01, // ConnectionId = 1
            0x48, 0x00, 0x0a, 0x01, 0x02, // Body with declared length 10, only 2 payload bytes
        ];
        assert_matches!(HeaderSet::decode(&buf), Err(PacketError::BufferTooSmall));
    }

    #[test]
    fn append_body_adopts_then_concatenates() {
        let mut headers = HeaderSet::new();
        assert_eq!(headers.body(), None);

        headers.append_body(vec![0x41, 0x42]);
        assert_eq!(headers.body(), Some(&[0x41, 0x42][..]));

        headers.append_body(vec![0x43, 0x44]);
        assert_eq!(headers.body(), Some(&[0x41, 0x42, 0x43, 0x44][..]));
    }
}

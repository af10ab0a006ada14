// Copyright 2026 The obex-client Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use core::fmt;

use crate::error::PacketError;
use crate::header::HeaderSet;
use crate::{Decodable, Encodable};

/// The current OBEX Protocol version number is 1.0.
/// The protocol version is not necessarily the same as the specification version.
/// Defined in OBEX 1.5 Section 3.4.1.1.
const OBEX_PROTOCOL_VERSION_NUMBER: u8 = 0x10;

/// The maximum length of an OBEX packet is bounded by the 2-byte field describing the packet
/// length (u16::MAX).
/// Defined in OBEX 1.5 Section 3.4.1.3.
pub const MAX_PACKET_SIZE: usize = u16::MAX as usize;

/// The semantic operation associated with an OBEX opcode - the lower 7 bits of the opcode byte.
///
/// Request operations and server response codes share this space; which of the two a value means
/// is determined by the direction of the packet. Response codes mirror HTTP status codes - see
/// OBEX 1.5 Section 3.2.1.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(u8)]
pub enum ObexOperation {
    // Request operations. Defined in OBEX 1.5 Section 3.4.
    Connect = 0x00,
    Disconnect = 0x01,
    Put = 0x02,
    Get = 0x03,
    SetPath = 0x05,
    Session = 0x07,
    Abort = 0x7F,
    // Response codes. Defined in OBEX 1.5 Section 3.2.1.
    Continue = 0x10,
    Success = 0x20,
    Created = 0x21,
    Accepted = 0x22,
    NonAuthoritativeInformation = 0x23,
    NoContent = 0x24,
    ResetContent = 0x25,
    PartialContent = 0x26,
    MultipleChoices = 0x30,
    MovedPermanently = 0x31,
    MovedTemporarily = 0x32,
    SeeOther = 0x33,
    NotModified = 0x34,
    UseProxy = 0x35,
    BadRequest = 0x40,
    Unauthorized = 0x41,
    PaymentRequired = 0x42,
    Forbidden = 0x43,
    NotFound = 0x44,
    MethodNotAllowed = 0x45,
    NotAcceptable = 0x46,
    ProxyAuthenticationRequired = 0x47,
    RequestTimeOut = 0x48,
    Conflict = 0x49,
    Gone = 0x4A,
    LengthRequired = 0x4B,
    PreconditionFailed = 0x4C,
    RequestedEntityTooLarge = 0x4D,
    RequestedUrlTooLarge = 0x4E,
    UnsupportedMediaType = 0x4F,
    InternalServerError = 0x50,
    NotImplemented = 0x51,
    BadGateway = 0x52,
    ServiceUnavailable = 0x53,
    GatewayTimeout = 0x54,
    HttpVersionNotSupported = 0x55,
    DatabaseFull = 0x60,
    DatabaseLocked = 0x61,
}

impl ObexOperation {
    /// Returns the expected length (in bytes) of the operation-specific data that precedes the
    /// headers in packets of this operation (and in the replies it elicits).
    /// Returns 0 if the operation carries no such data.
    /// See OBEX 1.5 Section 3.4 for the specifics of each Operation.
    pub(crate) fn data_length(&self) -> usize {
        match &self {
            Self::Connect => 4, // OBEX Version (1) + Flags (1) + Max Packet Length (2)
            _ => 0,
        }
    }
}

impl TryFrom<u8> for ObexOperation {
    type Error = PacketError;

    /// Attempts to convert the lower 7 bits of an opcode byte into a recognized operation.
    fn try_from(src: u8) -> Result<Self, Self::Error> {
        let code = match src {
            0x00 => Self::Connect,
            0x01 => Self::Disconnect,
            0x02 => Self::Put,
            0x03 => Self::Get,
            0x05 => Self::SetPath,
            0x07 => Self::Session,
            0x7F => Self::Abort,
            0x10 => Self::Continue,
            0x20 => Self::Success,
            0x21 => Self::Created,
            0x22 => Self::Accepted,
            0x23 => Self::NonAuthoritativeInformation,
            0x24 => Self::NoContent,
            0x25 => Self::ResetContent,
            0x26 => Self::PartialContent,
            0x30 => Self::MultipleChoices,
            0x31 => Self::MovedPermanently,
            0x32 => Self::MovedTemporarily,
            0x33 => Self::SeeOther,
            0x34 => Self::NotModified,
            0x35 => Self::UseProxy,
            0x40 => Self::BadRequest,
            0x41 => Self::Unauthorized,
            0x42 => Self::PaymentRequired,
            0x43 => Self::Forbidden,
            0x44 => Self::NotFound,
            0x45 => Self::MethodNotAllowed,
            0x46 => Self::NotAcceptable,
            0x47 => Self::ProxyAuthenticationRequired,
            0x48 => Self::RequestTimeOut,
            0x49 => Self::Conflict,
            0x4A => Self::Gone,
            0x4B => Self::LengthRequired,
            0x4C => Self::PreconditionFailed,
            0x4D => Self::RequestedEntityTooLarge,
            0x4E => Self::RequestedUrlTooLarge,
            0x4F => Self::UnsupportedMediaType,
            0x50 => Self::InternalServerError,
            0x51 => Self::NotImplemented,
            0x52 => Self::BadGateway,
            0x53 => Self::ServiceUnavailable,
            0x54 => Self::GatewayTimeout,
            0x55 => Self::HttpVersionNotSupported,
            0x60 => Self::DatabaseFull,
            0x61 => Self::DatabaseLocked,
            code => return Err(PacketError::Identifier(code)),
        };
        Ok(code)
    }
}

/// The first byte of every OBEX packet: a 7-bit operation combined with the final bit.
///
/// The most significant bit indicates that the packet is the last packet of a logical request.
/// Every byte is representable - values whose operation bits don't map to a recognized
/// [`ObexOperation`] are vendor/user-defined and are reported as `None` by
/// [`ObexOpcode::operation`]. Such opcodes cannot be used as request targets.
/// Defined in OBEX 1.5 Section 3.1.
#[derive(Clone, Copy, PartialEq)]
pub struct ObexOpcode(u8);

impl ObexOpcode {
    const FINAL_BIT: u8 = 0x80;
    const OPERATION_BITMASK: u8 = 0x7f;

    pub fn new(operation: ObexOperation, is_final: bool) -> Self {
        let raw = operation as u8 | if is_final { Self::FINAL_BIT } else { 0 };
        Self(raw)
    }

    /// Builds an opcode directly from the wire byte. Any value is accepted - see
    /// [`ObexOpcode::operation`].
    pub fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u8 {
        self.0
    }

    /// Returns the recognized operation for this opcode or None if the operation bits are in a
    /// vendor/user-defined range.
    pub fn operation(&self) -> Option<ObexOperation> {
        ObexOperation::try_from(self.0 & Self::OPERATION_BITMASK).ok()
    }

    /// Returns true if the Final bit is set.
    pub fn is_final(&self) -> bool {
        (self.0 & Self::FINAL_BIT) != 0
    }
}

impl fmt::Debug for ObexOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operation() {
            Some(operation) => write!(f, "{operation:?}(0x{:02x})", self.0),
            None => write!(f, "Unrecognized(0x{:02x})", self.0),
        }
    }
}

impl fmt::Display for ObexOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operation() {
            Some(operation) => write!(f, "opcode 0x{:02x} ({operation:?})", self.0),
            None => write!(f, "opcode 0x{:02x} (unrecognized)", self.0),
        }
    }
}

/// An OBEX packet that can be encoded/decoded to/from a raw byte buffer. This is what is sent
/// over the RFCOMM or L2CAP transport, in both directions.
///
/// Wire layout: `[opcode:1][packet length:2, big-endian][data][headers...]` where the packet
/// length counts the 3-byte prefix and `data` is the operation-specific fixed fields (only the
/// Connect exchange carries any).
#[derive(Clone, Debug, PartialEq)]
pub struct ObexPacket {
    /// The opcode associated with the packet.
    opcode: ObexOpcode,
    /// The data associated with the packet (e.g. Version, Flags, Max Packet Size). This is empty
    /// for every operation except Connect.
    data: Vec<u8>,
    /// The headers describing the packet - there can be 0 or more headers included in the packet.
    headers: HeaderSet,
}

impl ObexPacket {
    /// The minimum packet consists of an opcode (1 byte) and packet length (2 bytes).
    pub(crate) const MIN_PACKET_SIZE: usize = 3;

    pub fn new(opcode: ObexOpcode, data: Vec<u8>, headers: HeaderSet) -> Self {
        Self { opcode, data, headers }
    }

    /// Returns a CONNECT request packet with the provided `headers`.
    pub fn new_connect(max_packet_size: u16, headers: HeaderSet) -> Self {
        // The CONNECT request contains mandatory data - Version Number, Flags, Max Packet Size.
        let mut data = vec![
            OBEX_PROTOCOL_VERSION_NUMBER,
            0, // All flags are currently reserved in a CONNECT request. See OBEX 3.4.1.2.
        ];
        data.extend_from_slice(&max_packet_size.to_be_bytes());
        Self::new(ObexOpcode::new(ObexOperation::Connect, true), data, headers)
    }

    pub fn opcode(&self) -> ObexOpcode {
        self.opcode
    }

    pub(crate) fn set_opcode(&mut self, opcode: ObexOpcode) {
        self.opcode = opcode;
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderSet {
        &mut self.headers
    }

    /// Attempts to decode the raw `buf` into an ObexPacket.
    ///
    /// Because only one operation can be outstanding at a time, a received packet is always
    /// associated with the most recently sent request: `request` determines the expected length
    /// of the operation-specific data preceding the headers. `Decodable` is deliberately not
    /// implemented - the data length is not derivable from the packet alone.
    pub fn decode(buf: &[u8], request: ObexOperation) -> Result<Self, PacketError> {
        if buf.len() < Self::MIN_PACKET_SIZE {
            return Err(PacketError::BufferTooSmall);
        }

        let opcode = ObexOpcode::from_raw(buf[0]);
        let packet_length = u16::from_be_bytes([buf[1], buf[2]]) as usize;

        if packet_length < Self::MIN_PACKET_SIZE {
            return Err(PacketError::DataLength);
        }
        if buf.len() != packet_length {
            return Err(PacketError::BufferTooSmall);
        }

        // Potentially decode the operation-specific data.
        let expected_data_length = request.data_length();
        let (headers_idx, data) = if expected_data_length != 0 {
            let end_idx = Self::MIN_PACKET_SIZE + expected_data_length;
            if buf.len() < end_idx {
                return Err(PacketError::BufferTooSmall);
            }
            (end_idx, buf[Self::MIN_PACKET_SIZE..end_idx].to_vec())
        } else {
            (Self::MIN_PACKET_SIZE, vec![])
        };

        let headers = HeaderSet::decode(&buf[headers_idx..])?;
        Ok(Self::new(opcode, data, headers))
    }
}

impl Encodable for ObexPacket {
    type Error = PacketError;

    fn encoded_len(&self) -> usize {
        Self::MIN_PACKET_SIZE + self.data.len() + self.headers.encoded_len()
    }

    fn encode(&self, buf: &mut [u8]) -> Result<(), Self::Error> {
        if buf.len() < self.encoded_len() {
            return Err(PacketError::BufferTooSmall);
        }

        // Per OBEX 1.5 Section 3.1, the first byte contains the opcode and bytes 1,2 contain
        // the packet length - this includes the opcode / length fields.
        buf[0] = self.opcode.raw();
        let packet_length_bytes = (self.encoded_len() as u16).to_be_bytes();
        buf[1..Self::MIN_PACKET_SIZE].copy_from_slice(&packet_length_bytes[..]);

        // Encode the operation-specific data for relevant operations.
        let headers_idx = if !self.data.is_empty() {
            let end_idx = Self::MIN_PACKET_SIZE + self.data.len();
            buf[Self::MIN_PACKET_SIZE..end_idx].copy_from_slice(&self.data[..]);
            end_idx
        } else {
            Self::MIN_PACKET_SIZE
        };

        // Encode the headers.
        self.headers.encode(&mut buf[headers_idx..])
    }
}

impl From<ObexPacket> for HeaderSet {
    fn from(value: ObexPacket) -> Self {
        value.headers
    }
}

// Copyright 2026 The obex-client Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Client implementation of the OBEX (Object Exchange) protocol.
//!
//! OBEX is a binary, connection-oriented request/response protocol historically
//! used over serial and Bluetooth (RFCOMM/L2CAP) transports. It is strictly
//! half-duplex: the client sends one framed packet and the server replies with
//! exactly one framed packet. Payloads larger than a single packet are split
//! across multiple request/response round trips using the Continue response
//! code, with body fragments carried in `Body` Headers and the last fragment in
//! an `EndOfBody` Header.
//!
//! This crate provides the client side only: packet encoding/decoding
//! ([`ObexPacket`]), the typed Header model ([`Header`], [`HeaderSet`]), the
//! CONNECT handshake and the generic multi-packet request loop
//! ([`ObexClient`]). The underlying transport is any ordered, reliable byte
//! stream implementing `tokio`'s `AsyncRead + AsyncWrite`.
//!
//! ```no_run
//! use obex_client::{Header, HeaderSet, ObexClient, ObexOpcode, ObexOperation, ObexPacket};
//! use obex_client::ObexServiceUuid;
//!
//! # async fn example(stream: tokio::io::DuplexStream) -> Result<(), obex_client::Error> {
//! let mut client = ObexClient::new(stream);
//! client.connect(ObexServiceUuid::MESSAGE_ACCESS).await?;
//!
//! let headers = HeaderSet::from_header(Header::Name("telecom/msg/inbox".into()));
//! let request = ObexPacket::new(ObexOpcode::new(ObexOperation::Get, true), vec![], headers);
//! let response = client.execute(request).await?;
//! # Ok(())
//! # }
//! ```

/// Errors defined in this library.
mod error;
/// Definitions of the OBEX Header types.
mod header;
/// Opcodes and packet encoding/decoding.
mod operation;
/// Packet-level send/receive over a byte stream.
mod transport;
/// The OBEX client and its operations.
mod client;

pub use crate::client::{ObexClient, ObexServiceUuid};
pub use crate::error::{Error, PacketError};
pub use crate::header::{Header, HeaderIdentifier, HeaderSet, ObexString, UserDefinedHeader};
pub use crate::operation::{ObexOpcode, ObexOperation, ObexPacket, MAX_PACKET_SIZE};
pub use crate::transport::{ObexTransport, PacketObserver};

/// A type that can be encoded into its binary wire format.
pub trait Encodable {
    type Error;

    /// Returns the number of bytes `encode` will write.
    fn encoded_len(&self) -> usize;

    /// Writes the binary representation of `self` into `buf`. `buf` must be at
    /// least `encoded_len` bytes long.
    fn encode(&self, buf: &mut [u8]) -> Result<(), Self::Error>;
}

/// A type that can be decoded from its binary wire format.
pub trait Decodable: Sized {
    type Error;

    /// Attempts to parse a value from the beginning of `buf`.
    fn decode(buf: &[u8]) -> Result<Self, Self::Error>;
}

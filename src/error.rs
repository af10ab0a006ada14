// Copyright 2026 The obex-client Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use thiserror::Error;

use crate::operation::{ObexOpcode, ObexOperation};

/// Errors that occur during the use of the OBEX library.
///
/// The variants fall into three groups. Usage errors ([`Error::OperationError`],
/// [`Error::UnsupportedOpcode`], [`Error::NotImplemented`]) are raised before
/// any bytes are exchanged. [`Error::PeerRejected`] means a syntactically valid
/// reply was received but its opcode signals failure for the requested
/// operation. [`Error::Packet`], [`Error::IOError`] and [`Error::Cancelled`]
/// cover transport and framing failures - none of these are retried by this
/// library; a fresh exchange must be started by the caller.
#[derive(Error, Debug)]
pub enum Error {
    #[error("error encoding/decoding packet: {:?}", .0)]
    Packet(#[from] PacketError),

    #[error("{request:?} request rejected by the peer with {response}")]
    PeerRejected { request: ObexOperation, response: ObexOpcode },

    #[error("{0} is not a recognized operation")]
    UnsupportedOpcode(ObexOpcode),

    #[error("invalid {operation:?} operation: {message}")]
    OperationError { operation: ObexOperation, message: String },

    #[error("{0:?} is not implemented")]
    NotImplemented(ObexOperation),

    #[error("operation was cancelled")]
    Cancelled,

    #[error("transport error: {0}")]
    IOError(#[from] std::io::Error),
}

impl Error {
    pub fn operation(operation: ObexOperation, message: impl Into<String>) -> Self {
        Self::OperationError { operation, message: message.into() }
    }

    pub fn peer_rejected(request: ObexOperation, response: ObexOpcode) -> Self {
        Self::PeerRejected { request, response }
    }
}

/// Errors that occur during the encoding & decoding of OBEX packets.
#[derive(Error, Debug)]
pub enum PacketError {
    #[error("buffer is too small")]
    BufferTooSmall,
    #[error("invalid data length")]
    DataLength,
    #[error("invalid data: {}", .0)]
    Data(String),
    #[error("invalid header identifier: {:#04x}", .0)]
    Identifier(u8),
    #[error("field is RFA")]
    Reserved,
    /// An error from another source.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PacketError {
    pub fn external(e: impl Into<anyhow::Error>) -> Self {
        Self::Other(e.into())
    }

    pub fn data(e: impl Into<String>) -> Self {
        Self::Data(e.into())
    }
}

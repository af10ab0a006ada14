// Copyright 2026 The obex-client Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tracing::trace;

use crate::error::{Error, PacketError};
use crate::operation::{ObexOpcode, ObexOperation, ObexPacket};
use crate::Encodable;

/// A hook invoked with the raw bytes of every packet that crosses the transport.
///
/// Useful for wire-level logging and protocol debugging. The default implementations do nothing.
pub trait PacketObserver: Send {
    /// Called after a request packet has been written to the peer.
    fn on_packet_sent(&mut self, _opcode: ObexOpcode, _encoded: &[u8]) {}
    /// Called after a response packet has been read from the peer, before it is decoded.
    fn on_packet_received(&mut self, _opcode: ObexOpcode, _encoded: &[u8]) {}
}

/// Resolves when the cancellation signal fires. Pends forever if there is no signal or the
/// sender has been dropped without cancelling.
async fn cancelled(cancellation: &mut Option<watch::Receiver<bool>>) {
    match cancellation {
        Some(receiver) => {
            if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
                std::future::pending::<()>().await;
            }
        }
        None => std::future::pending::<()>().await,
    }
}

/// Reads a complete packet from the `stream` - the 3-byte prefix first, then the remainder
/// announced by the length field. Returns the raw packet bytes.
async fn read_packet<S: AsyncRead + Unpin>(stream: &mut S) -> Result<Vec<u8>, Error> {
    let mut prefix = [0; ObexPacket::MIN_PACKET_SIZE];
    stream.read_exact(&mut prefix).await?;
    let packet_length = u16::from_be_bytes([prefix[1], prefix[2]]) as usize;
    if packet_length < ObexPacket::MIN_PACKET_SIZE {
        return Err(PacketError::DataLength.into());
    }

    let mut buf = vec![0; packet_length];
    buf[..ObexPacket::MIN_PACKET_SIZE].copy_from_slice(&prefix);
    stream.read_exact(&mut buf[ObexPacket::MIN_PACKET_SIZE..]).await?;
    Ok(buf)
}

/// Manages the reading and writing of OBEX packets over an underlying byte stream - typically
/// RFCOMM or L2CAP.
///
/// Both `send` and `receive_response` may be interrupted by an optional cancellation signal set
/// via [`ObexTransport::set_cancellation`]. A peer disconnection surfaces as [`Error::IOError`].
pub struct ObexTransport<S> {
    stream: S,
    cancellation: Option<watch::Receiver<bool>>,
    observer: Option<Box<dyn PacketObserver>>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> ObexTransport<S> {
    pub fn new(stream: S) -> Self {
        Self { stream, cancellation: None, observer: None }
    }

    /// Registers a watch channel whose value flipping to `true` aborts any in-flight or future
    /// transport operation with [`Error::Cancelled`]. Dropping the sender disarms the signal.
    pub fn set_cancellation(&mut self, receiver: watch::Receiver<bool>) {
        self.cancellation = Some(receiver);
    }

    pub fn set_observer(&mut self, observer: Box<dyn PacketObserver>) {
        self.observer = Some(observer);
    }

    /// Encodes and sends the `packet` to the remote peer.
    pub async fn send(&mut self, packet: &ObexPacket) -> Result<(), Error> {
        let mut buf = vec![0; packet.encoded_len()];
        packet.encode(&mut buf[..])?;
        trace!(opcode = ?packet.opcode(), len = buf.len(), "sending packet");

        let Self { stream, cancellation, observer } = self;
        tokio::select! {
            result = async {
                stream.write_all(&buf[..]).await?;
                stream.flush().await
            } => result?,
            _ = cancelled(cancellation) => return Err(Error::Cancelled),
        }

        if let Some(observer) = observer {
            observer.on_packet_sent(packet.opcode(), &buf[..]);
        }
        Ok(())
    }

    /// Reads and decodes the next packet from the remote peer. `request` is the operation of the
    /// most recently sent request - it determines the layout of the reply.
    pub async fn receive_response(&mut self, request: ObexOperation) -> Result<ObexPacket, Error> {
        let Self { stream, cancellation, observer } = self;
        let buf = tokio::select! {
            result = read_packet(stream) => result?,
            _ = cancelled(cancellation) => return Err(Error::Cancelled),
        };

        let packet = ObexPacket::decode(&buf[..], request)?;
        trace!(opcode = ?packet.opcode(), len = buf.len(), "received packet");
        if let Some(observer) = observer {
            observer.on_packet_received(packet.opcode(), &buf[..]);
        }
        Ok(packet)
    }
}

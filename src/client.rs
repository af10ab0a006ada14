// Copyright 2026 The obex-client Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;
use tracing::debug;

use crate::error::Error;
use crate::header::{Header, HeaderIdentifier, HeaderSet};
use crate::operation::{ObexOpcode, ObexOperation, ObexPacket, MAX_PACKET_SIZE};
use crate::transport::{ObexTransport, PacketObserver};

/// The 16-byte UUID identifying the OBEX service a CONNECT request targets, carried in the
/// Target header. Defined per service profile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObexServiceUuid([u8; 16]);

impl ObexServiceUuid {
    /// Message Access Service target. Defined in MAP v1.4.2 Section 6.3.
    pub const MESSAGE_ACCESS: ObexServiceUuid = ObexServiceUuid([
        0xbb, 0x58, 0x2b, 0x40, 0x42, 0x0c, 0x11, 0xdb, 0xb0, 0xde, 0x08, 0x00, 0x20, 0x0c, 0x9a,
        0x66,
    ]);

    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

/// Invoked with the peer's full CONNECT response once a session is established.
type ConnectedHook = Box<dyn FnMut(&ObexPacket) + Send>;

/// An OBEX client session over a byte stream `S` - typically an RFCOMM or L2CAP channel.
///
/// The protocol is half-duplex: a session runs at most one request at a time, which the
/// `&mut self` receivers enforce at compile time. A client must [`ObexClient::connect`] before
/// issuing requests with [`ObexClient::execute`].
pub struct ObexClient<S> {
    transport: ObexTransport<S>,
    connected: bool,
    on_connected: Option<ConnectedHook>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> ObexClient<S> {
    pub fn new(stream: S) -> Self {
        Self { transport: ObexTransport::new(stream), connected: false, on_connected: None }
    }

    /// Returns true if the session has completed a successful CONNECT exchange.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// See [`ObexTransport::set_cancellation`].
    pub fn set_cancellation(&mut self, receiver: watch::Receiver<bool>) {
        self.transport.set_cancellation(receiver);
    }

    /// See [`ObexTransport::set_observer`].
    pub fn set_observer(&mut self, observer: Box<dyn PacketObserver>) {
        self.transport.set_observer(observer);
    }

    /// Registers a hook invoked with the peer's response packet after a successful connect.
    pub fn set_on_connected(&mut self, hook: impl FnMut(&ObexPacket) + Send + 'static) {
        self.on_connected = Some(Box::new(hook));
    }

    /// Initiates a session with the OBEX service identified by `target`.
    ///
    /// A session supports at most one CONNECT exchange - calling this on an already-connected
    /// client is an error and sends nothing. A rejecting reply surfaces as
    /// [`Error::PeerRejected`] and leaves the session disconnected.
    pub async fn connect(&mut self, target: ObexServiceUuid) -> Result<(), Error> {
        if self.connected {
            return Err(Error::operation(ObexOperation::Connect, "already connected"));
        }

        let headers = HeaderSet::from_header(Header::Target(target.as_bytes().to_vec()));
        let request = ObexPacket::new_connect(MAX_PACKET_SIZE as u16, headers);
        self.transport.send(&request).await?;
        let response = self.transport.receive_response(ObexOperation::Connect).await?;

        if response.opcode().operation() != Some(ObexOperation::Success) {
            return Err(Error::peer_rejected(ObexOperation::Connect, response.opcode()));
        }

        self.connected = true;
        debug!(service = ?target, "connected to OBEX service");
        if let Some(hook) = &mut self.on_connected {
            hook(&response);
        }
        Ok(())
    }

    /// Runs a complete request/response exchange for `request` and returns the peer's merged
    /// response.
    ///
    /// The peer may span its response over multiple packets by replying Continue. Each Continue
    /// is acknowledged by re-sending the request operation with the final bit set and no
    /// headers; the Body fragments of all replies are concatenated in arrival order into a
    /// single Body header on the returned packet, with the terminal EndOfBody folded in as
    /// well. The returned packet carries the opcode of the terminal reply. Any reply other than
    /// Continue or Success aborts the exchange with [`Error::PeerRejected`].
    pub async fn execute(&mut self, request: ObexPacket) -> Result<ObexPacket, Error> {
        let Some(operation) = request.opcode().operation() else {
            return Err(Error::UnsupportedOpcode(request.opcode()));
        };
        if !self.connected {
            return Err(Error::operation(operation, "not connected"));
        }

        let mut next = request;
        let mut accumulator: Option<ObexPacket> = None;
        loop {
            self.transport.send(&next).await?;
            let mut reply = self.transport.receive_response(operation).await?;
            let opcode = reply.opcode();

            let is_terminal = match opcode.operation() {
                Some(ObexOperation::Success) => true,
                Some(ObexOperation::Continue) => false,
                _ => return Err(Error::peer_rejected(operation, opcode)),
            };

            // The terminal reply's EndOfBody is consumed here - the merged response only ever
            // carries Body. A Continue reply's headers are left untouched apart from its Body
            // fragment.
            let end_of_body = if is_terminal {
                match reply.headers_mut().remove(&HeaderIdentifier::EndOfBody) {
                    Some(Header::EndOfBody(bytes)) => Some(bytes),
                    _ => None,
                }
            } else {
                None
            };

            let mut response = match accumulator.take() {
                // The first reply seeds the merged response.
                None => reply,
                Some(mut merged) => {
                    // Only Continue replies contribute Body fragments; a terminal reply
                    // contributes its EndOfBody alone.
                    if !is_terminal {
                        if let Some(Header::Body(bytes)) =
                            reply.headers_mut().remove(&HeaderIdentifier::Body)
                        {
                            merged.headers_mut().append_body(bytes);
                        }
                    }
                    merged
                }
            };

            if is_terminal {
                if let Some(bytes) = end_of_body {
                    response.headers_mut().append_body(bytes);
                }
                response.set_opcode(opcode);
                debug!(operation = ?operation, "exchange complete");
                return Ok(response);
            }

            // Acknowledge the Continue and keep reading.
            accumulator = Some(response);
            next = ObexPacket::new(ObexOpcode::new(operation, true), vec![], HeaderSet::new());
        }
    }

    /// Tears down the session.
    pub async fn disconnect(&mut self) -> Result<(), Error> {
        if !self.connected {
            return Err(Error::operation(ObexOperation::Disconnect, "not connected"));
        }
        // TODO: send the DISCONNECT request and validate the reply once a peer that honors
        // teardown is available for testing.
        Err(Error::NotImplemented(ObexOperation::Disconnect))
    }
}

// Copyright 2026 The obex-client Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::fmt;

use crate::error::PacketError;

/// Represents the String type that is sent/received in an OBEX packet.
/// Encoded as null-terminated UTF-16 text in big-endian byte order.
/// Defined in OBEX 1.5. Section 2.1.
#[derive(Clone, Debug, PartialEq)]
pub struct ObexString(pub String);

impl ObexString {
    pub fn len(&self) -> usize {
        self.to_be_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_be_bytes(&self) -> Vec<u8> {
        let mut encoded_buf: Vec<u16> = self.0.encode_utf16().collect();
        encoded_buf.push(0); // Add the null terminator
        encoded_buf.into_iter().flat_map(u16::to_be_bytes).collect()
    }
}

impl From<String> for ObexString {
    fn from(src: String) -> ObexString {
        ObexString(src)
    }
}

impl From<&str> for ObexString {
    fn from(src: &str) -> ObexString {
        ObexString(src.to_string())
    }
}

impl From<ObexString> for String {
    fn from(src: ObexString) -> String {
        src.0
    }
}

impl TryFrom<&[u8]> for ObexString {
    type Error = PacketError;

    fn try_from(src: &[u8]) -> Result<Self, Self::Error> {
        if src.is_empty() {
            return Ok(Self(String::new()));
        }

        let unicode_array =
            src.chunks_exact(2).map(|a| u16::from_be_bytes([a[0], a[1]])).collect::<Vec<u16>>();
        let mut text = String::from_utf16(&unicode_array).map_err(PacketError::external)?;
        // OBEX Strings are represented as null terminated Unicode text. See OBEX 1.5 Section 2.1.
        if !text.ends_with('\0') {
            return Err(PacketError::data("text missing null terminator"));
        }

        let _ = text.pop();
        Ok(Self(text))
    }
}

impl fmt::Display for ObexString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

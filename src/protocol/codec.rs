// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line framing for the integration protocol.
//!
//! The controller terminates every report with CRLF, but its prompts
//! (`login: `, `password: `, `GNET> `) arrive without a terminator and wait
//! for input. [`LineDecoder`] therefore yields two kinds of frames: complete
//! CRLF-terminated lines, and a trailing unterminated fragment when it ends
//! like a prompt.

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;

use crate::error::ProtocolError;

/// Upper bound for a buffered unterminated line.
const MAX_LINE_LENGTH: usize = 4096;

/// Suffixes that mark an unterminated fragment as a prompt.
const PROMPT_ENDINGS: [&str; 2] = [": ", "> "];

/// Splits the controller byte stream into lines and prompts.
///
/// # Examples
///
/// ```
/// use bytes::BytesMut;
/// use tokio_util::codec::Decoder;
/// use radiora_lib::protocol::LineDecoder;
///
/// let mut decoder = LineDecoder::new();
/// let mut buf = BytesMut::from("~OUTPUT,5,1,42.00\r\nGNET> ");
///
/// assert_eq!(decoder.decode(&mut buf).unwrap().as_deref(), Some("~OUTPUT,5,1,42.00"));
/// assert_eq!(decoder.decode(&mut buf).unwrap().as_deref(), Some("GNET> "));
/// assert_eq!(decoder.decode(&mut buf).unwrap(), None);
/// ```
#[derive(Debug, Default, Clone)]
pub struct LineDecoder {
    _private: (),
}

impl LineDecoder {
    /// Creates a new decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for LineDecoder {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if let Some(pos) = src.windows(2).position(|w| w == b"\r\n") {
                let line = src.split_to(pos);
                src.advance(2);
                if line.is_empty() {
                    continue;
                }
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }

            if src.is_empty() {
                return Ok(None);
            }

            let is_prompt = PROMPT_ENDINGS.iter().any(|end| src.ends_with(end.as_bytes()));
            if is_prompt {
                let prompt = src.split();
                return Ok(Some(String::from_utf8_lossy(&prompt).into_owned()));
            }

            if src.len() > MAX_LINE_LENGTH {
                tracing::warn!(len = src.len(), "Discarding overlong unterminated line");
                src.clear();
            }
            return Ok(None);
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(buf)? {
            return Ok(Some(frame));
        }
        if buf.is_empty() {
            return Ok(None);
        }
        let rest = buf.split();
        Ok(Some(String::from_utf8_lossy(&rest).into_owned()))
    }
}

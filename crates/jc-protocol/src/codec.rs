//! Tokio codec for the telnet byte stream
//!
//! Inbound bytes are split into plain console text and the option
//! negotiation sequences mixed into it. Outbound, the client only ever
//! writes command lines and negotiation replies.

use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ProtocolError;
use crate::telnet::{TelnetCommand, IAC, SB, SE};

/// Maximum size of a subnegotiation block before the stream is considered broken
pub const MAX_SUBNEGOTIATION_SIZE: usize = 4096;

/// A decoded unit of the inbound stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelnetEvent {
    /// Console text with telnet escapes removed
    Data(Bytes),
    /// Option negotiation (`IAC WILL/WONT/DO/DONT <option>`)
    Negotiate { command: TelnetCommand, option: u8 },
    /// Subnegotiation payload (`IAC SB <option> ... IAC SE`)
    Subnegotiation { option: u8, data: Bytes },
}

/// Something the client writes to the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelnetOutput {
    /// One command line, terminated with CR LF on the wire
    Line(String),
    /// Negotiation reply
    Negotiate { command: TelnetCommand, option: u8 },
}

impl TelnetOutput {
    /// Convenience constructor for a command line
    pub fn line(text: impl Into<String>) -> Self {
        Self::Line(text.into())
    }
}

/// Codec for encoding/decoding the telnet stream
#[derive(Debug, Default)]
pub struct TelnetCodec;

impl TelnetCodec {
    /// Create a new codec
    pub fn new() -> Self {
        Self
    }

    /// Decode a command sequence at the start of `src` (which begins with IAC).
    ///
    /// Returns `Ok(None)` when more bytes are needed and `Ok(Some(None))`
    /// when a sequence was consumed that produces no event.
    fn decode_command(
        &mut self,
        src: &mut BytesMut,
    ) -> Result<Option<Option<TelnetEvent>>, ProtocolError> {
        if src.len() < 2 {
            return Ok(None);
        }

        let verb = src[1];
        if let Some(command) = TelnetCommand::from_u8(verb) {
            if src.len() < 3 {
                return Ok(None);
            }
            let option = src[2];
            let _ = src.split_to(3);
            return Ok(Some(Some(TelnetEvent::Negotiate { command, option })));
        }

        if verb == SB {
            return self.decode_subnegotiation(src).map(|r| r.map(Some));
        }

        // NOP, GA and the other two-byte commands carry nothing for us
        let _ = src.split_to(2);
        Ok(Some(None))
    }

    fn decode_subnegotiation(
        &mut self,
        src: &mut BytesMut,
    ) -> Result<Option<TelnetEvent>, ProtocolError> {
        // IAC SB <option> <data...> IAC SE
        let mut i = 3;
        let mut data = BytesMut::new();
        while i + 1 < src.len() {
            if src[i] == IAC {
                match src[i + 1] {
                    SE => {
                        let option = src[2];
                        let _ = src.split_to(i + 2);
                        return Ok(Some(TelnetEvent::Subnegotiation {
                            option,
                            data: data.freeze(),
                        }));
                    }
                    IAC => {
                        data.put_u8(IAC);
                        i += 2;
                        continue;
                    }
                    _ => {}
                }
            }
            data.put_u8(src[i]);
            i += 1;
        }

        if src.len() > MAX_SUBNEGOTIATION_SIZE {
            return Err(ProtocolError::SubnegotiationTooLarge {
                size: src.len(),
                max: MAX_SUBNEGOTIATION_SIZE,
            });
        }
        Ok(None)
    }
}

impl Decoder for TelnetCodec {
    type Item = TelnetEvent;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if src.is_empty() {
                return Ok(None);
            }

            // Command sequence at the front
            if src[0] == IAC && src.len() >= 2 && src[1] != IAC {
                match self.decode_command(src)? {
                    Some(Some(event)) => return Ok(Some(event)),
                    Some(None) => continue,
                    None => return Ok(None),
                }
            }

            // Plain text up to the next command sequence
            let mut text = BytesMut::with_capacity(src.len());
            let mut consumed = 0;
            while consumed < src.len() {
                let byte = src[consumed];
                if byte == IAC {
                    match src.get(consumed + 1) {
                        Some(&IAC) => {
                            text.put_u8(IAC);
                            consumed += 2;
                            continue;
                        }
                        // Command (or incomplete escape): stop before it
                        _ => break,
                    }
                }
                if byte != 0 {
                    text.put_u8(byte);
                }
                consumed += 1;
            }

            if consumed == 0 {
                // Lone IAC at the end of the buffer
                return Ok(None);
            }
            let _ = src.split_to(consumed);

            if !text.is_empty() {
                return Ok(Some(TelnetEvent::Data(text.freeze())));
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(event) => Ok(Some(event)),
            None => {
                if !src.is_empty() {
                    tracing::trace!("Discarding {} trailing bytes at EOF", src.len());
                    src.clear();
                }
                Ok(None)
            }
        }
    }
}

impl Encoder<TelnetOutput> for TelnetCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: TelnetOutput, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            TelnetOutput::Line(text) => {
                dst.reserve(text.len() + 2);
                for byte in text.bytes() {
                    if byte == IAC {
                        dst.put_u8(IAC);
                    }
                    dst.put_u8(byte);
                }
                dst.extend_from_slice(b"\r\n");
            }
            TelnetOutput::Negotiate { command, option } => {
                dst.extend_from_slice(&[IAC, command.as_u8(), option]);
            }
        }
        Ok(())
    }
}

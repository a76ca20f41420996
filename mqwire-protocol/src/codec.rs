//! Streaming decoder and encoder for MQTT packets.

use crate::error::{DecodeError, EncodeError};
use crate::frame::FixedHeader;
use crate::message::{Message, Packet};
use crate::parse::parse_packet;
use crate::sink::{CorkGuard, PacketSink};
use crate::varint;
use crate::write::write_packet;
use bytes::{Buf, BytesMut};
use serde::{Deserialize, Serialize};
use std::io;
use tracing::{debug, trace};

/// Options that shape how packets are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeOptions {
    /// Version used for every packet except CONNECT, which carries its own.
    pub protocol_version: u8,
}

impl EncodeOptions {
    pub fn new(protocol_version: u8) -> Self {
        Self { protocol_version }
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self { protocol_version: 4 }
    }
}

/// Encodes packets into frames.
pub struct Encoder;

impl Encoder {
    /// Encodes a packet with default options (protocol version 4).
    pub fn encode(packet: &Packet) -> Result<BytesMut, EncodeError> {
        Self::encode_with(packet, &EncodeOptions::default())
    }

    pub fn encode_with(packet: &Packet, opts: &EncodeOptions) -> Result<BytesMut, EncodeError> {
        Self::frame(packet, opts).map(|(buf, _)| buf)
    }

    /// Encodes a packet and returns it with the length of its fixed header.
    fn frame(packet: &Packet, opts: &EncodeOptions) -> Result<(BytesMut, usize), EncodeError> {
        let mut buf = BytesMut::new();
        let header_len = write_packet(packet, opts, &mut buf)?;
        trace!(cmd = %packet.command(), bytes = buf.len(), "encoded packet");
        Ok((buf, header_len))
    }

    /// Writes a packet to `sink`, corked for the duration of the call.
    ///
    /// Returns the sink's answer to the last write. The packet is validated
    /// in full before the sink sees any byte.
    pub fn encode_to<S: PacketSink + ?Sized>(
        packet: &Packet,
        sink: &mut S,
        opts: &EncodeOptions,
    ) -> Result<bool, EncodeError> {
        let (frame, header_len) = Self::frame(packet, opts)?;

        let mut sink = CorkGuard::new(sink);
        let accepted = sink.write(&frame[..header_len]);
        if header_len == frame.len() {
            return Ok(accepted);
        }
        Ok(sink.write(&frame[header_len..]))
    }

    /// Writes a packet to an [`io::Write`].
    pub fn write_to<W: io::Write>(
        packet: &Packet,
        writer: &mut W,
        opts: &EncodeOptions,
    ) -> Result<(), EncodeError> {
        let frame = Self::encode_with(packet, opts)?;
        writer.write_all(&frame)?;
        Ok(())
    }
}

/// Protocol settings negotiated on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub protocol_version: u8,
    pub bridge_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            protocol_version: 4,
            bridge_mode: false,
        }
    }
}

/// Result of one [`Decoder::feed`] call.
#[derive(Debug, Default)]
pub struct Feed {
    /// Packets completed by this call, in wire order.
    pub messages: Vec<Message>,
    /// Set when a malformed packet stopped decoding.
    pub error: Option<DecodeError>,
    /// Bytes still buffered after the call.
    pub remaining: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Header,
    Length,
    Payload,
    Emit,
}

/// Resumable packet decoder.
///
/// Bytes may arrive in chunks of any size. A malformed packet produces one
/// error; after that nothing is decoded until the next `extend`/`feed`,
/// which discards everything buffered and starts over.
pub struct Decoder {
    buffer: BytesMut,
    state: State,
    header: Option<FixedHeader>,
    length: u32,
    packet: Option<Packet>,
    failed: bool,
    settings: Settings,
}

impl Decoder {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Decoder seeded with the settings of an already negotiated connection.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
            state: State::Header,
            header: None,
            length: 0,
            packet: None,
            failed: false,
            settings,
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Appends data to the internal buffer.
    pub fn extend(&mut self, data: &[u8]) {
        if self.failed {
            self.reset();
        }
        self.buffer.extend_from_slice(data);
    }

    /// Appends data and decodes every complete packet.
    pub fn feed(&mut self, data: &[u8]) -> Feed {
        self.extend(data);

        let mut feed = Feed::default();
        loop {
            match self.decode_packet() {
                Ok(Some(message)) => feed.messages.push(message),
                Ok(None) => break,
                Err(e) => {
                    feed.error = Some(e);
                    break;
                }
            }
        }
        feed.remaining = self.buffered();
        feed
    }

    /// Attempts to decode the next packet from the buffer.
    ///
    /// `Ok(None)` means more bytes are needed (or a previous error has not
    /// been cleared by new input yet).
    pub fn decode_packet(&mut self) -> Result<Option<Message>, DecodeError> {
        if self.failed {
            return Ok(None);
        }

        loop {
            match self.state {
                State::Header => {
                    if self.buffer.is_empty() {
                        return Ok(None);
                    }
                    let header = FixedHeader::from_byte(self.buffer[0]).map_err(|e| self.fail(e))?;
                    self.buffer.advance(1);
                    trace!(cmd = %header.command, "parsed header");
                    self.header = Some(header);
                    self.state = State::Length;
                }
                State::Length => {
                    let decoded = varint::decode(&self.buffer).map_err(|e| self.fail(e))?;
                    let Some((length, consumed)) = decoded else {
                        return Ok(None);
                    };
                    self.buffer.advance(consumed);
                    trace!(length, "parsed remaining length");
                    self.length = length;
                    self.state = State::Payload;
                }
                State::Payload => {
                    let length = self.length as usize;
                    if self.buffer.len() < length {
                        return Ok(None);
                    }
                    let Some(header) = self.header else {
                        self.state = State::Header;
                        continue;
                    };
                    let body = self.buffer.split_to(length).freeze();
                    let packet =
                        parse_packet(&header, body, &self.settings).map_err(|e| self.fail(e))?;
                    trace!(cmd = %header.command, "parsed payload");
                    self.packet = Some(packet);
                    self.state = State::Emit;
                }
                State::Emit => {
                    self.state = State::Header;
                    let (Some(header), Some(packet)) = (self.header.take(), self.packet.take())
                    else {
                        continue;
                    };
                    self.on_packet(&packet);
                    debug!(cmd = %header.command, length = self.length, "decoded packet");
                    return Ok(Some(Message {
                        header,
                        length: self.length,
                        packet,
                    }));
                }
            }
        }
    }

    /// Returns the number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Clears the internal buffer and any partial packet.
    pub fn clear(&mut self) {
        self.reset();
    }

    /// Applies the version and bridge mode announced by a CONNECT to every
    /// later packet on the connection.
    fn on_packet(&mut self, packet: &Packet) {
        if let Packet::Connect(connect) = packet {
            self.settings = Settings {
                protocol_version: connect.protocol_version,
                bridge_mode: connect.bridge_mode,
            };
            debug!(
                protocol_version = connect.protocol_version,
                bridge_mode = connect.bridge_mode,
                "negotiated settings"
            );
        }
    }

    fn fail(&mut self, err: DecodeError) -> DecodeError {
        debug!(error = %err, kind = %err.kind(), "decode failed");
        self.failed = true;
        err
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.state = State::Header;
        self.header = None;
        self.length = 0;
        self.packet = None;
        self.failed = false;
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

// BtMessage: a queued wire message. A closed tagged enum rather than a
// trait object, since the set of wire message kinds is closed by the
// BitTorrent protocol. Encoding is one-shot, no decode path.

mod codec;
mod factory;

pub use factory::{DefaultMessageFactory, MessageFactory};

use std::io::{self, Write};

use bytes::BytesMut;

use crate::events::BtEvent;

#[derive(Debug)]
pub struct MessageState {
    encoded: BytesMut,
    written: usize,
    sending_in_progress: bool,
    on_queued_called: bool,
    dropped: bool,
}

impl MessageState {
    fn new(encoded: BytesMut) -> Self {
        Self {
            encoded,
            written: 0,
            sending_in_progress: false,
            on_queued_called: false,
            dropped: false,
        }
    }

    /// Writes as much of the remaining encoded buffer as `sink` accepts.
    /// Leaves `sending_in_progress` true on a short write so the next
    /// `send` resumes from where this one left off.
    fn send(&mut self, sink: &mut dyn Write) -> io::Result<()> {
        if self.dropped {
            self.sending_in_progress = false;
            return Ok(());
        }
        while self.written < self.encoded.len() {
            match sink.write(&self.encoded[self.written..]) {
                Ok(0) => {
                    self.sending_in_progress = true;
                    return Ok(());
                }
                Ok(n) => self.written += n,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    self.sending_in_progress = true;
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
        self.sending_in_progress = false;
        Ok(())
    }
}

#[derive(Debug)]
pub struct HaveMessage {
    pub idx: u32,
    state: MessageState,
}

#[derive(Debug)]
pub struct BitfieldMessage {
    pub bits: Vec<u8>,
    state: MessageState,
}

#[derive(Debug)]
pub struct RequestMessage {
    pub index: u32,
    pub begin: u32,
    pub length: u32,
    state: MessageState,
}

#[derive(Debug)]
pub struct PieceMessage {
    pub index: u32,
    pub begin: u32,
    pub data: Vec<u8>,
    state: MessageState,
}

#[derive(Debug)]
pub struct CancelMessage {
    pub index: u32,
    pub begin: u32,
    pub length: u32,
    state: MessageState,
}

#[derive(Debug)]
pub struct PortMessage {
    pub port: u32,
    state: MessageState,
}

#[derive(Debug)]
pub enum BtMessage {
    KeepAlive(MessageState),
    Choke(MessageState),
    Unchoke(MessageState),
    Interested(MessageState),
    NotInterested(MessageState),
    Have(HaveMessage),
    Bitfield(BitfieldMessage),
    Request(RequestMessage),
    Piece(PieceMessage),
    Cancel(CancelMessage),
    Port(PortMessage),
}

impl BtMessage {
    pub fn keep_alive() -> Self {
        Self::KeepAlive(MessageState::new(codec::encode_keep_alive()))
    }

    pub fn choke() -> Self {
        Self::Choke(MessageState::new(codec::encode_choke()))
    }

    pub fn unchoke() -> Self {
        Self::Unchoke(MessageState::new(codec::encode_unchoke()))
    }

    pub fn interested() -> Self {
        Self::Interested(MessageState::new(codec::encode_interested()))
    }

    pub fn not_interested() -> Self {
        Self::NotInterested(MessageState::new(codec::encode_not_interested()))
    }

    pub fn have(idx: u32) -> Self {
        Self::Have(HaveMessage {
            idx,
            state: MessageState::new(codec::encode_have(idx)),
        })
    }

    pub fn bitfield(bits: Vec<u8>) -> Self {
        let encoded = codec::encode_bitfield(&bits);
        Self::Bitfield(BitfieldMessage {
            bits,
            state: MessageState::new(encoded),
        })
    }

    pub fn request(index: u32, begin: u32, length: u32) -> Self {
        Self::Request(RequestMessage {
            index,
            begin,
            length,
            state: MessageState::new(codec::encode_request(index, begin, length)),
        })
    }

    pub fn piece(index: u32, begin: u32, data: Vec<u8>) -> Self {
        let encoded = codec::encode_piece(index, begin, &data);
        Self::Piece(PieceMessage {
            index,
            begin,
            data,
            state: MessageState::new(encoded),
        })
    }

    pub fn cancel(index: u32, begin: u32, length: u32) -> Self {
        Self::Cancel(CancelMessage {
            index,
            begin,
            length,
            state: MessageState::new(codec::encode_cancel(index, begin, length)),
        })
    }

    pub fn port(port: u32) -> Self {
        Self::Port(PortMessage {
            port,
            state: MessageState::new(codec::encode_port(port)),
        })
    }

    fn state(&self) -> &MessageState {
        match self {
            Self::KeepAlive(s)
            | Self::Choke(s)
            | Self::Unchoke(s)
            | Self::Interested(s)
            | Self::NotInterested(s) => s,
            Self::Have(m) => &m.state,
            Self::Bitfield(m) => &m.state,
            Self::Request(m) => &m.state,
            Self::Piece(m) => &m.state,
            Self::Cancel(m) => &m.state,
            Self::Port(m) => &m.state,
        }
    }

    fn state_mut(&mut self) -> &mut MessageState {
        match self {
            Self::KeepAlive(s)
            | Self::Choke(s)
            | Self::Unchoke(s)
            | Self::Interested(s)
            | Self::NotInterested(s) => s,
            Self::Have(m) => &mut m.state,
            Self::Bitfield(m) => &mut m.state,
            Self::Request(m) => &mut m.state,
            Self::Piece(m) => &mut m.state,
            Self::Cancel(m) => &mut m.state,
            Self::Port(m) => &mut m.state,
        }
    }

    pub fn sending_in_progress(&self) -> bool {
        self.state().sending_in_progress
    }

    // Only PIECE payloads are rate-gated.
    pub fn uploading(&self) -> bool {
        matches!(self, Self::Piece(_))
    }

    pub fn on_queued(&mut self) {
        let state = self.state_mut();
        debug_assert!(
            !state.on_queued_called,
            "on_queued must be invoked exactly once per message"
        );
        state.on_queued_called = true;
    }

    pub fn on_queued_called(&self) -> bool {
        self.state().on_queued_called
    }

    pub fn send(&mut self, sink: &mut dyn Write) -> io::Result<()> {
        self.state_mut().send(sink)
    }

    // A PIECE message whose triple matches a cancel event marks itself
    // to drop its payload on its own next send; nothing removes it here.
    pub fn handle_event(&mut self, event: &BtEvent) {
        if let Self::Piece(m) = self {
            let BtEvent::CancelSendingPiece {
                index,
                begin,
                length,
            } = event;
            if m.index == *index && m.begin == *begin && m.data.len() as u32 == *length {
                m.state.dropped = true;
            }
        }
    }

    pub fn piece_meta(&self) -> Option<(u32, u32, u32)> {
        match self {
            Self::Request(m) => Some((m.index, m.begin, m.length)),
            Self::Piece(m) => Some((m.index, m.begin, m.data.len() as u32)),
            Self::Cancel(m) => Some((m.index, m.begin, m.length)),
            _ => None,
        }
    }
}

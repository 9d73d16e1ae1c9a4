//! Intra-peer events broadcast to every queued message. Presently the
//! only event kind the dispatcher raises is the cancel-sending-piece
//! notification, but this is an enum rather than a single struct so the
//! set can grow without changing `BtMessage::handle_event`'s signature.
#[derive(Debug, Clone, Copy)]
pub enum BtEvent {
    /// A piece the dispatcher was sending (or had queued to send) has
    /// been cancelled locally or taken over by another request.
    CancelSendingPiece {
        index: u32,
        begin: u32,
        length: u32,
    },
}

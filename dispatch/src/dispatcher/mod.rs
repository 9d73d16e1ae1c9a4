// Collaborators are wired in after construction via setters and are
// looked up lazily, so a missing one fails fast at first use rather
// than at construction.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::config::DispatcherConfig;
use crate::error::{DispatchError, Result};
use crate::events::BtEvent;
use crate::info::BtContext;
use crate::message::{BtMessage, MessageFactory};
use crate::peer::Peer;
use crate::peer_storage::PeerStorage;
use crate::piece_storage::PieceStorage;
use crate::queue::{DrainAction, MessageQueue};
use crate::rate_gate;
use crate::request_slot::RequestSlot;
use crate::Cuid;

#[derive(Default)]
pub struct Dispatcher {
    cuid: Option<Cuid>,
    config: DispatcherConfig,
    queue: MessageQueue,
    slots: Vec<RequestSlot>,

    piece_storage: Option<Arc<dyn PieceStorage>>,
    peer_storage: Option<Arc<dyn PeerStorage>>,
    peer: Option<Arc<Mutex<Peer>>>,
    message_factory: Option<Arc<dyn MessageFactory>>,
    context: Option<BtContext>,
    clock: Option<Arc<dyn Clock>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_cuid(&mut self, cuid: Cuid) -> &mut Self {
        self.cuid = Some(cuid);
        self
    }

    pub fn set_max_upload_speed_limit(&mut self, limit: u64) -> &mut Self {
        self.config.max_upload_speed_limit = limit;
        self
    }

    pub fn set_request_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn set_piece_storage(&mut self, storage: Arc<dyn PieceStorage>) -> &mut Self {
        self.piece_storage = Some(storage);
        self
    }

    pub fn set_peer_storage(&mut self, storage: Arc<dyn PeerStorage>) -> &mut Self {
        self.peer_storage = Some(storage);
        self
    }

    pub fn set_peer(&mut self, peer: Arc<Mutex<Peer>>) -> &mut Self {
        self.peer = Some(peer);
        self
    }

    pub fn set_message_factory(&mut self, factory: Arc<dyn MessageFactory>) -> &mut Self {
        self.message_factory = Some(factory);
        self
    }

    pub fn set_context(&mut self, context: BtContext) -> &mut Self {
        self.context = Some(context);
        self
    }

    pub fn set_clock(&mut self, clock: Arc<dyn Clock>) -> &mut Self {
        self.clock = Some(clock);
        self
    }

    fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone().unwrap_or_else(|| Arc::new(SystemClock))
    }

    fn piece_storage(&self) -> Result<&Arc<dyn PieceStorage>> {
        self.piece_storage
            .as_ref()
            .ok_or(DispatchError::MissingCollaborator("piece storage"))
    }

    fn peer_storage(&self) -> Result<&Arc<dyn PeerStorage>> {
        self.peer_storage
            .as_ref()
            .ok_or(DispatchError::MissingCollaborator("peer storage"))
    }

    fn peer(&self) -> Result<&Arc<Mutex<Peer>>> {
        self.peer
            .as_ref()
            .ok_or(DispatchError::MissingCollaborator("peer"))
    }

    fn message_factory(&self) -> Result<&Arc<dyn MessageFactory>> {
        self.message_factory
            .as_ref()
            .ok_or(DispatchError::MissingCollaborator("message factory"))
    }

    pub fn enqueue(&mut self, message: BtMessage) {
        self.queue.enqueue(message);
    }

    // Samples the peer's upload speed once, before the sweep begins.
    pub fn send_messages(&mut self, sink: &mut dyn Write) -> Result<()> {
        let upload_speed = self.peer_storage()?.transfer_stat().upload_speed;
        let budget_exceeded =
            rate_gate::budget_exceeded(self.config.max_upload_speed_limit, upload_speed);

        self.queue
            .drain_while(|message| -> std::result::Result<DrainAction, std::io::Error> {
                if message.sending_in_progress() {
                    message.send(sink)?;
                    return Ok(DrainAction::RetainAndStop);
                }
                if message.uploading() && budget_exceeded {
                    return Ok(DrainAction::Retain);
                }
                message.send(sink)?;
                if message.sending_in_progress() {
                    Ok(DrainAction::RetainAndStop)
                } else {
                    Ok(DrainAction::Remove)
                }
            })
            .map_err(|e| {
                tracing::warn!(cuid = ?self.cuid, error = %e, "send to peer failed");
                DispatchError::SendFailed(e)
            })
    }

    pub fn do_cancel_sending_piece_action(&mut self, index: u32, begin: u32, length: u32) {
        self.queue.broadcast(&BtEvent::CancelSendingPiece {
            index,
            begin,
            length,
        });
    }

    pub fn add_outstanding_request(&mut self, slot: RequestSlot) {
        self.slots.push(slot);
    }

    pub fn remove_outstanding_request(&mut self, slot: &RequestSlot) {
        if let Some(pos) = self.slots.iter().position(|s| s.key() == slot.key()) {
            self.slots.remove(pos);
        }
    }

    // Length-insensitive, since standard BT block length is fixed.
    pub fn is_outstanding_request(&self, index: u32, begin: u32) -> bool {
        self.slots
            .iter()
            .any(|s| s.piece_index == index && s.begin == begin)
    }

    pub fn get_outstanding_request(&self, index: u32, begin: u32, length: u32) -> Option<RequestSlot> {
        self.slots
            .iter()
            .find(|s| s.key() == (index, begin, length))
            .cloned()
    }

    pub fn count_outstanding_request(&self) -> usize {
        self.slots.len()
    }

    pub fn check_request_slot_and_do_necessary_thing(&mut self) -> Result<()> {
        let piece_storage = self.piece_storage()?.clone();
        let message_factory = self.message_factory()?.clone();
        let peer = self.peer()?.clone();
        let clock = self.clock();
        let timeout = self.config.request_timeout;

        let mut to_cancel = Vec::new();
        let mut snub = false;

        self.slots.retain(|slot| {
            let piece = piece_storage.get_piece(slot.piece_index);
            match &piece {
                None => false,
                Some(piece) => {
                    let completed = piece.lock().unwrap().is_block_completed(slot.block_index);
                    if completed {
                        tracing::trace!(
                            cuid = ?self.cuid,
                            index = slot.piece_index,
                            begin = slot.begin,
                            "cancelling request for a block completed elsewhere"
                        );
                        to_cancel.push((slot.piece_index, slot.begin, slot.length));
                        false
                    } else if clock.now().duration_since(slot.dispatched_at) > timeout {
                        tracing::warn!(
                            cuid = ?self.cuid,
                            index = slot.piece_index,
                            begin = slot.begin,
                            "request timed out, snubbing peer"
                        );
                        piece.lock().unwrap().cancel_block(slot.block_index);
                        snub = true;
                        false
                    } else {
                        true
                    }
                }
            }
        });

        for (index, begin, length) in to_cancel {
            self.queue
                .enqueue(message_factory.create_cancel_message(index, begin, length));
        }

        if snub {
            peer.lock().unwrap().set_snubbing(true);
        }

        Ok(())
    }

    pub fn is_sending_in_progress(&self) -> bool {
        self.queue
            .front()
            .map(BtMessage::sending_in_progress)
            .unwrap_or(false)
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("cuid", &self.cuid)
            .field("queue_len", &self.queue.len())
            .field("outstanding_requests", &self.slots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;


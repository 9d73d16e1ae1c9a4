use super::*;
use crate::clock::TestClock;
use crate::message::DefaultMessageFactory;
use crate::peer::Peer;
use crate::peer_storage::{FixedPeerStorage, TransferStat};
use crate::piece::Piece;
use crate::piece_storage::MapPieceStorage;
use std::net::Ipv4Addr;

fn peer() -> Arc<Mutex<Peer>> {
    Arc::new(Mutex::new(Peer::new(Ipv4Addr::LOCALHOST.into(), 6881)))
}

#[test]
fn basic_drain_sends_and_empties_two_non_upload_messages() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.set_peer_storage(Arc::new(FixedPeerStorage::default()));
    dispatcher.enqueue(BtMessage::choke());
    dispatcher.enqueue(BtMessage::unchoke());

    let mut sink = Vec::new();
    dispatcher.send_messages(&mut sink).unwrap();

    assert_eq!(dispatcher.queue_len(), 0);
}

#[test]
fn upload_throttled_messages_are_skipped_but_retained() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.set_max_upload_speed_limit(100);
    dispatcher.set_peer_storage(Arc::new(FixedPeerStorage(TransferStat::new(150, 0))));

    dispatcher.enqueue(BtMessage::piece(0, 0, vec![1, 2, 3]));
    dispatcher.enqueue(BtMessage::piece(1, 0, vec![4, 5, 6]));
    dispatcher.enqueue(BtMessage::choke());

    let mut sink = Vec::new();
    dispatcher.send_messages(&mut sink).unwrap();

    // Both uploads are retained unsent; only the control message is sent.
    assert_eq!(dispatcher.queue_len(), 2);
}

#[test]
fn sticky_head_stops_the_sweep_at_a_partial_write() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.set_peer_storage(Arc::new(FixedPeerStorage::default()));

    dispatcher.enqueue(BtMessage::choke());
    dispatcher.enqueue(BtMessage::piece(0, 0, vec![1, 2, 3, 4]));
    dispatcher.enqueue(BtMessage::unchoke());

    // A sink that accepts only 3 bytes per write call, forcing the
    // 4-byte PIECE payload (plus header) to go sending-in-progress.
    struct OneShotLimited {
        buf: Vec<u8>,
        remaining: usize,
    }
    impl Write for OneShotLimited {
        fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
            let n = data.len().min(self.remaining);
            self.remaining -= n;
            self.buf.extend_from_slice(&data[..n]);
            Ok(n)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
    let mut sink = OneShotLimited {
        buf: Vec::new(),
        remaining: 6,
    };

    dispatcher.send_messages(&mut sink).unwrap();

    assert_eq!(dispatcher.queue_len(), 2);
    assert!(dispatcher.is_sending_in_progress());
}

#[test]
fn cancel_broadcast_reaches_every_message_and_preserves_length() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.enqueue(BtMessage::piece(0, 0, vec![1, 2, 3]));
    dispatcher.enqueue(BtMessage::piece(1, 0, vec![4, 5, 6]));

    dispatcher.do_cancel_sending_piece_action(0, 0, 3);

    assert_eq!(dispatcher.queue_len(), 2);
}

#[test]
fn timeout_recovery_snubs_peer_and_releases_block() {
    let clock = Arc::new(TestClock::new());
    let mut storage = MapPieceStorage::new();
    storage.insert(Piece::new(0, 16384));
    let storage = Arc::new(storage);
    let piece = storage.get_piece(0).unwrap();
    piece.lock().unwrap().mark_in_flight(0);

    let peer_handle = peer();

    let mut dispatcher = Dispatcher::new();
    dispatcher.set_clock(clock.clone());
    dispatcher.set_piece_storage(storage);
    dispatcher.set_message_factory(Arc::new(DefaultMessageFactory));
    dispatcher.set_peer(peer_handle.clone());
    dispatcher.set_request_timeout(Duration::from_secs(60));

    let slot = RequestSlot::new(0, 0, 16384, 0, Some(piece.clone()), clock.as_ref());
    dispatcher.add_outstanding_request(slot);

    clock.advance(Duration::from_secs(61));
    dispatcher.check_request_slot_and_do_necessary_thing().unwrap();

    assert_eq!(dispatcher.count_outstanding_request(), 0);
    assert!(peer_handle.lock().unwrap().snubbing());
    assert!(!piece.lock().unwrap().is_block_used(0));
}

#[test]
fn fresh_slot_with_missing_block_is_retained() {
    let clock = Arc::new(TestClock::new());
    let mut storage = MapPieceStorage::new();
    storage.insert(Piece::new(0, 16384));
    let storage = Arc::new(storage);
    let piece = storage.get_piece(0).unwrap();

    let mut dispatcher = Dispatcher::new();
    dispatcher.set_clock(clock.clone());
    dispatcher.set_piece_storage(storage);
    dispatcher.set_message_factory(Arc::new(DefaultMessageFactory));
    dispatcher.set_peer(peer());
    dispatcher.set_request_timeout(Duration::from_secs(60));

    let slot = RequestSlot::new(0, 0, 16384, 0, Some(piece), clock.as_ref());
    dispatcher.add_outstanding_request(slot);

    dispatcher.check_request_slot_and_do_necessary_thing().unwrap();

    assert_eq!(dispatcher.count_outstanding_request(), 1);
    assert_eq!(dispatcher.queue_len(), 0);
}

#[test]
fn completed_block_enqueues_one_cancel_and_removes_slot() {
    let clock = Arc::new(TestClock::new());
    let mut storage = MapPieceStorage::new();
    storage.insert(Piece::new(0, 16384));
    let storage = Arc::new(storage);
    let piece = storage.get_piece(0).unwrap();
    piece.lock().unwrap().complete_block(0);

    let mut dispatcher = Dispatcher::new();
    dispatcher.set_clock(clock.clone());
    dispatcher.set_piece_storage(storage);
    dispatcher.set_message_factory(Arc::new(DefaultMessageFactory));
    dispatcher.set_peer(peer());

    let slot = RequestSlot::new(0, 0, 16384, 0, Some(piece), clock.as_ref());
    dispatcher.add_outstanding_request(slot);

    dispatcher.check_request_slot_and_do_necessary_thing().unwrap();

    assert_eq!(dispatcher.count_outstanding_request(), 0);
    assert_eq!(dispatcher.queue_len(), 1);
}

#[test]
fn is_outstanding_request_ignores_length_get_requires_it() {
    let clock = TestClock::new();
    let mut dispatcher = Dispatcher::new();
    let slot = RequestSlot::new(0, 0, 16384, 0, None, &clock);
    dispatcher.add_outstanding_request(slot);

    assert!(dispatcher.is_outstanding_request(0, 0));
    assert!(dispatcher.get_outstanding_request(0, 0, 16384).is_some());
    assert!(dispatcher.get_outstanding_request(0, 0, 1).is_none());
}

#[test]
fn remove_then_get_returns_none() {
    let clock = TestClock::new();
    let mut dispatcher = Dispatcher::new();
    let slot = RequestSlot::new(0, 0, 16384, 0, None, &clock);
    dispatcher.add_outstanding_request(slot.clone());
    dispatcher.remove_outstanding_request(&slot);

    assert!(dispatcher.get_outstanding_request(0, 0, 16384).is_none());
    assert_eq!(dispatcher.count_outstanding_request(), 0);
}

#[test]
fn missing_collaborator_fails_fast() {
    let mut dispatcher = Dispatcher::new();
    let mut sink = Vec::new();
    let err = dispatcher.send_messages(&mut sink).unwrap_err();
    assert!(matches!(err, DispatchError::MissingCollaborator("peer storage")));
}

/// End-to-end: a stale request's cancel message gets drained in the
/// same peer turn it was enqueued in, chaining all seven public
/// operations the way a real session's event loop would.
#[test]
fn slot_sweep_cancel_is_drained_by_the_next_send() -> anyhow::Result<()> {
    let clock = Arc::new(TestClock::new());
    let mut storage = MapPieceStorage::new();
    storage.insert(Piece::new(0, 16384));
    let storage = Arc::new(storage);
    let piece = storage.get_piece(0).unwrap();
    piece.lock().unwrap().complete_block(0);

    let mut dispatcher = Dispatcher::new();
    dispatcher.set_clock(clock.clone());
    dispatcher.set_piece_storage(storage);
    dispatcher.set_message_factory(Arc::new(DefaultMessageFactory));
    dispatcher.set_peer(peer());
    dispatcher.set_peer_storage(Arc::new(FixedPeerStorage::default()));

    let slot = RequestSlot::new(0, 0, 16384, 0, Some(piece), clock.as_ref());
    dispatcher.add_outstanding_request(slot);

    dispatcher.check_request_slot_and_do_necessary_thing()?;
    assert_eq!(dispatcher.queue_len(), 1);

    let mut sink = Vec::new();
    dispatcher.send_messages(&mut sink)?;

    assert_eq!(dispatcher.queue_len(), 0);
    assert!(!sink.is_empty(), "the CANCEL message must have been written");
    Ok(())
}

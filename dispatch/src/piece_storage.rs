//! `PieceStorage` collaborator: resolves a piece index to the shared
//! `Piece` the rest of the session tracks, or `None` if the piece is
//! no longer tracked (already verified and dropped, or never valid).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::piece::Piece;

pub trait PieceStorage: std::fmt::Debug {
    fn get_piece(&self, index: u32) -> Option<Arc<Mutex<Piece>>>;
}

/// An in-memory `PieceStorage` backed by a map, standing in for the
/// session-wide piece table the dispatcher borrows from. Good enough
/// for tests and for a minimal embedding of this crate.
#[derive(Debug, Default)]
pub struct MapPieceStorage {
    pieces: HashMap<u32, Arc<Mutex<Piece>>>,
}

impl MapPieceStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, piece: Piece) {
        self.pieces.insert(piece.index, Arc::new(Mutex::new(piece)));
    }
}

impl PieceStorage for MapPieceStorage {
    fn get_piece(&self, index: u32) -> Option<Arc<Mutex<Piece>>> {
        self.pieces.get(&index).cloned()
    }
}

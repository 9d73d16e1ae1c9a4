//! Block-granularity helpers shared by piece and request-slot bookkeeping.

use crate::BLOCK_SIZE;

/// Length in bytes of block `block_idx` within a piece of `piece_len`
/// bytes. Every block is `BLOCK_SIZE` except possibly the last one in
/// the piece.
pub fn block_len(piece_len: u32, block_idx: usize) -> u32 {
    let start = block_idx as u32 * BLOCK_SIZE;
    BLOCK_SIZE.min(piece_len.saturating_sub(start))
}

/// Number of blocks a piece of `piece_len` bytes is divided into.
pub fn num_blocks(piece_len: u32) -> u32 {
    (piece_len + (BLOCK_SIZE - 1)) / BLOCK_SIZE
}

/// Index of the block that starts at byte offset `begin` within its
/// piece.
pub fn block_index(begin: u32) -> usize {
    (begin / BLOCK_SIZE) as usize
}

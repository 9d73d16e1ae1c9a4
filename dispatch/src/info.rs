//! `BtContext`: piece length / total length, plain derived numbers
//! rather than a swappable capability.

use crate::metainfo::MetaInfo;

#[derive(Debug, Clone, Copy)]
pub struct BtContext {
    pub total_length: u64,
    pub piece_length: u32,
    last_piece_length: u32,
    pub num_pieces: u32,
}

impl BtContext {
    pub fn new(total_length: u64, piece_length: u32, num_pieces: u32) -> Self {
        let last_piece_length = if num_pieces == 0 {
            0
        } else {
            let full = piece_length as u64 * (num_pieces as u64 - 1);
            (total_length - full) as u32
        };
        Self {
            total_length,
            piece_length,
            last_piece_length,
            num_pieces,
        }
    }

    pub fn from_metainfo(metainfo: &MetaInfo) -> Self {
        Self::new(
            metainfo.total_len(),
            metainfo.piece_len(),
            metainfo.num_pieces(),
        )
    }

    pub fn get_total_length(&self) -> u64 {
        self.total_length
    }

    /// Length in bytes of piece `index`. Every piece is `piece_length`
    /// except possibly the last.
    pub fn get_piece_length(&self, index: u32) -> u32 {
        if index + 1 == self.num_pieces {
            self.last_piece_length
        } else {
            self.piece_length
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_piece_length_accounts_for_remainder() {
        let ctx = BtContext::new(33_677_666, 32_768, 1028);
        assert_eq!(ctx.get_piece_length(0), 32_768);
        assert_eq!(ctx.get_piece_length(1027), ctx.last_piece_length);
        assert!(ctx.last_piece_length <= 32_768);
    }
}

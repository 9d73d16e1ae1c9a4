//! Minimal `.torrent` metainfo parsing, reduced to the fields
//! `BtContext` actually needs (piece length, total length, piece
//! hashes). Tracker URLs and announce lists are deliberately not
//! modelled here; this engine's dispatcher has no use for them.

use serde_derive::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum MetaInfoError {
    #[error("bencode error whilst decoding metainfo: {0}")]
    Bencode(#[from] bencode::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid pieces length, must be divisible by 20")]
    InvalidPiecesLength,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct File {
    pub path: Vec<String>,
    pub length: u64,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct Info {
    pub name: String,

    #[serde(with = "serde_bytes")]
    pub pieces: Vec<u8>,

    #[serde(rename = "piece length")]
    pub piece_length: u32,

    #[serde(default)]
    pub length: Option<u64>,

    #[serde(default)]
    pub files: Option<Vec<File>>,
}

#[derive(Clone, Deserialize)]
pub struct MetaInfo {
    pub info: Info,

    #[serde(skip)]
    pub info_hash: [u8; 20],
}

impl MetaInfo {
    pub fn from_bytes(raw: &[u8]) -> Result<Self, MetaInfoError> {
        let mut metainfo: MetaInfo = bencode::decode_bytes(raw)?;

        if metainfo.info.pieces.is_empty() || metainfo.info.pieces.len() % 20 != 0 {
            return Err(MetaInfoError::InvalidPiecesLength);
        }

        metainfo.info_hash = metainfo.info.info_hash()?;
        Ok(metainfo)
    }

    pub fn new<P: AsRef<std::path::Path>>(path: P) -> Result<Self, MetaInfoError> {
        Self::from_bytes(&std::fs::read(path)?)
    }

    pub fn piece_hashes(&self) -> Vec<[u8; 20]> {
        self.info
            .pieces
            .chunks_exact(20)
            .map(|c| c.try_into().unwrap())
            .collect()
    }

    pub fn piece_len(&self) -> u32 {
        self.info.piece_length
    }

    pub fn num_pieces(&self) -> u32 {
        self.info.pieces.len() as u32 / 20
    }

    pub fn is_multi_file(&self) -> bool {
        self.info.files.is_some()
    }

    pub fn total_len(&self) -> u64 {
        if let Some(files) = &self.info.files {
            files.iter().map(|f| f.length).sum()
        } else {
            self.info.length.unwrap_or(0)
        }
    }

    pub fn info_hash_hex(&self) -> String {
        hex::encode(self.info_hash)
    }
}

impl Info {
    fn info_hash(&self) -> Result<[u8; 20], MetaInfoError> {
        use sha1::Digest;
        let mut hasher = sha1::Sha1::new();
        let info_data = bencode::encode_to_raw(&self)?;
        hasher.update(info_data);
        Ok(hasher.finalize().into())
    }
}

impl std::fmt::Debug for MetaInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaInfo")
            .field("info_hash", &self.info_hash_hex())
            .field("name", &self.info.name)
            .field("num_pieces", &self.num_pieces())
            .field("total_len", &self.total_len())
            .finish()
    }
}

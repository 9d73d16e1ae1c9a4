// Sampled once per send_messages call, not re-sampled between messages
// within that call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransferStat {
    pub upload_speed: u64,
    pub download_speed: u64,
}

impl TransferStat {
    pub fn new(upload_speed: u64, download_speed: u64) -> Self {
        Self {
            upload_speed,
            download_speed,
        }
    }
}

pub trait PeerStorage: std::fmt::Debug {
    fn transfer_stat(&self) -> TransferStat;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPeerStorage(pub TransferStat);

impl PeerStorage for FixedPeerStorage {
    fn transfer_stat(&self) -> TransferStat {
        self.0
    }
}

//! Dispatcher configuration: a plain struct with a `Default` impl.

use std::time::Duration;

/// The options that affect dispatcher behavior directly. Collaborator
/// handles (piece storage, peer storage, peer, message factory,
/// context) are wired in separately via the dispatcher's setters, since
/// they're shared references rather than plain values.
#[derive(Debug, Clone, Copy)]
pub struct DispatcherConfig {
    /// Upload ceiling in bytes/sec. Zero means unlimited.
    pub max_upload_speed_limit: u64,

    /// How long an outstanding request may sit unanswered before it's
    /// considered timed out and the peer is snubbed.
    pub request_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_upload_speed_limit: 0,
            request_timeout: Duration::from_secs(60),
        }
    }
}

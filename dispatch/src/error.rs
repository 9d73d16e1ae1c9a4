pub type Result<T> = std::result::Result<T, DispatchError>;

// Transient write failures and stale/timed-out requests never surface
// here, they're handled internally (retry, slot removal).
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("send to peer failed: {0}")]
    SendFailed(#[source] std::io::Error),

    #[error("dispatcher missing required collaborator: {0}")]
    MissingCollaborator(&'static str),
}

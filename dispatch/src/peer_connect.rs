// Opens a TCP socket to a peer and hands the result off as a command on
// a shared queue. The handshake itself runs elsewhere.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time;

#[derive(Debug, thiserror::Error)]
pub enum PeerConnectError {
    #[error("connection to peer timed out")]
    Timeout,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("engine is halted")]
    Halted,
}

#[derive(Debug)]
pub enum HandshakeCommand {
    Obfuscated { socket: TcpStream, peer: SocketAddr },
    Plain { socket: TcpStream, peer: SocketAddr },
}

#[derive(Debug)]
pub enum EngineCommand {
    RunHandshake(HandshakeCommand),
}

pub type CommandTx = mpsc::UnboundedSender<EngineCommand>;

pub trait PeerPool: std::fmt::Debug {
    fn return_peer(&self, peer: SocketAddr);
}

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn initiate_peer_connection(
    peer: SocketAddr,
    mse_handshake_enabled: bool,
    commands: &CommandTx,
    pool: &dyn PeerPool,
    is_halted: impl Fn() -> bool,
) -> Result<(), PeerConnectError> {
    if is_halted() {
        return Err(PeerConnectError::Halted);
    }

    tracing::info!(%peer, "connecting to peer");

    let result = time::timeout(CONNECT_TIMEOUT, TcpStream::connect(peer)).await;
    let socket = match result {
        Ok(Ok(socket)) => socket,
        Ok(Err(e)) => {
            tracing::warn!(%peer, error = %e, "connect failed");
            pool.return_peer(peer);
            return Err(e.into());
        }
        Err(_) => {
            tracing::warn!(%peer, "connect timed out");
            pool.return_peer(peer);
            return Err(PeerConnectError::Timeout);
        }
    };

    let handshake = if mse_handshake_enabled {
        HandshakeCommand::Obfuscated { socket, peer }
    } else {
        HandshakeCommand::Plain { socket, peer }
    };

    commands
        .send(EngineCommand::RunHandshake(handshake))
        .map_err(|e| {
            tracing::error!("engine command queue gone: {}", e);
            PeerConnectError::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, e))
        })
}

use crate::core_error::FtpError;
use crate::session::Session;
use log::{debug, warn};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::time::timeout;

/// The session's pending data connection. Holding a value here is what
/// "a data channel exists" means; [`open`] always consumes it.
#[derive(Debug, Default)]
pub enum DataPort {
    #[default]
    None,
    /// PORT: a socket bound to the local data port, connected lazily to `target`.
    Active { socket: TcpSocket, target: SocketAddr },
    /// PASV: a listener waiting for the client to connect.
    Passive { listener: TcpListener },
}

impl DataPort {
    pub fn is_none(&self) -> bool {
        matches!(self, DataPort::None)
    }
}

/// Establishes the data connection set up by the last PORT or PASV.
///
/// The pending socket is taken out of the session whatever happens, so each
/// PORT/PASV serves at most one transfer.
pub async fn open(session: &mut Session) -> Result<(TcpStream, SocketAddr), FtpError> {
    match std::mem::take(&mut session.data) {
        DataPort::None => Err(FtpError::NoDataConnection),
        DataPort::Passive { listener } => {
            let (stream, addr) = timeout(session.idle_timeout, listener.accept())
                .await
                .map_err(|_| FtpError::DataTimeout(session.idle_timeout.as_secs()))?
                .map_err(FtpError::DataAccept)?;

            if !session.auth.is_guest() && addr.ip() != session.peer_addr.ip() {
                warn!(
                    "Rejected data connection from {} (control peer is {})",
                    addr, session.peer_addr
                );
                return Err(FtpError::PeerMismatch(session.peer_addr.ip()));
            }
            debug!("Accepted passive data connection from {}", addr);
            Ok((stream, addr))
        }
        DataPort::Active { socket, target } => {
            let stream = socket
                .connect(target)
                .await
                .map_err(|source| FtpError::ConnectFailed { target, source })?;
            debug!("Active data connection to {} established", target);
            Ok((stream, target))
        }
    }
}

/// [`open`], with the outcome queued as a 150 or error reply.
pub async fn open_data_channel(session: &mut Session) -> Option<TcpStream> {
    let passive = matches!(session.data, DataPort::Passive { .. });
    match open(session).await {
        Ok((stream, addr)) => {
            if passive {
                session
                    .reply
                    .add(150, format!("Accepted data connection from {}", addr));
            } else {
                session.reply.add(150, format!("Connected to {}", addr));
            }
            Some(stream)
        }
        Err(e) => {
            warn!("Data connection failed: {}", e);
            session.reply.add(e.reply_code(), e.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_auth::{AuthState, PasswdFile};
    use crate::session::testing::session_in;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_without_port_or_pasv() {
        let dir = TempDir::new().unwrap();
        let (mut session, _replies) = session_in(dir.path(), PasswdFile::default());
        assert!(open_data_channel(&mut session).await.is_none());
        assert_eq!(session.reply.code(), 425);
    }

    #[tokio::test]
    async fn test_passive_accept() {
        let dir = TempDir::new().unwrap();
        let (mut session, _replies) = session_in(dir.path(), PasswdFile::default());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        session.data = DataPort::Passive { listener };

        let client = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });
        let stream = open_data_channel(&mut session).await;
        assert!(stream.is_some());
        assert_eq!(session.reply.code(), 150);
        assert!(session.data.is_none());
        client.await.unwrap();
    }

    #[tokio::test]
    async fn test_passive_timeout() {
        let dir = TempDir::new().unwrap();
        let (mut session, _replies) = session_in(dir.path(), PasswdFile::default());
        session.idle_timeout = Duration::from_millis(50);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        session.data = DataPort::Passive { listener };

        match open(&mut session).await {
            Err(FtpError::DataTimeout(_)) => {}
            other => panic!("unexpected {:?}", other.map(|(_, a)| a)),
        }
        assert!(session.data.is_none());
    }

    #[tokio::test]
    async fn test_passive_peer_mismatch() {
        let dir = TempDir::new().unwrap();
        let (mut session, _replies) = session_in(dir.path(), PasswdFile::default());
        // Pretend the control connection came from elsewhere.
        session.peer_addr = "10.9.8.7:40000".parse().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        session.data = DataPort::Passive { listener };

        let client = tokio::spawn(async move { TcpStream::connect(addr).await });
        match open(&mut session).await {
            Err(FtpError::PeerMismatch(ip)) => assert_eq!(ip.to_string(), "10.9.8.7"),
            other => panic!("unexpected {:?}", other.map(|(_, a)| a)),
        }
        let _ = client.await;
    }

    #[tokio::test]
    async fn test_guest_skips_peer_check() {
        let dir = TempDir::new().unwrap();
        let (mut session, _replies) = session_in(dir.path(), PasswdFile::default());
        session.peer_addr = "10.9.8.7:40000".parse().unwrap();
        session.auth = AuthState::Guest;
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        session.data = DataPort::Passive { listener };

        let client = tokio::spawn(async move { TcpStream::connect(addr).await });
        assert!(open(&mut session).await.is_ok());
        let _ = client.await;
    }

    #[tokio::test]
    async fn test_active_connect() {
        let dir = TempDir::new().unwrap();
        let (mut session, _replies) = session_in(dir.path(), PasswdFile::default());
        let client_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let target = client_listener.local_addr().unwrap();
        let socket = TcpSocket::new_v4().unwrap();
        socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
        session.data = DataPort::Active { socket, target };

        let accept = tokio::spawn(async move { client_listener.accept().await.unwrap() });
        let stream = open_data_channel(&mut session).await;
        assert!(stream.is_some());
        assert_eq!(session.reply.lines()[0], format!("Connected to {}", target));
        accept.await.unwrap();
    }
}

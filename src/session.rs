use crate::config::Config;
use crate::core_auth::{AuthState, IdentityProvider};
use crate::core_ftpcommand::handlers::{read_and_dispatch, Flow};
use crate::core_network::datachan::DataPort;
use crate::core_reply::ReplyQueue;
use log::debug;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncWrite};

pub type ControlWriter = Box<dyn AsyncWrite + Send + Sync + Unpin>;

/// Per-connection state. Owned by exactly one task on the connection's own
/// thread; nothing in here is shared.
pub struct Session {
    pub config: Arc<Config>,
    pub identities: Arc<dyn IdentityProvider>,
    pub control: ControlWriter,
    pub reply: ReplyQueue,
    pub peer_addr: SocketAddr,  // Captured at accept time
    pub local_addr: SocketAddr, // Control channel's local end, used for PASV
    pub data: DataPort,
    pub current_dir: String,
    pub auth: AuthState,
    pub rename_from: Option<String>,
    pub restart_at: u64,
    pub idle_timeout: Duration,
    pub chunk_size: usize,
}

impl Session {
    pub fn new(
        config: Arc<Config>,
        identities: Arc<dyn IdentityProvider>,
        control: ControlWriter,
        peer_addr: SocketAddr,
        local_addr: SocketAddr,
    ) -> Self {
        let idle_timeout = config.server.idle_timeout();
        let chunk_size = config.server.chunk_size();
        Self {
            config,
            identities,
            control,
            reply: ReplyQueue::new(),
            peer_addr,
            local_addr,
            data: DataPort::None,
            current_dir: String::from("/"),
            auth: AuthState::default(),
            rename_from: None,
            restart_at: 0,
            idle_timeout,
            chunk_size,
        }
    }

    /// Sends every queued reply line over the control channel.
    pub async fn flush_replies(&mut self) -> std::io::Result<()> {
        self.reply.flush(&mut self.control).await
    }

    /// Hands out the pending REST offset, leaving 0 behind.
    pub fn take_restart_offset(&mut self) -> u64 {
        std::mem::take(&mut self.restart_at)
    }

    /// Runs the read-dispatch-reply loop until QUIT, timeout or a dead control channel.
    pub async fn run<R>(&mut self, reader: &mut R) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        loop {
            self.flush_replies().await?;
            if let Flow::Quit = read_and_dispatch(self, reader).await? {
                break;
            }
        }
        self.flush_replies().await?;
        debug!("Session with {} finished", self.peer_addr);
        Ok(())
    }
}

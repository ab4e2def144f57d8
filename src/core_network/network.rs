use crate::config::Config;
use crate::core_auth::IdentityProvider;
use crate::core_network::limiter::ConnectionLimiter;
use crate::session::Session;
use anyhow::{Context, Result};
use log::{error, info, warn};
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// Accepts control connections forever, one thread per connection.
pub async fn start_server(
    config: Arc<Config>,
    identities: Arc<dyn IdentityProvider>,
) -> Result<()> {
    let bind_addr = format!(
        "{}:{}",
        config.server.listen_address, config.server.listen_port
    );
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind control listener on {}", bind_addr))?;
    info!("Server listening on {}", bind_addr);

    serve(listener, config, identities).await
}

pub async fn serve(
    listener: TcpListener,
    config: Arc<Config>,
    identities: Arc<dyn IdentityProvider>,
) -> Result<()> {
    let limiter = ConnectionLimiter::new(config.server.max_connections_per_ip);

    loop {
        let (mut socket, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                continue;
            }
        };
        info!("New connection from {}", addr);

        let guard = match limiter.try_acquire(addr.ip()) {
            Some(guard) => guard,
            None => {
                warn!("Too many connections from {}, refusing", addr.ip());
                let refusal = format!("421 Too many connections from {}\r\n", addr.ip());
                tokio::spawn(async move {
                    let _ = socket.write_all(refusal.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
                continue;
            }
        };

        let socket = match socket.into_std() {
            Ok(socket) => socket,
            Err(e) => {
                error!("Cannot hand over connection from {}: {}", addr, e);
                continue;
            }
        };
        let config = Arc::clone(&config);
        let identities = Arc::clone(&identities);
        let spawned = std::thread::Builder::new()
            .name(format!("session-{}", addr))
            .spawn(move || {
                if let Err(e) = run_session_thread(socket, config, identities) {
                    warn!("Connection error with {}: {}", addr, e);
                }
                drop(guard);
                info!("Connection closed for {}", addr);
            });
        if let Err(e) = spawned {
            error!("Cannot start session thread for {}: {}", addr, e);
        }
    }
}

/// Drives one session on the calling thread. Login switches the thread's
/// credentials, so all of the session's filesystem access happens here.
fn run_session_thread(
    socket: std::net::TcpStream,
    config: Arc<Config>,
    identities: Arc<dyn IdentityProvider>,
) -> std::io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .enable_time()
        .build()?;
    runtime.block_on(async move {
        let socket = TcpStream::from_std(socket)?;
        handle_connection(socket, config, identities).await
    })
}

pub async fn handle_connection(
    socket: TcpStream,
    config: Arc<Config>,
    identities: Arc<dyn IdentityProvider>,
) -> std::io::Result<()> {
    let peer_addr = socket.peer_addr()?;
    let local_addr = socket.local_addr()?;
    let (reader, writer) = socket.into_split();
    let mut reader = BufReader::new(reader);

    let banner = config.server.banner.clone();
    let mut session = Session::new(config, identities, Box::new(writer), peer_addr, local_addr);
    session.reply.add(220, banner);
    session.run(&mut reader).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_auth::PasswdFile;
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt};

    async fn spawn_server(config: Config) -> std::net::SocketAddr {
        spawn_server_with(config, PasswdFile::default()).await
    }

    async fn spawn_server_with(config: Config, passwd: PasswdFile) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, Arc::new(config), Arc::new(passwd)));
        addr
    }

    async fn exchange<R, W>(reader: &mut R, writer: &mut W, command: &str) -> String
    where
        R: AsyncBufReadExt + Unpin,
        W: AsyncWriteExt + Unpin,
    {
        writer.write_all(command.as_bytes()).await.unwrap();
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        line
    }

    #[tokio::test]
    async fn test_greeting_and_guest_session() {
        let home = TempDir::new().unwrap();
        let mut config = Config::default();
        config.server.banner = String::from("ferroftpd ready");
        config.auth.guest_home = home.path().to_path_buf();
        config.auth.guest_user = String::new();
        let addr = spawn_server(config).await;

        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut line = String::new();

        reader.read_line(&mut line).await.unwrap();
        assert_eq!(line, "220 ferroftpd ready\r\n");

        writer.write_all(b"USER anonymous\r\n").await.unwrap();
        line.clear();
        reader.read_line(&mut line).await.unwrap();
        assert!(line.starts_with("230 "), "{}", line);

        writer.write_all(b"QUIT\r\n").await.unwrap();
        line.clear();
        reader.read_line(&mut line).await.unwrap();
        assert_eq!(line, "221 Goodbye\r\n");
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let mut config = Config::default();
        config.server.max_connections_per_ip = 1;
        let addr = spawn_server(config).await;

        let mut first = BufReader::new(TcpStream::connect(addr).await.unwrap());
        let mut line = String::new();
        first.read_line(&mut line).await.unwrap();
        assert!(line.starts_with("220 "));

        let mut second = TcpStream::connect(addr).await.unwrap();
        let mut refused = String::new();
        second.read_to_string(&mut refused).await.unwrap();
        assert_eq!(refused, "421 Too many connections from 127.0.0.1\r\n");
    }

    #[tokio::test]
    async fn test_named_session_runs_with_account_uid() {
        if !nix::unistd::geteuid().is_root() {
            return;
        }
        let root = TempDir::new().unwrap();
        let home = root.path().join("home");
        std::fs::create_dir(&home).unwrap();
        std::fs::set_permissions(root.path(), Permissions::from_mode(0o755)).unwrap();
        std::fs::set_permissions(&home, Permissions::from_mode(0o755)).unwrap();
        let secret = root.path().join("secret");
        std::fs::write(&secret, b"root-only secret").unwrap();
        std::fs::set_permissions(&secret, Permissions::from_mode(0o600)).unwrap();

        let hashed = bcrypt::hash("pw", 4).unwrap();
        let passwd = PasswdFile::parse(&format!("nobody:{}:{}:65534", hashed, home.display()));
        let addr = spawn_server_with(Config::default(), passwd).await;

        let (reader, mut writer) = TcpStream::connect(addr).await.unwrap().into_split();
        let mut reader = BufReader::new(reader);
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        assert!(line.starts_with("220 "));

        let reply = exchange(&mut reader, &mut writer, "USER nobody\r\n").await;
        assert!(reply.starts_with("331 "), "{}", reply);
        let reply = exchange(&mut reader, &mut writer, "PASS pw\r\n").await;
        assert!(reply.starts_with("230 "), "{}", reply);
        let reply = exchange(&mut reader, &mut writer, "PASV\r\n").await;
        assert!(reply.starts_with("227 "), "{}", reply);
        let reply = exchange(&mut reader, &mut writer, "RETR ../secret\r\n").await;
        assert!(reply.starts_with("550 "), "{}", reply);

        // The server itself keeps its credentials.
        assert!(std::fs::read(&secret).is_ok());
        let reply = exchange(&mut reader, &mut writer, "QUIT\r\n").await;
        assert_eq!(reply, "221 Goodbye\r\n");
    }
}

use crate::core_error::FtpError;
use crate::core_network::datachan::DataPort;
use crate::session::Session;
use log::{error, info, warn};
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use tokio::net::TcpSocket;

/// Parses `h1,h2,h3,h4,p1,p2`. Every field must fit in an octet.
pub fn parse_port_argument(arg: &str) -> Option<SocketAddrV4> {
    let parts: Vec<u8> = arg
        .split(',')
        .map(|x| x.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .ok()?;
    if parts.len() != 6 {
        return None;
    }
    let ip = Ipv4Addr::new(parts[0], parts[1], parts[2], parts[3]);
    let port = (parts[4] as u16) << 8 | parts[5] as u16;
    Some(SocketAddrV4::new(ip, port))
}

/// Creates the outbound data socket, bound to the configured local data port.
///
/// A session that already dropped to an unprivileged uid may no longer bind
/// a port below 1024; it falls back to an ephemeral port.
fn bind_data_socket(data_port: u16) -> Result<TcpSocket, FtpError> {
    match bind_v4(data_port) {
        Err(FtpError::Bind(e)) if data_port != 0 && e.kind() == ErrorKind::PermissionDenied => {
            warn!("Cannot bind data port {}: {}, using an ephemeral port", data_port, e);
            bind_v4(0)
        }
        bound => bound,
    }
}

fn bind_v4(port: u16) -> Result<TcpSocket, FtpError> {
    let socket = TcpSocket::new_v4().map_err(FtpError::Bind)?;
    socket.set_reuseaddr(true).map_err(FtpError::Bind)?;
    socket
        .bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
        .map_err(FtpError::Bind)?;
    Ok(socket)
}

/// Handles the PORT (Active Mode) FTP command.
///
/// Only the control connection's peer may be named as target; the connect
/// itself is deferred until a transfer needs it.
pub fn handle_port_command(session: &mut Session, arg: &str) {
    let target = match parse_port_argument(arg) {
        Some(target) => target,
        None => {
            warn!("Malformed PORT argument: {}", arg);
            session.reply.add(501, "Syntax error in parameters or arguments");
            return;
        }
    };

    // Any previous PORT/PASV socket is closed here.
    session.data = DataPort::None;

    if IpAddr::V4(*target.ip()) != session.peer_addr.ip() {
        warn!(
            "Refusing PORT to {} from control peer {}",
            target, session.peer_addr
        );
        session.reply.add(
            425,
            format!(
                "Will not open a connection to {} (only to {})",
                target.ip(),
                session.peer_addr.ip()
            ),
        );
        return;
    }

    match bind_data_socket(session.config.server.data_port) {
        Ok(socket) => {
            info!("Received PORT command with target {}", target);
            session.data = DataPort::Active {
                socket,
                target: SocketAddr::V4(target),
            };
            session.reply.add(200, "PORT command successful");
        }
        Err(e) => {
            error!("Failed to prepare active data socket: {}", e);
            session.reply.add(e.reply_code(), e.to_string());
        }
    }
}

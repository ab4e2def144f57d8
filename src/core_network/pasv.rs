use crate::core_error::FtpError;
use crate::core_network::datachan::DataPort;
use crate::session::Session;
use log::{debug, error, warn};
use std::net::{IpAddr, Ipv4Addr};
use tokio::net::TcpListener;

/// Formats the RFC 959 `h1,h2,h3,h4,p1,p2` tuple.
pub fn format_pasv_reply(ip: Ipv4Addr, port: u16) -> String {
    let [h1, h2, h3, h4] = ip.octets();
    format!(
        "Entering Passive Mode ({},{},{},{},{},{})",
        h1,
        h2,
        h3,
        h4,
        port >> 8,
        port & 0xff
    )
}

/// Picks the IPv4 address the client should connect to.
fn advertised_ip(session: &Session) -> Option<Ipv4Addr> {
    let configured = session.config.server.pasv_address.trim();
    if !configured.is_empty() {
        match configured.parse::<Ipv4Addr>() {
            Ok(ip) if !ip.is_unspecified() => return Some(ip),
            Ok(_) => {}
            Err(e) => warn!("Ignoring invalid pasv_address {:?}: {}", configured, e),
        }
    }
    match session.local_addr.ip() {
        IpAddr::V4(ip) => Some(ip),
        IpAddr::V6(ip) => ip.to_ipv4_mapped(),
    }
}

/// Sets up a passive mode (PASV) listener on `bind_ip`.
/// Returns the listener and the formatted PASV reply text.
pub async fn setup_pasv_listener(
    bind_ip: IpAddr,
    advertised: Ipv4Addr,
) -> Result<(TcpListener, String), FtpError> {
    let listener = TcpListener::bind((bind_ip, 0))
        .await
        .map_err(FtpError::Bind)?;
    let addr = listener.local_addr().map_err(FtpError::Bind)?;
    debug!(
        "PASV listener set up on {}, advertised as {}:{}",
        addr,
        advertised,
        addr.port()
    );
    Ok((listener, format_pasv_reply(advertised, addr.port())))
}

/// Handles the PASV FTP command. The accept happens later, when a transfer opens the channel.
pub async fn handle_pasv_command(session: &mut Session) {
    // Any previous PORT/PASV socket is closed here.
    session.data = DataPort::None;

    let advertised = match advertised_ip(session) {
        Some(ip) => ip,
        None => {
            session
                .reply
                .add(425, "Passive mode needs an IPv4 control connection");
            return;
        }
    };

    match setup_pasv_listener(session.local_addr.ip(), advertised).await {
        Ok((listener, reply)) => {
            session.data = DataPort::Passive { listener };
            session.reply.add(227, reply);
        }
        Err(e) => {
            error!("Failed to enter passive mode: {}", e);
            session.reply.add(e.reply_code(), e.to_string());
        }
    }
}

use crate::core_auth::AuthState;
use crate::session::Session;
use log::{error, info, warn};
use std::sync::Arc;

/// Handles the PASS FTP command.
///
/// Validates `password` against the account named by the preceding USER.
/// On success the session switches to that identity and moves to its home
/// directory.
pub async fn handle_pass_command(session: &mut Session, password: &str) {
    let name = match &session.auth {
        AuthState::Named(_) | AuthState::Guest => {
            session.reply.add(230, "Already logged in");
            return;
        }
        AuthState::Unauthenticated { pending: None } => {
            session.reply.add(332, "Need a user name first");
            return;
        }
        AuthState::Unauthenticated {
            pending: Some(name),
        } => name.clone(),
    };

    let identity = match session.identities.lookup(&name) {
        Some(identity) => identity,
        None => {
            session.reply.add(331, "Unknown user");
            return;
        }
    };

    // bcrypt is deliberately slow; keep it off the reactor.
    let identities = Arc::clone(&session.identities);
    let candidate = password.to_string();
    let account = name.clone();
    let verified = tokio::task::spawn_blocking(move || identities.authenticate(&account, &candidate))
        .await
        .unwrap_or(false);
    if !verified {
        warn!("Wrong password for {} from {}", name, session.peer_addr);
        session.reply.add(530, "Login incorrect");
        return;
    }

    if let Err(e) = session.identities.become_user(&identity) {
        error!("Cannot switch to {}: {}", name, e);
        session.reply.add(530, format!("User cannot log in: {}", e));
        return;
    }

    let home = match std::fs::canonicalize(&identity.home_dir) {
        Ok(home) => home.to_string_lossy().replace('\\', "/"),
        Err(e) => {
            error!("Home directory of {} unavailable: {}", name, e);
            session.reply.add(530, "User cannot log in");
            return;
        }
    };

    session.current_dir = home;
    session.auth = AuthState::Named(identity);
    session.reply.add(
        230,
        format!("Login successful. Current directory is {}", session.current_dir),
    );
    info!("User {} logged in from {}", name, session.peer_addr);
}

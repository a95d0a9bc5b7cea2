use battlehub_core::{
    auth::{Authenticator, Credentials},
    storage::StorageBackend,
};
use battlehub_session::{GuardDecision, Navigator, SessionGate};
use color_eyre::Result;
use tracing::{info, warn};

/// Navigator for the terminal. A "reload" ends the command, so nothing from the
/// old session outlives it; we only report where the user ends up.
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn reload(&self, path: &str) {
        info!(path, "reloading");
        println!("Redirecting to {path}");
    }
}

/// Sign in unless a session already exists; returns the line to show the user.
pub async fn login<B: StorageBackend>(
    gate: &SessionGate<B>,
    authenticator: &dyn Authenticator,
    username: String,
    password: String,
) -> Result<String> {
    if let Some(landing) = gate.resume() {
        let who = gate
            .current_session()
            .map(|s| s.username)
            .unwrap_or_default();
        return Ok(format!("Already signed in as {who}; continue at {landing}"));
    }

    let landing = gate
        .sign_in(authenticator, &Credentials::new(username, password))
        .await
        .map_err(|e| color_eyre::eyre::eyre!("login failed: {e}"))?;

    // Store writes never fail loudly; confirm the session actually landed.
    if gate.current_session().is_none() {
        warn!("session was accepted but could not be saved");
        return Ok(format!(
            "Login accepted, but the session could not be saved; \
             run `battlehub health`. Continue at {landing}"
        ));
    }
    Ok(format!("Login successful. Continue at {landing}"))
}

pub fn logout<B: StorageBackend>(gate: &SessionGate<B>) {
    gate.logout();
    println!("Signed out.");
}

pub fn whoami<B: StorageBackend>(gate: &SessionGate<B>) -> String {
    match gate.current_session() {
        Some(session) => format!(
            "{} ({}) role={}",
            session.username, session.user_id, session.role
        ),
        None => "Not signed in.".to_string(),
    }
}

pub fn open<B: StorageBackend>(gate: &SessionGate<B>, path: &str) -> String {
    match gate.guard(path) {
        GuardDecision::Allow => format!("allow {path}"),
        GuardDecision::Redirect(target) => format!("redirect {path} -> {target}"),
    }
}

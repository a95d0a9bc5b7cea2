mod admin;
mod cli;
mod config;
mod matches;
mod password;
mod session;
mod storage;
mod wallet;

use std::sync::Arc;

use battlehub_api::ApiClient;
use battlehub_core::storage::StorageBackend;
use battlehub_session::SessionGate;
use battlehub_storage::{encrypted_store::EncryptedStore, file_backend::FileStorage};
use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Command, ConfigCommand, MatchesCommand};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    let config = config::load()?;
    match cli.command {
        Command::Version => print_version(),
        Command::Config(ConfigCommand::Init) => init_config(&config)?,
        Command::Health => run_health_check(&config)?,
        command => run_session_command(command, &config).await?,
    }

    Ok(())
}

fn init_tracing() {
    // Respect user-provided filters, default to info to avoid noisy stdout.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Commands that need the shared session gate and API client.
async fn run_session_command(command: Command, config: &config::Config) -> Result<()> {
    let shared = storage::gate_from_config(config, Arc::new(session::TerminalNavigator))?;
    let api = ApiClient::new(&config.api(), shared.clone());
    let gate: &SessionGate<FileStorage> = &shared;

    match command {
        Command::Login { username, password } => {
            println!("{}", session::login(gate, &api, username, password).await?)
        }
        Command::Logout => session::logout(gate),
        Command::Whoami => println!("{}", session::whoami(gate)),
        Command::Open { path } => println!("{}", session::open(gate, &path)),
        Command::Wallet => wallet::show(gate, &api).await?,
        Command::Withdraw { amount } => wallet::withdraw(gate, &api, amount).await?,
        Command::Upi { upi_id } => wallet::set_upi(gate, &api, &upi_id).await?,
        Command::Matches(MatchesCommand::List { mode }) => matches::list(&api, mode).await?,
        Command::Matches(MatchesCommand::Join {
            match_id,
            mode,
            team,
            players,
        }) => matches::join(gate, &api, &match_id, mode, team, &players).await?,
        Command::Password(command) => password::run(&api, command).await?,
        Command::Admin(command) => println!("{}", admin::run(gate, command)?),
        Command::Version | Command::Health | Command::Config(_) => {}
    }
    Ok(())
}

fn print_version() {
    println!("battlehub {}", env!("CARGO_PKG_VERSION"));
}

/// Runs a quick health check of the encrypted storage path.
fn run_health_check(config: &config::Config) -> Result<()> {
    let store = storage::store_from_config(config)?;
    run_store_health(&store)?;
    println!("Storage: ok");
    Ok(())
}

fn run_store_health<B: StorageBackend>(store: &EncryptedStore<B>) -> Result<()> {
    let probe_key = "health/probe";
    let payload = "ok".to_string();
    store.set(probe_key, &payload);
    let round_trip = store.read::<String>(probe_key);
    store.remove(probe_key);

    match round_trip.into_option() {
        Some(value) if value == payload => Ok(()),
        _ => color_eyre::eyre::bail!("storage round-trip failed"),
    }
}

fn init_config(config: &config::Config) -> Result<()> {
    let path = config::write_default_if_missing(config)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_check_with_test_store_succeeds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = storage::test_store(dir.path());
        run_store_health(&store).expect("health check should succeed");
        assert_eq!(store.get::<String>("health/probe"), None);
    }

    #[test]
    fn health_check_fails_when_backend_is_unwritable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").expect("write");

        // The store root is a regular file, so every write fails and reads come back empty.
        let store = storage::test_store(&blocker);
        assert!(run_store_health(&store).is_err());
    }
}

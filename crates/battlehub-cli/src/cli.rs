use clap::{Parser, Subcommand, ValueEnum};

/// CLI surface definition.
#[derive(Parser, Debug)]
#[command(
    name = "battlehub",
    about = "BattleHub client: sign in, check your wallet and join matches",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Sign in and store the session (encrypted at rest).
    Login {
        /// Username or phone number.
        username: String,
        #[arg(long, env = "BATTLEHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Clear the stored session.
    Logout,
    /// Show who is signed in.
    Whoami,
    /// Check whether the current session may open a route.
    Open { path: String },
    /// Fetch and show the wallet balance.
    Wallet,
    /// Request a withdrawal to the saved UPI id.
    Withdraw { amount: f64 },
    /// Save the UPI id used for withdrawals.
    Upi { upi_id: String },
    /// Browse and join matches.
    #[command(subcommand)]
    Matches(MatchesCommand),
    /// Reset a forgotten password with an emailed OTP.
    #[command(subcommand)]
    Password(PasswordCommand),
    /// Admin tools (requires an admin session).
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Run a round-trip check against the encrypted store.
    Health,
    /// Print version and exit.
    Version,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum MatchesCommand {
    /// List upcoming matches for a mode.
    List {
        #[arg(value_enum, default_value_t = Mode::Squad)]
        mode: Mode,
    },
    /// Register for a match.
    Join {
        match_id: String,
        #[arg(long, value_enum)]
        mode: Mode,
        /// Team name (not needed for solo).
        #[arg(long, default_value = "")]
        team: String,
        /// Player as `name:in-game-id`; repeat once per roster slot.
        #[arg(long = "player", required = true)]
        players: Vec<String>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PasswordCommand {
    /// Email a one-time code for resetting the password.
    Forgot { email: String },
    /// Check the emailed code.
    Verify { email: String, otp: String },
    /// Set the new password once the code is verified.
    Reset {
        email: String,
        #[arg(long, env = "BATTLEHUB_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum AdminCommand {
    /// Approve an uploaded payment and credit the user's wallet.
    Approve { user_id: String, amount: f64 },
    /// Show the credited wallet balance for a user.
    Balance { user_id: String },
    /// Auto-split a prize pool across the top ranks.
    Prize {
        pool: i64,
        #[arg(long, default_value_t = 3)]
        ranks: usize,
        #[arg(long, default_value_t = 0)]
        highest_kill: i64,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Solo,
    Duo,
    Squad,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}

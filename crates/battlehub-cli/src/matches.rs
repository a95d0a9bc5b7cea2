use battlehub_api::{
    models::{JoinRequest, MatchMode, MatchSummary, Player},
    ApiClient,
};
use battlehub_core::{schedule, storage::StorageBackend};
use battlehub_session::SessionGate;
use chrono::{DateTime, Utc};
use color_eyre::Result;

use crate::{cli::Mode, wallet::require_session};

impl From<Mode> for MatchMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Solo => MatchMode::Solo,
            Mode::Duo => MatchMode::Duo,
            Mode::Squad => MatchMode::Squad,
        }
    }
}

pub async fn list(api: &ApiClient, mode: Mode) -> Result<()> {
    let matches = api
        .list_matches(mode.into())
        .await
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
    if matches.is_empty() {
        println!("No matches scheduled.");
        return Ok(());
    }
    let now = Utc::now();
    for summary in &matches {
        println!("{}", describe(summary, now));
    }
    Ok(())
}

pub async fn join<B: StorageBackend>(
    gate: &SessionGate<B>,
    api: &ApiClient,
    match_id: &str,
    mode: Mode,
    team: String,
    players: &[String],
) -> Result<()> {
    let session = require_session(gate)?;
    let request = JoinRequest {
        user_id: session.user_id,
        team_name: team,
        players: players
            .iter()
            .map(|raw| parse_player(raw))
            .collect::<Result<Vec<_>>>()?,
    };

    let fee = api
        .match_fee(match_id)
        .await
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
    let ack = api
        .join_match(match_id, mode.into(), &request)
        .await
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
    println!(
        "{} (entry fee Rs.{fee:.2})",
        ack.message.as_deref().unwrap_or("Registered successfully!")
    );
    Ok(())
}

fn parse_player(raw: &str) -> Result<Player> {
    let (name, id) = raw
        .split_once(':')
        .ok_or_else(|| color_eyre::eyre::eyre!("player `{raw}` must look like name:in-game-id"))?;
    Ok(Player {
        player_name: name.trim().to_string(),
        in_game_id: id.trim().to_string(),
    })
}

fn describe(summary: &MatchSummary, now: DateTime<Utc>) -> String {
    let raw_time = summary.match_time.as_deref().unwrap_or_default();
    let Some(start) = schedule::parse_timestamp(raw_time) else {
        return format!(
            "{} {} | time TBA | entry Rs.{:.2}",
            summary.id, summary.match_name, summary.entry_fee
        );
    };

    let closes = schedule::registration_deadline(raw_time)
        .map(|t| format!(", registration closes {}", t.format("%Y-%m-%d %H:%M UTC")))
        .unwrap_or_default();
    let mut line = format!(
        "{} {} | {}{} | {} | entry Rs.{:.2}",
        summary.id,
        summary.match_name,
        start.format("%Y-%m-%d %H:%M UTC"),
        closes,
        schedule::countdown(start, now),
        summary.entry_fee
    );
    if let Some(room) = &summary.room_id {
        if schedule::room_details_visible(start, now) {
            let password = summary.room_password.as_deref().unwrap_or("-");
            line.push_str(&format!(" | room {room} / {password}"));
        } else {
            line.push_str(" | room unlocks 15 min before start");
        }
    }
    line
}

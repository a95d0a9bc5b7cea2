//! Request and response bodies of the REST backend.

use battlehub_core::session::{Role, SessionRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub role: Role,
}

impl LoginResponse {
    pub fn into_session(self) -> SessionRecord {
        SessionRecord {
            token: self.token,
            user_id: self.user.id,
            username: self.user.username,
            role: self.user.role,
        }
    }
}

/// Generic `{ message }` acknowledgement; every field optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
    /// Set by the join endpoint when an in-game id is already registered.
    #[serde(default)]
    pub duplicate_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: UserProfile,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub wallet_balance: f64,
    #[serde(default)]
    pub upi: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MatchList {
    #[serde(default)]
    pub matches: Vec<MatchSummary>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub match_name: String,
    /// Raw timestamp; see `battlehub_core::schedule::parse_timestamp`.
    #[serde(default, deserialize_with = "string_or_number")]
    pub match_time: Option<String>,
    #[serde(default)]
    pub entry_fee: f64,
    /// Room credentials; only present for matches the caller has booked.
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default, rename = "password")]
    pub room_password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MatchFee {
    #[serde(default)]
    pub entry_fee: f64,
}

/// Competitive formats with their own listing endpoint and team size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Solo,
    Duo,
    Squad,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Solo => "solo",
            MatchMode::Duo => "duo",
            MatchMode::Squad => "squad",
        }
    }

    pub fn team_size(&self) -> usize {
        match self {
            MatchMode::Solo => 1,
            MatchMode::Duo => 2,
            MatchMode::Squad => 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub player_name: String,
    pub in_game_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub user_id: String,
    pub team_name: String,
    pub players: Vec<Player>,
}

impl JoinRequest {
    /// Check the roster against the mode's team size and require every field.
    pub fn validate(&self, mode: MatchMode) -> Result<(), String> {
        if self.players.len() != mode.team_size() {
            return Err(format!(
                "{} matches need exactly {} player(s), got {}",
                mode.as_str(),
                mode.team_size(),
                self.players.len()
            ));
        }
        if mode != MatchMode::Solo && self.team_name.trim().is_empty() {
            return Err("team name is required".to_string());
        }
        if self
            .players
            .iter()
            .any(|p| p.player_name.trim().is_empty() || p.in_game_id.trim().is_empty())
        {
            return Err("every player needs a name and an in-game id".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    pub user_id: String,
    pub amount: f64,
    pub upi_id: String,
}

impl WithdrawRequest {
    /// Client-side checks done before a withdrawal is submitted.
    pub fn validate(&self, balance: f64) -> Result<(), String> {
        if self.upi_id.trim().is_empty() {
            return Err("set a UPI id before withdrawing".to_string());
        }
        if self.amount.is_nan() || self.amount <= 0.0 {
            return Err("enter a valid withdraw amount".to_string());
        }
        if self.amount > balance {
            return Err("insufficient balance".to_string());
        }
        Ok(())
    }
}

/// Symbols accepted by the new-password rule.
const PASSWORD_SYMBOLS: &str = "!@#$%^&*()?_=+<>/.,;:'\"-";

/// First step of the password reset: mail a one-time code to `email`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OtpRequest {
    pub email: String,
}

impl OtpRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_email(&self.email)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

impl VerifyOtpRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_email(&self.email)?;
        if self.otp.trim().is_empty() {
            return Err("enter the OTP".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub new_password: String,
}

impl ResetPasswordRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_email(&self.email)?;
        validate_new_password(&self.new_password)
    }
}

/// New passwords need 8+ characters, an uppercase letter, a symbol and a letter or digit.
pub fn validate_new_password(password: &str) -> Result<(), String> {
    let strong = password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
        && password.chars().any(|c| c.is_ascii_alphanumeric());
    if strong {
        Ok(())
    } else {
        Err("password must include 1 uppercase, 1 symbol, and 8+ characters".to_string())
    }
}

fn require_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("please enter your email".to_string());
    }
    Ok(())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_maps_to_session() {
        let raw = r#"{
            "token": "jwt",
            "user": { "_id": "65f0", "username": "raju", "role": "user", "email": "r@x.in" }
        }"#;
        let response: LoginResponse = serde_json::from_str(raw).expect("parse");
        assert_eq!(
            response.into_session(),
            SessionRecord::new("jwt", "65f0", "raju", Role::User)
        );
    }

    #[test]
    fn profile_defaults_missing_fields() {
        let envelope: UserEnvelope =
            serde_json::from_str(r#"{"user":{"username":"raju"}}"#).expect("parse");
        assert_eq!(envelope.user.wallet_balance, 0.0);
        assert_eq!(envelope.user.upi, None);
    }

    #[test]
    fn match_time_accepts_numbers_and_strings() {
        let list: MatchList = serde_json::from_str(
            r#"{"matches":[
                {"_id":"1","matchName":"Erangel","matchTime":1700000000,"entryFee":50},
                {"_id":"2","matchName":"Miramar","matchTime":"2025-01-10T13:00:00Z"},
                {"_id":"3","matchName":"Sanhok"}
            ]}"#,
        )
        .expect("parse");

        assert_eq!(list.matches[0].match_time.as_deref(), Some("1700000000"));
        assert_eq!(list.matches[0].entry_fee, 50.0);
        assert_eq!(
            list.matches[1].match_time.as_deref(),
            Some("2025-01-10T13:00:00Z")
        );
        assert_eq!(list.matches[2].match_time, None);
    }

    #[test]
    fn join_request_serializes_backend_field_names() {
        let request = JoinRequest {
            user_id: "u1".into(),
            team_name: "Wolves".into(),
            players: vec![Player {
                player_name: "raju".into(),
                in_game_id: "5123".into(),
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).expect("serialize"),
            serde_json::json!({
                "userId": "u1",
                "teamName": "Wolves",
                "players": [{"playerName": "raju", "inGameId": "5123"}],
            })
        );
    }

    #[test]
    fn join_request_checks_roster() {
        let player = |name: &str| Player {
            player_name: name.into(),
            in_game_id: format!("id-{name}"),
        };
        let mut request = JoinRequest {
            user_id: "u1".into(),
            team_name: "Wolves".into(),
            players: vec![player("a"), player("b")],
        };
        assert!(request.validate(MatchMode::Duo).is_ok());
        assert!(request.validate(MatchMode::Squad).is_err());

        request.team_name = " ".into();
        assert_eq!(
            request.validate(MatchMode::Duo),
            Err("team name is required".to_string())
        );

        request.team_name = "Wolves".into();
        request.players[1].in_game_id.clear();
        assert!(request.validate(MatchMode::Duo).is_err());
    }

    #[test]
    fn room_credentials_are_optional() {
        let list: MatchList = serde_json::from_str(
            r#"{"matches":[
                {"_id":"1","matchName":"Erangel","roomId":"239874","password":"BGMI@123"},
                {"_id":"2","matchName":"Livik"}
            ]}"#,
        )
        .expect("parse");

        assert_eq!(list.matches[0].room_id.as_deref(), Some("239874"));
        assert_eq!(list.matches[0].room_password.as_deref(), Some("BGMI@123"));
        assert_eq!(list.matches[1].room_id, None);
    }

    #[test]
    fn password_reset_bodies_use_backend_field_names() {
        let otp = OtpRequest {
            email: "r@x.in".into(),
        };
        assert_eq!(
            serde_json::to_value(&otp).expect("serialize"),
            serde_json::json!({ "email": "r@x.in" })
        );

        let verify = VerifyOtpRequest {
            email: "r@x.in".into(),
            otp: "482913".into(),
        };
        assert_eq!(
            serde_json::to_value(&verify).expect("serialize"),
            serde_json::json!({ "email": "r@x.in", "otp": "482913" })
        );

        let reset = ResetPasswordRequest {
            email: "r@x.in".into(),
            new_password: "Battle#2025".into(),
        };
        assert_eq!(
            serde_json::to_value(&reset).expect("serialize"),
            serde_json::json!({ "email": "r@x.in", "newPassword": "Battle#2025" })
        );
    }

    #[test]
    fn password_reset_steps_require_their_fields() {
        assert!(OtpRequest { email: " ".into() }.validate().is_err());
        assert_eq!(
            VerifyOtpRequest {
                email: "r@x.in".into(),
                otp: String::new(),
            }
            .validate(),
            Err("enter the OTP".to_string())
        );
        assert!(ResetPasswordRequest {
            email: "r@x.in".into(),
            new_password: "Battle#2025".into(),
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn new_password_needs_uppercase_symbol_and_length() {
        assert!(validate_new_password("Battle#2025").is_ok());
        assert!(validate_new_password("Ab-defgh").is_ok());
        assert!(validate_new_password("battle#2025").is_err());
        assert!(validate_new_password("Battle2025").is_err());
        assert!(validate_new_password("Bat#1").is_err());
    }

    #[test]
    fn withdraw_validation_mirrors_wallet_form() {
        let request = |amount: f64, upi: &str| WithdrawRequest {
            user_id: "u1".into(),
            amount,
            upi_id: upi.into(),
        };

        assert!(request(100.0, "raju@upi").validate(100.0).is_ok());
        assert_eq!(
            request(100.0, "").validate(500.0),
            Err("set a UPI id before withdrawing".to_string())
        );
        assert!(request(0.0, "raju@upi").validate(500.0).is_err());
        assert!(request(f64::NAN, "raju@upi").validate(500.0).is_err());
        assert_eq!(
            request(600.0, "raju@upi").validate(500.0),
            Err("insufficient balance".to_string())
        );
    }
}

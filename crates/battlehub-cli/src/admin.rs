use battlehub_core::{prize::PrizePlan, session::SessionRecord, storage::StorageBackend};
use battlehub_session::{
    balance::{credit_wallet, wallet_balance},
    SessionGate,
};
use color_eyre::Result;

use crate::{cli::AdminCommand, wallet::require_session};

pub fn run<B: StorageBackend>(gate: &SessionGate<B>, command: AdminCommand) -> Result<String> {
    require_admin(gate)?;
    let line = match command {
        AdminCommand::Approve { user_id, amount } => {
            if amount.is_nan() || amount <= 0.0 {
                color_eyre::eyre::bail!("approved amount must be positive");
            }
            let updated = credit_wallet(gate.store(), &user_id, amount);
            format!("Approved Rs.{amount:.2} for {user_id}; new balance Rs.{updated:.2}")
        }
        AdminCommand::Balance { user_id } => {
            let balance = wallet_balance(gate.store(), &user_id);
            format!("{user_id}: Rs.{balance:.2}")
        }
        AdminCommand::Prize {
            pool,
            ranks,
            highest_kill,
        } => {
            if pool < 0 || highest_kill < 0 {
                color_eyre::eyre::bail!("prize amounts cannot be negative");
            }
            describe_plan(&PrizePlan::auto(pool, ranks, highest_kill))
        }
    };
    Ok(line)
}

fn require_admin<B: StorageBackend>(gate: &SessionGate<B>) -> Result<SessionRecord> {
    let session = require_session(gate)?;
    if !session.is_admin() {
        color_eyre::eyre::bail!("admin tools need an admin session");
    }
    Ok(session)
}

fn describe_plan(plan: &PrizePlan) -> String {
    let ranks = plan
        .ranks
        .iter()
        .enumerate()
        .map(|(i, amount)| format!("#{}: Rs.{amount}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let remaining = if plan.is_over_allocated() {
        format!("over by Rs.{}", -plan.remaining())
    } else {
        format!("remaining Rs.{}", plan.remaining())
    };
    format!(
        "Pool Rs.{} | {ranks} | highest kill Rs.{} | distributed Rs.{}, {remaining}",
        plan.prize_pool,
        plan.highest_kill,
        plan.distributed()
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use battlehub_core::{session::Role, storage::InMemoryStorage};
    use battlehub_session::RecordingNavigator;
    use battlehub_storage::{encrypted_store::EncryptedStore, secret::AppSecret};

    use super::*;

    fn gate(role: Option<Role>) -> SessionGate<InMemoryStorage> {
        let store =
            EncryptedStore::new(InMemoryStorage::new(), &AppSecret::new("a")).expect("store");
        let gate = SessionGate::new(Arc::new(store), Arc::new(RecordingNavigator::new()));
        if let Some(role) = role {
            gate.login(&SessionRecord::new("t", "a1", "root", role));
        }
        gate
    }

    #[test]
    fn approvals_credit_the_users_wallet() {
        let gate = gate(Some(Role::Admin));
        let approve = |amount| AdminCommand::Approve {
            user_id: "u001".into(),
            amount,
        };

        assert_eq!(
            run(&gate, approve(150.0)).expect("approve"),
            "Approved Rs.150.00 for u001; new balance Rs.150.00"
        );
        run(&gate, approve(100.0)).expect("approve");
        assert_eq!(
            run(
                &gate,
                AdminCommand::Balance {
                    user_id: "u001".into()
                }
            )
            .expect("balance"),
            "u001: Rs.250.00"
        );
        assert!(run(&gate, approve(-5.0)).is_err());
    }

    #[test]
    fn admin_tools_reject_other_callers() {
        let command = AdminCommand::Balance {
            user_id: "u001".into(),
        };
        let err = run(&gate(Some(Role::User)), command.clone()).expect_err("user");
        assert!(err.to_string().contains("admin session"));

        let err = run(&gate(None), command).expect_err("anonymous");
        assert!(err.to_string().contains("not signed in"));
    }

    #[test]
    fn prize_split_reports_remaining_pool() {
        let gate = gate(Some(Role::Admin));
        let line = run(
            &gate,
            AdminCommand::Prize {
                pool: 500,
                ranks: 5,
                highest_kill: 0,
            },
        )
        .expect("prize");
        assert_eq!(
            line,
            "Pool Rs.500 | #1: Rs.200, #2: Rs.125, #3: Rs.75, #4: Rs.50, #5: Rs.50 \
             | highest kill Rs.0 | distributed Rs.500, remaining Rs.0"
        );

        let line = run(
            &gate,
            AdminCommand::Prize {
                pool: 300,
                ranks: 3,
                highest_kill: 20,
            },
        )
        .expect("prize");
        assert!(line.ends_with("distributed Rs.320, over by Rs.20"));
    }
}

//! Prize pool distribution for completed matches.

use serde::{Deserialize, Serialize};

/// Share of the pool per rank for the common podium sizes.
const TOP_THREE: [f64; 3] = [0.5, 0.3, 0.2];
const TOP_FIVE: [f64; 5] = [0.4, 0.25, 0.15, 0.1, 0.1];

/// Split `pool` across `rank_count` ranks, rounding each share to whole rupees.
///
/// Three ranks get 50/30/20, five get 40/25/15/10/10, any other count splits
/// evenly. Rounding is per rank, so the sum may differ from `pool` by a few rupees.
pub fn auto_split(pool: i64, rank_count: usize) -> Vec<i64> {
    let shares: Vec<f64> = match rank_count {
        3 => TOP_THREE.to_vec(),
        5 => TOP_FIVE.to_vec(),
        n => vec![1.0 / n as f64; n],
    };
    shares
        .into_iter()
        .map(|share| (pool as f64 * share + 0.5).floor() as i64)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizePlan {
    pub prize_pool: i64,
    /// Prize for rank `i + 1`.
    pub ranks: Vec<i64>,
    #[serde(default)]
    pub highest_kill: i64,
}

impl PrizePlan {
    pub fn auto(prize_pool: i64, rank_count: usize, highest_kill: i64) -> Self {
        Self {
            prize_pool,
            ranks: auto_split(prize_pool, rank_count),
            highest_kill,
        }
    }

    /// Rank prizes plus the highest-kill bonus.
    pub fn distributed(&self) -> i64 {
        self.ranks.iter().sum::<i64>() + self.highest_kill
    }

    /// Pool left after distribution; negative when over-allocated.
    pub fn remaining(&self) -> i64 {
        self.prize_pool - self.distributed()
    }

    pub fn is_over_allocated(&self) -> bool {
        self.remaining() < 0
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One leaderboard entry for a month, built from a user's best-score
/// document. The avatar fields ride along so the site can render the
/// podium without another lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    pub user_id: String,
    pub display_name: String,
    pub score: i64,
    pub execution_time: f64,
    pub memory: i64,
    pub hair_color: i64,
    pub skin_color: i64,
    pub top_color: i64,
    pub accessory: i64,
}

/// The per-month document keyed by `month`, fully replaced on re-run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyWinnersRecord {
    pub month: String,
    pub winners: Vec<Winner>,
    pub saved_at: DateTime<Utc>,
    pub total_winners: usize,
}

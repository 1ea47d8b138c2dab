//! Monthly winners aggregation: scan every user's best score for the target
//! month, rank the top 3 and upsert the monthly record.

use anyhow::{bail, Context};
use chrono::{DateTime, Datelike, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::backup;
use crate::codec::{self, Document};
use crate::firestore::Client;
use crate::models::{MonthlyWinnersRecord, Winner};

/// Per-user score lookups fan out this wide; completion order never affects
/// the ranking because the stream yields results in enumeration order.
const SCORE_LOOKUP_CONCURRENCY: usize = 8;

const PODIUM_SIZE: usize = 3;

/// Previous calendar month relative to `now`, as YYYY-MM.
pub fn target_month(now: DateTime<Utc>) -> String {
    let (year, month) = if now.month() == 1 {
        (now.year() - 1, 12)
    } else {
        (now.year(), now.month() - 1)
    };
    format!("{year:04}-{month:02}")
}

/// Collects the top winners for `month`. Listing failures make the whole
/// result empty; a missing or broken score record only drops that one user.
pub async fn fetch_winners(client: &Client, month: &str) -> Vec<Winner> {
    info!("fetching winners for {month}");
    let users = match client.list_users().await {
        Ok(users) => users,
        Err(err) => {
            warn!("could not list users: {err:#}");
            return Vec::new();
        }
    };
    if users.is_empty() {
        warn!("no users found");
        return Vec::new();
    }
    debug!("checking best scores of {} users", users.len());

    let candidates = stream::iter(users)
        .map(|user| async move { lookup_winner(client, user, month).await })
        .buffered(SCORE_LOOKUP_CONCURRENCY)
        .filter_map(|winner| async move { winner })
        .collect::<Vec<_>>()
        .await;
    select_top(candidates)
}

async fn lookup_winner(client: &Client, user: Document, month: &str) -> Option<Winner> {
    let user_id = user.id()?.to_owned();
    let score_doc = match client.get_best_score(&user_id, month).await {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            debug!("no {month} score for {user_id}");
            return None;
        }
        Err(err) => {
            warn!("skipping {user_id}: {err:#}");
            return None;
        }
    };
    match codec::decode_winner(&user_id, &score_doc.fields) {
        Ok(winner) => Some(winner),
        Err(err) => {
            warn!("skipping {user_id}: {err:#}");
            None
        }
    }
}

/// Drops non-positive scores, ranks descending and keeps the podium. The
/// sort is stable, so ties keep their original enumeration order.
fn select_top(candidates: Vec<Winner>) -> Vec<Winner> {
    let mut ranked: Vec<Winner> = candidates
        .into_iter()
        .filter(|winner| winner.score > 0)
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(PODIUM_SIZE);
    ranked
}

pub fn build_record(
    month: &str,
    winners: Vec<Winner>,
    saved_at: DateTime<Utc>,
) -> MonthlyWinnersRecord {
    let total_winners = winners.len();
    MonthlyWinnersRecord {
        month: month.to_owned(),
        winners,
        saved_at,
        total_winners,
    }
}

/// Upserts the monthly record. Re-running for the same month fully replaces
/// the previous document. A backup JSON lands next to the working directory
/// on success; failing to write it is only a warning.
pub async fn persist_winners(
    client: &Client,
    month: &str,
    winners: Vec<Winner>,
) -> anyhow::Result<MonthlyWinnersRecord> {
    if winners.is_empty() {
        bail!("no winners to save for {month}");
    }
    info!("saving {} winners for {month}", winners.len());

    let record = build_record(month, winners, Utc::now());
    let document = codec::encode_winners_record(&record);
    client
        .put_monthly_winners(month, &document)
        .await
        .with_context(|| format!("could not save winners for {month}"))?;

    let backup_name = format!("monthly-winners-{month}.json");
    match backup::write(&backup_name, &record) {
        Ok(()) => println!("Backup saved to {backup_name}"),
        Err(err) => warn!("could not write backup {backup_name}: {err:#}"),
    }
    Ok(record)
}

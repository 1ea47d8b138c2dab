use anyhow::{bail, Context};
use chrono::Utc;
use tracing::info;

use crate::auth::{self, AuthMode};
use crate::firestore::Client;
use crate::models::{AdminConfig, Challenge};
use crate::{uploader, winners};

/// Aggregates the top 3 winners for the target month and saves the monthly
/// record. Runs are idempotent: repeating a month overwrites the document.
pub async fn winners(month: Option<String>, config_path: &str) -> anyhow::Result<()> {
    let config = AdminConfig::load(config_path)?;
    let month = month.unwrap_or_else(|| winners::target_month(Utc::now()));
    println!("Target month: {month}");

    // Winner aggregation reads and writes public data, API key is enough.
    let client = Client::new(&config.project_id, AuthMode::ApiKey(config.api_key.clone()))?;

    let winners = winners::fetch_winners(&client, &month).await;
    if winners.is_empty() {
        bail!("no winners found for {month}");
    }
    println!("Found {} winners:", winners.len());
    for (place, winner) in winners.iter().enumerate() {
        println!(
            "  {}. {} - {} pts",
            place + 1,
            winner.display_name,
            winner.score
        );
    }

    let record = winners::persist_winners(&client, &month, winners).await?;
    println!(
        "Saved {} winners for {}",
        record.total_winners, record.month
    );
    Ok(())
}

/// Uploads the monthly challenge defined in the config file, after a
/// preview and confirmation prompt.
pub async fn upload(config_path: &str, assume_yes: bool) -> anyhow::Result<()> {
    let config = AdminConfig::load(config_path)?;
    let challenge_config = config
        .challenge
        .as_ref()
        .with_context(|| format!("no [challenge] section in {config_path}"))?;
    let challenge = uploader::build_challenge(challenge_config, Utc::now());

    print_preview(&challenge);
    if !assume_yes {
        let confirmed = inquire::Confirm::new("Upload this challenge?")
            .with_default(false)
            .prompt()?;
        if !confirmed {
            println!("Upload cancelled.");
            return Ok(());
        }
    }

    let auth = auth::resolve(&config).await;
    match &auth {
        AuthMode::Bearer(_) => info!("authenticating with a bearer token"),
        AuthMode::ApiKey(_) => info!("authenticating with the API key"),
    }
    let client = Client::new(&config.project_id, auth)?;

    uploader::upload(&client, &challenge).await?;
    println!(
        "Challenge \"{}\" ({}) is now live.",
        challenge.title, challenge.id
    );
    Ok(())
}

fn print_preview(challenge: &Challenge) {
    println!("Challenge preview");
    println!("  id:           {}", challenge.id);
    println!("  title:        {}", challenge.title);
    println!("  difficulty:   {}", challenge.difficulty);
    println!("  time limit:   {} s", challenge.time_limit);
    println!("  memory limit: {} KB", challenge.memory_limit);
    println!("  test cases:   {}", challenge.test_cases.len());
    println!(
        "  languages:    {}",
        challenge
            .starter_code
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    );
}

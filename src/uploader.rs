//! Challenge upload: assemble the monthly challenge from config and upsert
//! it as a challenge document.

use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::backup;
use crate::codec;
use crate::firestore::Client;
use crate::models::{Challenge, ChallengeConfig, TestCase};

/// Pure assembly, no I/O. The challenge goes live immediately.
pub fn build_challenge(config: &ChallengeConfig, now: DateTime<Utc>) -> Challenge {
    Challenge {
        id: config.id.clone(),
        title: config.title.clone(),
        description: config.description.clone(),
        test_cases: config
            .test_cases
            .iter()
            .map(|tc| TestCase {
                name: tc.name.clone(),
                input: tc.input.clone(),
                expected_output: tc.expected_output.clone(),
            })
            .collect(),
        starter_code: config.starter_code.clone(),
        difficulty: config.difficulty.clone(),
        time_limit: config.time_limit,
        memory_limit: config.memory_limit,
        created_at: now,
        active: true,
    }
}

/// Upserts the challenge document. The backup JSON is written whether the
/// upsert succeeded or not: on failure it is the manual-recovery copy.
pub async fn upload(client: &Client, challenge: &Challenge) -> anyhow::Result<()> {
    info!("uploading challenge {}", challenge.id);
    let document = codec::encode_challenge(challenge);
    let result = client.put_challenge(&challenge.id, &document).await;

    let backup_name = format!("challenge-{}.json", challenge.id);
    match backup::write(&backup_name, challenge) {
        Ok(()) => println!("Backup saved to {backup_name}"),
        Err(err) => warn!("could not write backup {backup_name}: {err:#}"),
    }

    result
        .map(|_| ())
        .with_context(|| format!("could not upload challenge {}", challenge.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestCaseConfig;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample_config() -> ChallengeConfig {
        ChallengeConfig {
            id: "2025-09".to_owned(),
            title: "First Missing Positive".to_owned(),
            description: "Return the smallest missing positive integer.".to_owned(),
            difficulty: "Medium".to_owned(),
            time_limit: 5,
            memory_limit: 128000,
            test_cases: vec![
                TestCaseConfig {
                    name: "Example 1".to_owned(),
                    input: "[1,2,0]".to_owned(),
                    expected_output: "3".to_owned(),
                },
                TestCaseConfig {
                    name: "All negatives".to_owned(),
                    input: "[-1,-2,-3]".to_owned(),
                    expected_output: "1".to_owned(),
                },
            ],
            starter_code: [
                ("python".to_owned(), "pass".to_owned()),
                ("java".to_owned(), "return 1;".to_owned()),
            ]
            .into(),
        }
    }

    #[test]
    fn build_copies_config_fields_verbatim() {
        let now = Utc.with_ymd_and_hms(2025, 8, 26, 12, 0, 0).unwrap();
        let challenge = build_challenge(&sample_config(), now);

        assert_eq!(challenge.id, "2025-09");
        assert_eq!(challenge.title, "First Missing Positive");
        assert_eq!(challenge.test_cases.len(), 2);
        assert_eq!(challenge.test_cases[1].expected_output, "1");
        assert_eq!(challenge.starter_code["java"], "return 1;");
        assert_eq!(challenge.time_limit, 5);
        assert_eq!(challenge.memory_limit, 128000);
        assert_eq!(challenge.created_at, now);
        assert!(challenge.active);
    }

    #[test]
    fn backup_json_uses_the_site_field_names() {
        let now = Utc.with_ymd_and_hms(2025, 8, 26, 12, 0, 0).unwrap();
        let challenge = build_challenge(&sample_config(), now);
        let json = serde_json::to_value(&challenge).unwrap();

        assert!(json.get("testCases").is_some());
        assert!(json.get("starterCode").is_some());
        assert!(json.get("timeLimit").is_some());
        assert_eq!(json["testCases"][0]["expectedOutput"], "3");
    }
}

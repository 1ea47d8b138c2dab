use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub description: String,
    pub test_cases: Vec<TestCase>,
    pub starter_code: BTreeMap<String, String>,
    pub difficulty: String,
    /// Seconds.
    pub time_limit: u32,
    /// Kilobytes.
    pub memory_limit: u32,
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub name: String,
    pub input: String,
    pub expected_output: String,
}

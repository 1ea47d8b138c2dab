use std::path::{Path, PathBuf};

use anyhow::Context;
use config::Config;
use serde::Deserialize;

/// Everything the admin commands need, loaded from one TOML file so runs
/// never depend on constants edited in place.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub project_id: String,
    pub api_key: String,
    /// Path to a service account key file. `GOOGLE_APPLICATION_CREDENTIALS`
    /// is consulted as a fallback when this is unset.
    pub service_account_path: Option<PathBuf>,
    pub challenge: Option<ChallengeConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeConfig {
    /// Document id, YYYY-MM.
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub time_limit: u32,
    pub memory_limit: u32,
    pub test_cases: Vec<TestCaseConfig>,
    pub starter_code: std::collections::BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestCaseConfig {
    pub name: String,
    pub input: String,
    pub expected_output: String,
}

impl AdminConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        Config::builder()
            .add_source(config::File::from(path.to_owned()))
            .build()
            .with_context(|| format!("could not read config file {}", path.display()))?
            .try_deserialize::<AdminConfig>()
            .context("could not deserialize admin config")
    }
}

mod challenge;
mod config;
mod winner;

pub use challenge::{Challenge, TestCase};
pub use config::{AdminConfig, ChallengeConfig, TestCaseConfig};
pub use winner::{MonthlyWinnersRecord, Winner};

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

/// Writes the plain (undecoded) record as pretty JSON. Used as an audit
/// trail on success and a manual-recovery artifact on failure.
pub fn write<T: Serialize>(path: impl AsRef<Path>, record: &T) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("could not create backup file {}", path.display()))?;
    serde_json::to_writer_pretty(file, record)
        .with_context(|| format!("could not write backup file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("challenge-2025-09.json");
        write(&path, &serde_json::json!({"title": "t"})).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\n  \"title\": \"t\"\n}");
    }

    #[test]
    fn unwritable_path_is_an_error() {
        assert!(write("/nonexistent/dir/backup.json", &serde_json::json!({})).is_err());
    }
}

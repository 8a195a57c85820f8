//! JSON file helpers.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Reads and parses a JSON file.
pub fn read_json_file<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON from file: {}", path.display()))
}

/// Serializes `data` as JSON and writes it atomically.
pub fn write_json_file<T>(path: &Path, data: &T, pretty: bool) -> Result<()>
where
    T: serde::Serialize,
{
    let json = if pretty {
        serde_json::to_string_pretty(data)?
    } else {
        serde_json::to_string(data)?
    };

    super::atomic::safe_write(path, &json)
        .with_context(|| format!("Failed to write JSON file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_json_write_then_read() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("sample.json");
        let sample = Sample {
            name: "gopm".to_string(),
            count: 3,
        };

        write_json_file(&path, &sample, true).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n"), "pretty output spans lines");

        let read: Sample = read_json_file(&path).unwrap();
        assert_eq!(read, sample);
    }

    #[test]
    fn test_read_json_corrupt() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        let error = read_json_file::<Sample>(&path).unwrap_err();
        assert!(error.to_string().contains("Failed to parse JSON"));
    }
}

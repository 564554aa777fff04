//! One JSON file per persisted key.
//!
//! Each field of the store state is written independently; a crash between
//! two writes can leave the fields inconsistent until the next full save.
//! Reads fail open: an absent or malformed file yields `None` and the caller
//! substitutes its default.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// Read a persisted blob, or `None` when the file is absent or malformed.
pub(crate) fn read_json<T: DeserializeOwned>(dir: &Path, name: &str) -> Option<T> {
    let path = dir.join(name);
    let content = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "ignoring malformed blob");
            None
        }
    }
}

/// Write a persisted blob.
pub(crate) fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(dir.join(name), content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        write_json(dir.path(), "value.json", &vec![1u32, 2, 3]).unwrap();
        let back: Vec<u32> = read_json(dir.path(), "value.json").unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }

    #[test]
    fn absent_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let value: Option<Vec<u32>> = read_json(dir.path(), "missing.json");
        assert!(value.is_none());
    }

    #[test]
    fn malformed_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        let value: Option<Vec<u32>> = read_json(dir.path(), "bad.json");
        assert!(value.is_none());
    }
}

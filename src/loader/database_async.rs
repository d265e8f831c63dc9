//! Async loading of a card database split across files
//!
//! Every `*.json` file in a directory is read concurrently; the records are
//! merged in file-name order and the union is validated as one database, so
//! duplicate ids or names across files are caught.

use crate::actions::ActionRegistry;
use crate::loader::CardDatabase;
use crate::{DuelError, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::time::Instant;

/// `*.json` files directly inside `dir`, sorted by name
async fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
        if is_json && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

async fn read_records(path: PathBuf) -> Result<Vec<Value>> {
    let contents = tokio::fs::read_to_string(&path).await?;
    match serde_json::from_str(&contents)? {
        Value::Array(records) => Ok(records),
        _ => Err(DuelError::InvalidCardFormat(format!(
            "'{}' is not a JSON array of cards",
            path.display()
        ))),
    }
}

/// Load and validate every card file in `dir`
///
/// Returns the database with the time it took.
pub async fn load_directory(
    dir: &Path,
    registry: &ActionRegistry,
) -> Result<(CardDatabase, std::time::Duration)> {
    let start = Instant::now();
    if !dir.is_dir() {
        return Err(DuelError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("card directory not found: {}", dir.display()),
        )));
    }

    let files = json_files(dir).await?;
    let tasks: Vec<_> = files
        .into_iter()
        .map(|path| tokio::spawn(read_records(path)))
        .collect();

    // Joined in spawn order, which keeps the merge deterministic
    let mut merged = Vec::new();
    for task in tasks {
        merged.extend(task.await??);
    }

    let db = CardDatabase::from_value(Value::Array(merged), registry)?;
    Ok((db, start.elapsed()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("duel-engine-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_records(dir: &Path, file: &str, json: &str) {
        std::fs::write(dir.join(file), json).unwrap();
    }

    #[tokio::test]
    async fn test_loads_and_merges_files() {
        let dir = scratch_dir("merge");
        write_records(&dir, "a.json", r#"[{"id": 1, "name": "Alpha", "cardKind": "monster"}]"#);
        write_records(&dir, "b.json", r#"[{"id": 2, "name": "Beta", "cardKind": "spell"}]"#);
        std::fs::write(dir.join("notes.txt"), "not cards").unwrap();

        let (db, _) = load_directory(&dir, &ActionRegistry::with_builtins()).await.unwrap();
        assert_eq!(db.len(), 2);
        assert!(db.contains("alpha"));
        assert!(db.contains("beta"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_duplicates_across_files_are_rejected() {
        let dir = scratch_dir("dupes");
        write_records(&dir, "a.json", r#"[{"id": 1, "name": "Alpha", "cardKind": "monster"}]"#);
        write_records(&dir, "b.json", r#"[{"id": 1, "name": "Gamma", "cardKind": "monster"}]"#);

        let result = load_directory(&dir, &ActionRegistry::with_builtins()).await;
        assert!(matches!(result, Err(DuelError::Validation(_))));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let registry = ActionRegistry::with_builtins();
        let result = load_directory(Path::new("/nonexistent/cards"), &registry).await;
        assert!(matches!(result, Err(DuelError::IoError(_))));
    }
}

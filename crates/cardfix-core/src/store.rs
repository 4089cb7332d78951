//! The canonical card store: a JSON array of card objects
//!
//! Both the backup and the rewritten store are written to a temporary
//! sibling first and renamed into place, so an interrupted run never leaves
//! a truncated file behind.

use crate::card::Card;
use crate::error::{Error, Result};
use serde_json::Value;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Suffix appended to the store's file name for its backup
pub const BACKUP_SUFFIX: &str = ".backup";

const TEMP_SUFFIX: &str = ".tmp";

/// Handle to a canonical store file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardStore {
    path: PathBuf,
}

impl CardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fixed backup location, e.g. `cards.json` -> `cards.json.backup`
    pub fn backup_path(&self) -> PathBuf {
        with_suffix(&self.path, BACKUP_SUFFIX)
    }

    /// Read and validate the whole store
    pub fn load(&self) -> Result<Vec<Card>> {
        let content = fs::read_to_string(&self.path).map_err(|e| Error::FileRead {
            path: self.path.clone(),
            source: e,
        })?;
        let cards = parse_cards_str(&content, &self.path)?;
        info!(path = %self.path.display(), cards = cards.len(), "loaded card store");
        Ok(cards)
    }

    /// Write the pre-merge collection to the backup path, replacing any
    /// previous backup
    pub fn write_backup(&self, cards: &[Card]) -> Result<PathBuf> {
        let backup = self.backup_path();
        write_cards_atomic(&backup, cards)?;
        info!(path = %backup.display(), "wrote backup");
        Ok(backup)
    }

    /// Replace the store's contents
    pub fn save(&self, cards: &[Card]) -> Result<()> {
        write_cards_atomic(&self.path, cards)?;
        info!(path = %self.path.display(), cards = cards.len(), "saved card store");
        Ok(())
    }
}

/// Parse a store from a string, requiring every entry to be an object with
/// an integer id
pub fn parse_cards_str(content: &str, path: &Path) -> Result<Vec<Card>> {
    let invalid = |message: String| Error::InvalidStore {
        path: path.to_path_buf(),
        message,
    };

    let Value::Array(entries) = serde_json::from_str::<Value>(content)? else {
        return Err(invalid("expected a JSON array of cards".to_string()));
    };

    let mut cards = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let Value::Object(map) = entry else {
            return Err(invalid(format!("entry {} is not an object", index)));
        };
        let card = Card::from_map(map);
        if card.id().is_none() {
            return Err(Error::InvalidCardId {
                path: path.to_path_buf(),
                index,
            });
        }
        cards.push(card);
    }

    Ok(cards)
}

/// Serialize cards as 2-space indented JSON
pub fn to_json_pretty(cards: &[Card]) -> Result<String> {
    Ok(serde_json::to_string_pretty(cards)?)
}

fn write_cards_atomic(path: &Path, cards: &[Card]) -> Result<()> {
    let write_err = |e: std::io::Error| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    };

    let json = to_json_pretty(cards)?;
    let tmp = with_suffix(path, TEMP_SUFFIX);
    {
        let file = File::create(&tmp).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(json.as_bytes()).map_err(write_err)?;
        let file = writer.into_inner().map_err(|e| write_err(e.into_error()))?;
        file.sync_all().map_err(write_err)?;
    }
    fs::rename(&tmp, path).map_err(write_err)?;
    Ok(())
}

/// Append a suffix to the file name, keeping the existing extension
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_backup_path() {
        let store = CardStore::new("src/data/cards.json");
        assert_eq!(store.backup_path(), PathBuf::from("src/data/cards.json.backup"));
    }

    #[test]
    fn test_parse_cards_rejects_non_array() {
        let err = parse_cards_str(r#"{"id": 1}"#, Path::new("cards.json")).unwrap_err();
        assert!(matches!(err, Error::InvalidStore { .. }));
    }

    #[test]
    fn test_parse_cards_rejects_missing_id() {
        let err = parse_cards_str(r#"[{"id": 1}, {"name": "x"}]"#, Path::new("cards.json"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCardId { index: 1, .. }));
    }

    #[test]
    fn test_parse_cards_rejects_bad_json() {
        let err = parse_cards_str("[{", Path::new("cards.json")).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_save_and_load_keeps_key_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cards.json");
        fs::write(
            &path,
            r#"[{"name": "Uraby", "id": 301, "type": "Monster", "attr": "EARTH"}]"#,
        )
        .unwrap();

        let store = CardStore::new(&path);
        let cards = store.load().unwrap();
        store.save(&cards).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let name_pos = written.find("\"name\"").unwrap();
        let id_pos = written.find("\"id\"").unwrap();
        assert!(name_pos < id_pos);
        assert!(written.contains("\n  {\n    \"name\": \"Uraby\""));
        assert!(!with_suffix(&path, TEMP_SUFFIX).exists());
    }

    #[test]
    fn test_backup_matches_original() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cards.json");
        let original = json!([
            {"id": 1, "name": "Blue-eyes White Dragon", "type": "Monster", "atk": 3000},
            {"id": 2, "name": "Mystical Elf", "type": "Monster", "atk": 800}
        ]);
        fs::write(&path, original.to_string()).unwrap();

        let store = CardStore::new(&path);
        let cards = store.load().unwrap();
        let backup = store.write_backup(&cards).unwrap();

        let restored: Value = serde_json::from_str(&fs::read_to_string(backup).unwrap()).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_backup_overwrites_previous() {
        let dir = tempdir().unwrap();
        let store = CardStore::new(dir.path().join("cards.json"));
        fs::write(store.backup_path(), "stale").unwrap();

        let cards = parse_cards_str(r#"[{"id": 1}]"#, store.path()).unwrap();
        store.write_backup(&cards).unwrap();

        let backup = fs::read_to_string(store.backup_path()).unwrap();
        assert!(backup.contains("\"id\": 1"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let store = CardStore::new(dir.path().join("missing.json"));
        assert!(matches!(store.load(), Err(Error::FileRead { .. })));
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::DuplicatePolicy;
use crate::error::{PolyglotError, Result};

/// One record of the language file: a display name and its FLORES-200 code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    #[serde(rename = "Language")]
    pub name: String,
    #[serde(rename = "FLORES-200 code")]
    pub code: String,
}

/// Immutable display-name to code lookup, ordered by name
#[derive(Debug, Clone)]
pub struct LanguageTable {
    codes: BTreeMap<String, String>,
}

impl LanguageTable {
    /// Load the table from a JSON array of language records
    pub fn load<P: AsRef<Path>>(path: P, policy: DuplicatePolicy) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading language table from {}", path.display());

        let content = std::fs::read_to_string(path)
            .map_err(|e| PolyglotError::Load(format!("{}: {}", path.display(), e)))?;

        let table = Self::from_json_str(&content, policy)
            .map_err(|e| match e {
                PolyglotError::Load(msg) => PolyglotError::Load(format!("{}: {}", path.display(), msg)),
                other => other,
            })?;

        info!("Loaded {} languages from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn from_json_str(content: &str, policy: DuplicatePolicy) -> Result<Self> {
        let entries: Vec<LanguageEntry> = serde_json::from_str(content)
            .map_err(|e| PolyglotError::Load(format!("malformed language file: {}", e)))?;
        Self::from_entries(entries, policy)
    }

    pub fn from_entries<I>(entries: I, policy: DuplicatePolicy) -> Result<Self>
    where
        I: IntoIterator<Item = LanguageEntry>,
    {
        let mut codes = BTreeMap::new();

        for entry in entries {
            if let Some(previous) = codes.get(&entry.name) {
                match policy {
                    DuplicatePolicy::Reject => {
                        return Err(PolyglotError::Load(format!(
                            "duplicate language name '{}'", entry.name
                        )));
                    }
                    DuplicatePolicy::LastWins => {
                        warn!(
                            "Duplicate language name '{}': replacing {} with {}",
                            entry.name, previous, entry.code
                        );
                    }
                }
            }
            codes.insert(entry.name, entry.code);
        }

        if codes.is_empty() {
            return Err(PolyglotError::Load("language table is empty".to_string()));
        }

        Ok(Self { codes })
    }

    /// Look up the code for a display name
    pub fn resolve_code(&self, name: &str) -> Option<&str> {
        self.codes.get(name).map(String::as_str)
    }

    /// Display names in lexicographic order
    pub fn names(&self) -> Vec<&str> {
        self.codes.keys().map(String::as_str).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.codes.iter().map(|(name, code)| (name.as_str(), code.as_str()))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    const TWO_LANGUAGES: &str = r#"[
        {"Language": "German", "FLORES-200 code": "deu_Latn"},
        {"Language": "French", "FLORES-200 code": "fra_Latn"}
    ]"#;

    fn entry(name: &str, code: &str) -> LanguageEntry {
        LanguageEntry {
            name: name.to_string(),
            code: code.to_string(),
        }
    }

    #[test]
    fn test_load_two_entries() {
        let file = assert_fs::NamedTempFile::new("language.json").unwrap();
        file.write_str(TWO_LANGUAGES).unwrap();

        let table = LanguageTable::load(file.path(), DuplicatePolicy::LastWins).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.resolve_code("French"), Some("fra_Latn"));
        assert_eq!(table.resolve_code("German"), Some("deu_Latn"));
        assert_eq!(table.names(), vec!["French", "German"]);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let json = r#"[{"Language": "Welsh", "FLORES-200 code": "cym_Latn", "Script": "Latin"}]"#;
        let table = LanguageTable::from_json_str(json, DuplicatePolicy::LastWins).unwrap();
        assert_eq!(table.resolve_code("Welsh"), Some("cym_Latn"));
    }

    #[test]
    fn test_resolve_unknown_name_is_none() {
        let table = LanguageTable::from_json_str(TWO_LANGUAGES, DuplicatePolicy::LastWins).unwrap();
        assert_eq!(table.resolve_code("Klingon"), None);
        assert_eq!(table.resolve_code("french"), None);
    }

    #[test]
    fn test_duplicate_last_wins() {
        let table = LanguageTable::from_entries(
            vec![entry("Chinese", "zho_Hans"), entry("Chinese", "zho_Hant")],
            DuplicatePolicy::LastWins,
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.resolve_code("Chinese"), Some("zho_Hant"));
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = LanguageTable::from_entries(
            vec![entry("Chinese", "zho_Hans"), entry("Chinese", "zho_Hant")],
            DuplicatePolicy::Reject,
        )
        .unwrap_err();
        assert!(matches!(err, PolyglotError::Load(ref msg) if msg.contains("Chinese")));
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let dir = assert_fs::TempDir::new().unwrap();
        let err = LanguageTable::load(dir.child("missing.json").path(), DuplicatePolicy::LastWins)
            .unwrap_err();
        assert!(matches!(err, PolyglotError::Load(_)));
    }

    #[test]
    fn test_malformed_file_is_load_error() {
        let file = assert_fs::NamedTempFile::new("language.json").unwrap();
        file.write_str(r#"[{"Language": "French"}]"#).unwrap();

        let err = LanguageTable::load(file.path(), DuplicatePolicy::LastWins).unwrap_err();
        assert!(matches!(err, PolyglotError::Load(_)));
    }

    #[test]
    fn test_empty_table_is_load_error() {
        let err = LanguageTable::from_json_str("[]", DuplicatePolicy::LastWins).unwrap_err();
        assert!(matches!(err, PolyglotError::Load(_)));
    }

    #[test]
    fn test_bundled_language_file_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("language.json");
        let table = LanguageTable::load(path, DuplicatePolicy::Reject).unwrap();
        assert_eq!(table.resolve_code("French"), Some("fra_Latn"));
        let names = table.names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}

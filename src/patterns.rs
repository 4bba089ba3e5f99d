//! Built-in pattern table and directory classification.

use crate::error::{ReclaimError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

// Embed the TOML file directly in the binary at compile time
const PATTERNS_TOML: &str = include_str!("../patterns.toml");

/// One recognized artifact-folder family
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PatternEntry {
    /// Display name of the tool or language owning the folder (e.g., "Rust")
    pub ecosystem: String,
    /// Literal directory name that triggers a check
    pub marker: String,
    /// The parent must contain at least one of these for the match to hold.
    /// Checked in order, first hit wins.
    pub companions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PatternFile {
    #[serde(rename = "pattern", default)]
    patterns: Vec<PatternEntry>,
}

/// Immutable marker-name → entry lookup, built once and shared by reference.
#[derive(Debug, Clone)]
pub struct PatternTable {
    entries: HashMap<String, PatternEntry>,
}

impl PatternTable {
    /// Load the table compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_toml(PATTERNS_TOML)
    }

    /// Parse and validate a pattern table from TOML source
    pub fn from_toml(source: &str) -> Result<Self> {
        let file: PatternFile = toml::from_str(source)?;

        let mut entries = HashMap::with_capacity(file.patterns.len());
        for entry in file.patterns {
            if entry.companions.is_empty() {
                return Err(ReclaimError::InvalidPattern {
                    marker: entry.marker,
                    reason: "at least one companion file is required".to_string(),
                });
            }
            if entry.marker.is_empty() || entry.marker.contains(['/', '\\']) {
                return Err(ReclaimError::InvalidPattern {
                    marker: entry.marker,
                    reason: "marker must be a single directory name".to_string(),
                });
            }
            if entries.contains_key(&entry.marker) {
                return Err(ReclaimError::InvalidPattern {
                    marker: entry.marker,
                    reason: "marker is defined more than once".to_string(),
                });
            }
            entries.insert(entry.marker.clone(), entry);
        }

        Ok(Self { entries })
    }

    pub fn get(&self, marker: &str) -> Option<&PatternEntry> {
        self.entries.get(marker)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternEntry> {
        self.entries.values()
    }

    /// Decide whether the directory `dir_name` inside `parent` is a deletion candidate.
    ///
    /// Unknown names return `Ok(None)` without touching the filesystem. For known
    /// markers, `parent` is probed for each companion file in order. A missing
    /// companion is a normal negative answer; any other probe failure is an error.
    /// Size is not computed here.
    pub fn classify(&self, dir_name: &str, parent: &Path) -> Result<Option<&PatternEntry>> {
        let Some(entry) = self.entries.get(dir_name) else {
            return Ok(None);
        };

        for companion in &entry.companions {
            let probe = parent.join(companion);
            match fs::metadata(&probe) {
                Ok(_) => return Ok(Some(entry)),
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => {
                    return Err(ReclaimError::Probe {
                        path: probe,
                        source: err,
                    })
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_table_loads() {
        let table = PatternTable::builtin().unwrap();

        for marker in [".venv", "node_modules", "target", ".pixi"] {
            assert!(table.get(marker).is_some(), "{marker} should be built in");
        }
        assert!(table.iter().all(|entry| !entry.companions.is_empty()));
        assert_eq!(
            table.get(".pixi").unwrap().companions,
            vec!["pixi.toml", "pyproject.toml"]
        );
    }

    #[test]
    fn test_unknown_name_is_not_a_candidate() {
        let table = PatternTable::builtin().unwrap();
        // Parent does not exist; an unknown name must not touch the filesystem
        let result = table.classify("src", Path::new("/definitely/not/here"));
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_classify_requires_companion() {
        let dir = tempdir().unwrap();
        let table = PatternTable::builtin().unwrap();
        fs::create_dir(dir.path().join("target")).unwrap();

        assert!(table.classify("target", dir.path()).unwrap().is_none());

        fs::write(dir.path().join("Cargo.toml"), "[package]\nname = \"x\"").unwrap();
        let entry = table.classify("target", dir.path()).unwrap().unwrap();
        assert_eq!(entry.ecosystem, "Rust");
    }

    #[test]
    fn test_any_companion_is_enough() {
        let dir = tempdir().unwrap();
        let table = PatternTable::builtin().unwrap();
        fs::write(dir.path().join("pyproject.toml"), "").unwrap();

        let entry = table.classify(".pixi", dir.path()).unwrap();
        assert_eq!(entry.map(|e| e.marker.as_str()), Some(".pixi"));
    }

    #[test]
    fn test_rejects_entry_without_companions() {
        let err = PatternTable::from_toml(
            r#"
            [[pattern]]
            ecosystem = "X"
            marker = "out"
            companions = []
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ReclaimError::InvalidPattern { ref marker, .. } if marker == "out"));
    }

    #[test]
    fn test_rejects_duplicate_marker() {
        let source = r#"
            [[pattern]]
            ecosystem = "A"
            marker = "build"
            companions = ["a.toml"]

            [[pattern]]
            ecosystem = "B"
            marker = "build"
            companions = ["b.toml"]
        "#;
        assert!(matches!(
            PatternTable::from_toml(source),
            Err(ReclaimError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            PatternTable::from_toml("[[pattern]\nmarker ="),
            Err(ReclaimError::PatternSyntax(_))
        ));
    }
}

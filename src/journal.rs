//! Research-session notes kept next to the analysis output.

use crate::utils::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SAVES_FILE: &str = "saves.json";
pub const LAST_SAVE_FILE: &str = "last_save.txt";
pub const NEXT_FILE: &str = "next.txt";
pub const MAX_ENTRIES: usize = 3;
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub time: String,
    pub what: String,
}

#[derive(Debug, Clone)]
pub struct Journal {
    dir: PathBuf,
}

impl Journal {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Appends a note stamped with the local time, keeping the newest entries only.
    pub fn save(&self, what: &str) -> Result<JournalEntry> {
        if what.trim().is_empty() {
            return Err(AnalysisError::ValidationError {
                message: "Journal note cannot be empty".to_string(),
            });
        }

        let entry = JournalEntry {
            time: chrono::Local::now().format(TIME_FORMAT).to_string(),
            what: what.trim().to_string(),
        };

        // 損壞的檔案視為空白
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("⚠️ Ignoring unreadable journal: {}", e);
                Vec::new()
            }
        };
        entries.push(entry.clone());
        if entries.len() > MAX_ENTRIES {
            entries = entries.split_off(entries.len() - MAX_ENTRIES);
        }

        fs::create_dir_all(&self.dir)?;
        fs::write(
            self.dir.join(SAVES_FILE),
            serde_json::to_string_pretty(&entries)?,
        )?;
        fs::write(
            self.dir.join(LAST_SAVE_FILE),
            format!("{}\n{}", entry.time, entry.what),
        )?;

        tracing::debug!("Journal now holds {} entries", entries.len());
        Ok(entry)
    }

    /// Entries oldest first; a missing file yields none.
    pub fn load(&self) -> Result<Vec<JournalEntry>> {
        let path = self.dir.join(SAVES_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn next_steps(&self) -> Result<Option<String>> {
        let path = self.dir.join(NEXT_FILE);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }
}

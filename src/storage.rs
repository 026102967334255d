//! Storage layer for thesis
//!
//! All state lives next to the dissertation, under the project root:
//!
//! ```text
//! .thesis.toml              # Configuration (optional)
//! .thesis/                  # Store directory
//!   store.json              # Snapshot of projects, milestones, tasks, word logs
//!   store.json.lock         # Writer lock (fs2)
//!   audit.jsonl             # Append-only audit trail
//! ```

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::config::CONFIG_FILE;
use crate::error::Result;
use crate::lock;

/// Name of the store directory
pub const STORE_DIR: &str = ".thesis";

/// Storage manager for thesis state
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the `.thesis/` directory
    pub fn store_dir(&self) -> PathBuf {
        self.root.join(STORE_DIR)
    }

    /// Path to the snapshot file
    pub fn store_file(&self) -> PathBuf {
        self.store_dir().join("store.json")
    }

    /// Path to the lock guarding the snapshot
    pub fn store_lock_file(&self) -> PathBuf {
        lock::lock_path_for(&self.store_file())
    }

    /// Path to the audit log (JSONL format)
    pub fn audit_file(&self) -> PathBuf {
        self.store_dir().join("audit.jsonl")
    }

    /// Path to `.thesis.toml`
    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    // =========================================================================
    // Directory initialization
    // =========================================================================

    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(self.store_dir())?;
        let audit = self.audit_file();
        if !audit.exists() {
            File::create(&audit)?;
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.store_file().exists()
    }

    // =========================================================================
    // File I/O helpers
    // =========================================================================

    /// Write JSON atomically (temp + rename)
    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        lock::write_atomic(path, json.as_bytes())
    }

    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        let data: T = serde_json::from_str(&content)?;
        Ok(data)
    }

    /// Append one record to a JSONL file. Not atomic across processes; the
    /// caller holds the store lock.
    pub fn append_jsonl<T: Serialize>(&self, path: &Path, record: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(record)?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        writeln!(file, "{}", json)?;
        file.sync_all()?;

        Ok(())
    }

    /// Read every record of a JSONL file; a missing file reads as empty
    pub fn read_jsonl<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: T = serde_json::from_str(&line)?;
            records.push(record);
        }

        Ok(records)
    }
}

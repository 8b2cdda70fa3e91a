//! Sent-signal history, persisted as JSON.
//!
//! The history is a capped ring buffer: once full, recording a new signal
//! drops the oldest one. Throttling and `status` read from it; the analyzer
//! never does.

use super::NotifyError;
use chrono::{DateTime, Utc};
use retrace_core::Signal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

pub const DEFAULT_MAX_STORED: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSignal {
    pub signal: Signal,
    /// Wall-clock time the notifier accepted the signal.
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalHistory {
    entries: VecDeque<StoredSignal>,
    capacity: usize,
}

impl SignalHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Load from `path`. A missing file is an empty history; entries beyond
    /// `capacity` are dropped oldest-first.
    pub fn load(path: &Path, capacity: usize) -> Result<Self, NotifyError> {
        let mut history = Self::new(capacity);
        if !path.exists() {
            return Ok(history);
        }
        let raw = fs::read_to_string(path).map_err(|e| NotifyError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let stored: Vec<StoredSignal> =
            serde_json::from_str(&raw).map_err(|e| NotifyError::Serialization(e.to_string()))?;
        for entry in stored {
            history.push(entry);
        }
        Ok(history)
    }

    /// Write the history as a JSON array, via a sibling temp file and rename.
    pub fn save(&self, path: &Path) -> Result<(), NotifyError> {
        let io_err = |e: std::io::Error| NotifyError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        };
        let entries: Vec<&StoredSignal> = self.entries.iter().collect();
        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| NotifyError::Serialization(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)
    }

    /// Shrinking drops the oldest entries.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn push(&mut self, entry: StoredSignal) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn record(&mut self, signal: Signal, sent_at: DateTime<Utc>) {
        self.push(StoredSignal { signal, sent_at });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &StoredSignal> {
        self.entries.iter()
    }

    pub fn last_sent(&self) -> Option<DateTime<Utc>> {
        self.entries.back().map(|e| e.sent_at)
    }

}

impl Default for SignalHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STORED)
    }
}

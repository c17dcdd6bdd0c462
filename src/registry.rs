//! # Reminder Registry
//!
//! The in-memory authoritative list of pending reminders, mirrored to the
//! store on every mutation. The registry is an explicit object handed to the
//! command handlers and the scheduler; callers serialize access through one
//! lock around every read-modify-write sequence.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use std::path::{Path, PathBuf};

use log::debug;

use crate::error::StorageError;
use crate::reminder::Reminder;
use crate::store;

/// Ordered sequence of pending reminders plus its backing file.
#[derive(Debug)]
pub struct ReminderRegistry {
    reminders: Vec<Reminder>,
    path: PathBuf,
}

impl ReminderRegistry {
    /// Create an empty registry backed by `path`. No I/O happens until
    /// [`reload`](Self::reload) or the first mutation.
    pub fn new(path: PathBuf) -> Self {
        Self {
            reminders: Vec::new(),
            path,
        }
    }

    /// Replace the in-memory contents with what the store holds, creating an
    /// empty store file when none exists.
    pub fn reload(&mut self) -> Result<(), StorageError> {
        self.reminders = store::load_reminders(&self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.reminders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reminders.is_empty()
    }

    /// Copy of the current contents, so sweeps classify a snapshot that can
    /// never interleave with replacement.
    pub fn snapshot(&self) -> Vec<Reminder> {
        self.reminders.clone()
    }

    /// Append a new reminder and persist the full list immediately.
    pub fn add(&mut self, reminder: Reminder) -> Result<(), StorageError> {
        self.reminders.push(reminder);
        store::save_reminders(&self.reminders, &self.path)
    }

    /// Wholesale replacement after a sweep. Persists only when the length
    /// changed, so a no-op sweep never rewrites the store. Returns whether a
    /// write happened.
    pub fn replace(&mut self, kept: Vec<Reminder>) -> Result<bool, StorageError> {
        if kept.len() == self.reminders.len() {
            return Ok(false);
        }
        debug!("Saving {} reminder(s)", kept.len());
        store::save_reminders(&kept, &self.path)?;
        self.reminders = kept;
        Ok(true)
    }

    /// Persist the current contents without mutating them (shutdown path).
    pub fn flush(&self) -> Result<(), StorageError> {
        store::save_reminders(&self.reminders, &self.path)
    }

    /// Drop the in-memory contents. Does not touch the store.
    pub fn clear(&mut self) {
        self.reminders.clear();
    }
}

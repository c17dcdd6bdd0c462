//! # Legacy Migration
//!
//! One-shot import of the built-in remind plugin's database: one reminder
//! per line, four tab-separated fields `timestamp\tdestination\toriginator\t
//! message`, no quoting, timestamps possibly carrying fractional seconds.
//! Invoked from an interactive configuration step, never from the scheduling
//! path.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::config::RemindConfig;
use crate::error::StorageError;
use crate::reminder::Reminder;
use crate::store;

/// Suffix appended to the legacy file once its contents are imported.
const BACKUP_SUFFIX: &str = ".bk";

/// Import every record from the legacy file at `from` into the reminder
/// store at `to`, appending to the store's current contents. Returns the
/// number of reminders imported.
pub fn import_legacy(from: &Path, to: &Path) -> Result<usize, StorageError> {
    let mut reminders = store::load_reminders(to)?;
    let text = fs::read_to_string(from)?;

    let mut imported = 0usize;
    for (index, line) in text.lines().enumerate() {
        let mut parts = line.splitn(4, '\t');
        let (Some(raw_timestamp), Some(destination), Some(originator), Some(message)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(StorageError::MalformedRecord {
                line: index + 1,
                reason: "expected 4 tab-separated fields".to_string(),
            });
        };

        // fractional seconds are truncated
        let timestamp = raw_timestamp
            .parse::<f64>()
            .map_err(|_| StorageError::MalformedRecord {
                line: index + 1,
                reason: format!("non-numeric timestamp {raw_timestamp:?}"),
            })? as i64;

        reminders.push(Reminder::new(timestamp, destination, originator, message));
        imported += 1;
    }

    if imported > 0 {
        store::save_reminders(&reminders, to)?;
    }
    Ok(imported)
}

/// Migrate the legacy database named by `config`, then move it aside with a
/// [`BACKUP_SUFFIX`]. An absent or empty legacy file imports nothing and
/// leaves everything untouched. Returns the number of reminders imported.
pub fn migrate_builtin(config: &RemindConfig) -> Result<usize, StorageError> {
    let from = config.legacy_filename();
    if !from.is_file() {
        return Ok(0);
    }

    let imported = import_legacy(&from, &config.reminder_filename())?;
    if imported > 0 {
        let backup = backup_name(&from);
        fs::rename(&from, &backup)?;
        info!(
            "Migrated {imported} reminder(s); legacy file renamed to {}",
            backup.display()
        );
    }
    Ok(imported)
}

fn backup_name(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_import_appends_to_existing_store() {
        let dir = tempdir().unwrap();
        let to = dir.path().join("test.reminder.csv");
        let from = dir.path().join("test.reminders.db");

        let existing = Reminder::new(100, "#channel", "Exirel", "already here");
        store::save_reminders(&[existing.clone()], &to).unwrap();

        fs::write(
            &from,
            "523553400.51\t#channel\tExirel\tyay!\n523553405\tFriend\tExirel\tmessage\twith\ttabs\n",
        )
        .unwrap();

        assert_eq!(import_legacy(&from, &to).unwrap(), 2);
        assert_eq!(
            store::load_reminders(&to).unwrap(),
            vec![
                existing,
                Reminder::new(523553400, "#channel", "Exirel", "yay!"),
                Reminder::new(523553405, "Friend", "Exirel", "message\twith\ttabs"),
            ]
        );
    }

    #[test]
    fn test_import_empty_file_is_zero() {
        let dir = tempdir().unwrap();
        let to = dir.path().join("test.reminder.csv");
        let from = dir.path().join("test.reminders.db");
        fs::write(&from, "").unwrap();

        assert_eq!(import_legacy(&from, &to).unwrap(), 0);
        assert_eq!(store::load_reminders(&to).unwrap(), vec![]);
    }

    #[test]
    fn test_import_rejects_malformed_line() {
        let dir = tempdir().unwrap();
        let to = dir.path().join("test.reminder.csv");
        let from = dir.path().join("test.reminders.db");
        fs::write(&from, "523553400\t#channel\tExirel\n").unwrap();

        assert!(matches!(
            import_legacy(&from, &to),
            Err(StorageError::MalformedRecord { line: 1, .. })
        ));
    }

    #[test]
    fn test_migrate_builtin_renames_on_success() {
        let dir = tempdir().unwrap();
        let config = RemindConfig::new(dir.path(), "test");
        fs::write(
            config.legacy_filename(),
            "523553400\t#channel\tExirel\tyay!\n",
        )
        .unwrap();

        assert_eq!(migrate_builtin(&config).unwrap(), 1);
        assert!(!config.legacy_filename().is_file());
        assert!(dir.path().join("test.reminders.db.bk").is_file());
        assert_eq!(
            store::load_reminders(&config.reminder_filename())
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_migrate_builtin_absent_file_is_zero_without_rename() {
        let dir = tempdir().unwrap();
        let config = RemindConfig::new(dir.path(), "test");

        assert_eq!(migrate_builtin(&config).unwrap(), 0);
        assert!(!dir.path().join("test.reminders.db.bk").exists());
    }

    #[test]
    fn test_migrate_builtin_empty_file_is_zero_without_rename() {
        let dir = tempdir().unwrap();
        let config = RemindConfig::new(dir.path(), "test");
        fs::write(config.legacy_filename(), "").unwrap();

        assert_eq!(migrate_builtin(&config).unwrap(), 0);
        assert!(config.legacy_filename().is_file());
        assert!(!dir.path().join("test.reminders.db.bk").exists());
    }
}

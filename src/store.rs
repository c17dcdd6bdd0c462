//! # Reminder Store
//!
//! Durable persistence of the reminder list as a flat record file: one
//! reminder per record, four comma-separated fields in the order
//! `timestamp,destination,originator,message`, every field quoted
//! unconditionally so embedded delimiters and whitespace survive. A quoted
//! field may span lines, so a message containing newlines round-trips.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Records are read across line boundaries inside quoted fields
//! - 1.0.0: Initial quoted record format
//!
//! Saving rewrites the whole file; loading creates an empty file when none
//! exists. `load_reminders(save_reminders(r))` is field-for-field identity.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

use log::debug;

use crate::error::StorageError;
use crate::reminder::Reminder;

/// Render one field, quoted, with embedded quotes doubled.
fn quote(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 2);
    out.push('"');
    for c in field.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Serialize a reminder as one record line.
fn serialize(reminder: &Reminder) -> String {
    format!(
        "{},{},{},{}",
        quote(&reminder.timestamp.to_string()),
        quote(&reminder.destination),
        quote(&reminder.originator),
        quote(&reminder.message),
    )
}

/// Rewrite the reminder file at `path` with exactly `reminders`, in order.
pub fn save_reminders(reminders: &[Reminder], path: &Path) -> Result<(), StorageError> {
    let mut file = File::create(path)?;
    for reminder in reminders {
        writeln!(file, "{}", serialize(reminder))?;
    }
    debug!("Wrote {} reminder(s) to {}", reminders.len(), path.display());
    Ok(())
}

/// Load every reminder from `path`, in file order.
///
/// A missing file is not an error: it is created empty, mirroring the first
/// run of a fresh installation. Malformed records (fewer than four fields,
/// non-integer timestamp) are. Extra fields are ignored.
pub fn load_reminders(path: &Path) -> Result<Vec<Reminder>, StorageError> {
    // append mode so the file is created when absent
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)?;
    let mut text = String::new();
    file.read_to_string(&mut text)?;

    let mut reminders = Vec::new();
    let mut records = RecordReader::new(&text);
    while let Some((lineno, fields)) = records.next_record()? {
        reminders.push(parse_reminder(fields, lineno)?);
    }
    Ok(reminders)
}

fn parse_reminder(mut fields: Vec<String>, lineno: usize) -> Result<Reminder, StorageError> {
    if fields.len() < 4 {
        return Err(StorageError::MalformedRecord {
            line: lineno,
            reason: format!("expected 4 fields, found {}", fields.len()),
        });
    }
    fields.truncate(4);
    match <[String; 4]>::try_from(fields) {
        Ok([raw_timestamp, destination, originator, message]) => {
            let timestamp = raw_timestamp
                .parse()
                .map_err(|_| StorageError::MalformedRecord {
                    line: lineno,
                    reason: format!("non-integer timestamp {raw_timestamp:?}"),
                })?;
            Ok(Reminder {
                timestamp,
                destination,
                originator,
                message,
            })
        }
        Err(_) => Err(StorageError::MalformedRecord {
            line: lineno,
            reason: "expected 4 fields".to_string(),
        }),
    }
}

/// Splits record text into fields. Accepts quoted fields (doubled quotes
/// for a literal quote) and bare fields. A record ends at a newline outside
/// quotes; inside quotes a newline is field content, so records continue
/// across line boundaries.
struct RecordReader<'a> {
    chars: Peekable<Chars<'a>>,
    /// 1-based line number of the next unread character.
    line: usize,
}

impl<'a> RecordReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
        }
    }

    /// The fields of the next record, with the line it started on. Blank
    /// lines are skipped; `None` means end of input.
    fn next_record(&mut self) -> Result<Option<(usize, Vec<String>)>, StorageError> {
        while self.chars.peek() == Some(&'\n') {
            self.chars.next();
            self.line += 1;
        }
        if self.chars.peek().is_none() {
            return Ok(None);
        }

        let lineno = self.line;
        let mut fields = Vec::new();
        loop {
            let mut field = String::new();
            if self.chars.peek() == Some(&'"') {
                self.chars.next();
                loop {
                    match self.chars.next() {
                        Some('"') => {
                            if self.chars.peek() == Some(&'"') {
                                self.chars.next();
                                field.push('"');
                            } else {
                                break;
                            }
                        }
                        Some(c) => {
                            if c == '\n' {
                                self.line += 1;
                            }
                            field.push(c);
                        }
                        None => {
                            return Err(StorageError::MalformedRecord {
                                line: lineno,
                                reason: "unterminated quoted field".to_string(),
                            })
                        }
                    }
                }
            } else {
                while let Some(&c) = self.chars.peek() {
                    if c == ',' || c == '\n' {
                        break;
                    }
                    field.push(c);
                    self.chars.next();
                }
            }
            fields.push(field);

            match self.chars.next() {
                Some(',') => continue,
                Some('\n') => {
                    self.line += 1;
                    break;
                }
                Some(c) => {
                    return Err(StorageError::MalformedRecord {
                        line: lineno,
                        reason: format!("unexpected character {c:?} after field"),
                    })
                }
                None => break,
            }
        }

        Ok(Some((lineno, fields)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Vec<Reminder> {
        vec![
            Reminder::new(523553400, "#channel", "Exirel", "yay!"),
            Reminder::new(523553405, "#channel", "Exirel", "yay + 5s"),
        ]
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.csv");

        let reminders = sample();
        save_reminders(&reminders, &path).unwrap();
        assert_eq!(load_reminders(&path).unwrap(), reminders);
    }

    #[test]
    fn test_round_trip_awkward_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.csv");

        let reminders = vec![
            Reminder::new(1, "#chan,nel", "nick", "hello, \"world\""),
            Reminder::new(2, "recipient", "nick", "  spaced  out  "),
        ];
        save_reminders(&reminders, &path).unwrap();
        assert_eq!(load_reminders(&path).unwrap(), reminders);
    }

    #[test]
    fn test_round_trip_multiline_message() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.csv");

        // a quoted message spanning lines must not split the record
        let reminders = vec![
            Reminder::new(1, "#chan", "nick", "line one\nline two"),
            Reminder::new(2, "#chan", "nick", "after"),
        ];
        save_reminders(&reminders, &path).unwrap();
        assert_eq!(load_reminders(&path).unwrap(), reminders);
    }

    #[test]
    fn test_malformed_record_reports_line_after_multiline_message() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.csv");
        std::fs::write(&path, "\"1\",\"#a\",\"b\",\"one\ntwo\"\nbad,record\n").unwrap();

        assert!(matches!(
            load_reminders(&path),
            Err(StorageError::MalformedRecord { line: 3, .. })
        ));
    }

    #[test]
    fn test_load_missing_file_creates_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.csv");

        assert_eq!(load_reminders(&path).unwrap(), vec![]);
        assert!(path.is_file());
    }

    #[test]
    fn test_save_rewrites_in_full() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.csv");

        save_reminders(&sample(), &path).unwrap();
        let shorter = vec![Reminder::new(1, "#a", "b", "c")];
        save_reminders(&shorter, &path).unwrap();
        assert_eq!(load_reminders(&path).unwrap(), shorter);
    }

    #[test]
    fn test_load_accepts_bare_fields_and_ignores_extras() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.csv");
        std::fs::write(&path, "42,#channel,Test,message,extra\n").unwrap();

        assert_eq!(
            load_reminders(&path).unwrap(),
            vec![Reminder::new(42, "#channel", "Test", "message")]
        );
    }

    #[test]
    fn test_load_rejects_wrong_field_count() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.csv");
        std::fs::write(&path, "\"42\",\"#channel\",\"Test\"\n").unwrap();

        assert!(matches!(
            load_reminders(&path),
            Err(StorageError::MalformedRecord { line: 1, .. })
        ));
    }

    #[test]
    fn test_load_rejects_non_integer_timestamp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.csv");
        std::fs::write(&path, "\"soon\",\"#channel\",\"Test\",\"message\"\n").unwrap();

        assert!(matches!(
            load_reminders(&path),
            Err(StorageError::MalformedRecord { line: 1, .. })
        ));
    }
}

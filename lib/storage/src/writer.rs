use chrono::{SecondsFormat, Utc};
use curatx_core::{Error, Record, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::stamp::resolve_stamped_path_now;
use crate::store::{exists_and_nonempty, CsvStore};

/// Options for appending one record to a dataset file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppendOptions {
    /// Add an RFC 3339 UTC timestamp column to the row.
    pub add_timestamp: bool,
    /// Column that receives the timestamp.
    pub timestamp_column: String,
    /// Stamp the filename with a UTC token when the store does not exist yet.
    pub stamp_filename_on_create: bool,
}

impl Default for AppendOptions {
    fn default() -> Self {
        Self {
            add_timestamp: false,
            timestamp_column: "timestamp".to_string(),
            stamp_filename_on_create: true,
        }
    }
}

/// What a write did to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AppendChange {
    Created { columns: Vec<String> },
    Appended,
    Expanded { new_columns: Vec<String> },
}

/// Result of an append: which file was written and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppendOutcome {
    pub requested_path: PathBuf,
    pub path: PathBuf,
    pub stamped: bool,
    pub change: AppendChange,
}

impl AppendOutcome {
    fn stamped_elsewhere(&self) -> bool {
        self.stamped && self.path != self.requested_path
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl fmt::Display for AppendOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let created = file_name(&self.path);
        let requested = file_name(&self.requested_path);
        match &self.change {
            AppendChange::Created { .. } if self.stamped_elsewhere() => write!(
                f,
                "Created {} (stamped from {}) and appended first row.",
                created, requested
            ),
            AppendChange::Created { .. } => {
                write!(f, "Created {} and appended first row.", self.path.display())
            }
            AppendChange::Appended if self.stamped_elsewhere() => {
                write!(f, "Appended row (created {}).", created)
            }
            AppendChange::Appended => write!(f, "Appended row."),
            AppendChange::Expanded { new_columns } => {
                let mut info = Vec::new();
                if self.stamped_elsewhere() {
                    info.push(format!("created {} (stamped from {})", created, requested));
                }
                info.push(format!("added new columns: {}", new_columns.join(", ")));
                write!(f, "Appended row ({}).", info.join(", "))
            }
        }
    }
}

/// Appends records to dataset files, creating and widening them as needed.
#[derive(Debug, Clone, Default)]
pub struct DatasetWriter {
    options: AppendOptions,
}

impl DatasetWriter {
    pub fn new(options: AppendOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AppendOptions {
        &self.options
    }

    /// Write `record` to the store at `path` (or its stamped sibling).
    pub fn append<P: AsRef<Path>>(&self, path: P, mut record: Record) -> Result<AppendOutcome> {
        let requested_path = path.as_ref().to_path_buf();

        if self.options.add_timestamp {
            let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
            record.insert(self.options.timestamp_column.clone(), now)?;
        }
        if record.is_empty() {
            return Err(Error::InvalidInput("no key=value pairs to append".to_string()));
        }

        let (path, stamped) =
            resolve_stamped_path_now(&requested_path, self.options.stamp_filename_on_create);
        if stamped {
            debug!("Resolved {} to stamped path {}", requested_path.display(), path.display());
        }

        let change = if exists_and_nonempty(&path) {
            let snapshot = CsvStore::read_all(&path)?;
            let new_columns = snapshot.schema.missing_from(&record);
            if new_columns.is_empty() {
                CsvStore::append_known_schema(&path, &snapshot.schema, &record)?;
                AppendChange::Appended
            } else {
                CsvStore::append_with_expansion(&path, &snapshot.schema, &snapshot.rows, &record)?;
                AppendChange::Expanded { new_columns }
            }
        } else {
            let schema = CsvStore::create_new(&path, &record)?;
            AppendChange::Created {
                columns: schema.fields().to_vec(),
            }
        };

        let outcome = AppendOutcome {
            requested_path,
            path,
            stamped,
            change,
        };
        info!("{}", outcome);
        Ok(outcome)
    }
}

/// Append with the given options; see [`DatasetWriter::append`].
pub fn append_record<P: AsRef<Path>>(path: P, record: Record, options: &AppendOptions) -> Result<AppendOutcome> {
    DatasetWriter::new(options.clone()).append(path, record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unstamped() -> AppendOptions {
        AppendOptions {
            stamp_filename_on_create: false,
            ..AppendOptions::default()
        }
    }

    fn record(pairs: &[&str]) -> Record {
        Record::from_pairs(pairs.iter().copied()).unwrap()
    }

    #[test]
    fn test_default_options() {
        let options = AppendOptions::default();
        assert!(!options.add_timestamp);
        assert_eq!(options.timestamp_column, "timestamp");
        assert!(options.stamp_filename_on_create);
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: AppendOptions = serde_json::from_str(r#"{"add_timestamp": true}"#).unwrap();
        assert!(options.add_timestamp);
        assert_eq!(options.timestamp_column, "timestamp");
    }

    #[test]
    fn test_create_append_expand_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let writer = DatasetWriter::new(unstamped());

        let created = writer.append(&path, record(&["text=one"])).unwrap();
        assert_eq!(created.change, AppendChange::Created { columns: vec!["text".to_string()] });
        assert!(created.to_string().starts_with("Created "));

        let appended = writer.append(&path, record(&["text=two"])).unwrap();
        assert_eq!(appended.change, AppendChange::Appended);
        assert_eq!(appended.to_string(), "Appended row.");

        let expanded = writer.append(&path, record(&["text=three", "label=pos"])).unwrap();
        assert_eq!(
            expanded.change,
            AppendChange::Expanded { new_columns: vec!["label".to_string()] }
        );
        assert_eq!(expanded.to_string(), "Appended row (added new columns: label).");

        let snapshot = CsvStore::read_all(&path).unwrap();
        assert_eq!(snapshot.rows.len(), 3);
        assert_eq!(snapshot.column_values("label").unwrap(), vec!["", "", "pos"]);
    }

    #[test]
    fn test_stamped_creation_then_continue() {
        let dir = tempfile::tempdir().unwrap();
        let requested = dir.path().join("data.csv");
        let writer = DatasetWriter::new(AppendOptions::default());

        let first = writer.append(&requested, record(&["text=one"])).unwrap();
        assert!(first.stamped);
        assert_ne!(first.path, requested);
        assert!(first.to_string().contains("(stamped from data.csv)"));

        // Continuing the stamped file does not stamp again.
        let second = writer.append(&first.path, record(&["text=two"])).unwrap();
        assert!(!second.stamped);
        assert_eq!(second.path, first.path);
        assert_eq!(CsvStore::read_all(&first.path).unwrap().rows.len(), 2);
    }

    #[test]
    fn test_timestamp_column_added() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let options = AppendOptions {
            add_timestamp: true,
            timestamp_column: "ts".to_string(),
            stamp_filename_on_create: false,
        };
        append_record(&path, record(&["text=hi"]), &options).unwrap();

        let snapshot = CsvStore::read_all(&path).unwrap();
        assert_eq!(snapshot.schema.fields(), &["text", "ts"].map(String::from));
        let ts = snapshot.rows[0].get("ts").unwrap();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[test]
    fn test_empty_record_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = append_record(dir.path().join("d.csv"), Record::new(), &unstamped()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}

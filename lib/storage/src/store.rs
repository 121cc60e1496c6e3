// Schema-evolving CSV store
use atomicwrites::{AllowOverwrite, AtomicFile};
use curatx_core::{Error, Record, Result, Schema};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Everything persisted in a store file: the header and every row after it.
///
/// Each row carries a value for every schema column (empty when the file
/// had no cell for it).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub schema: Schema,
    pub rows: Vec<Record>,
}

impl Snapshot {
    /// Values of `column` in row order, or `None` when the store has no such column.
    pub fn column_values(&self, column: &str) -> Option<Vec<&str>> {
        if !self.schema.contains(column) {
            return None;
        }
        Some(
            self.rows
                .iter()
                .map(|row| row.get(column).unwrap_or(""))
                .collect(),
        )
    }
}

/// Header-first, comma-separated, `\n`-terminated dataset files.
///
/// Single-row appends go straight to the end of the file. Only a schema
/// expansion rewrites it, and that rewrite lands through a temp file and a
/// rename so a crash leaves either the old or the new file in place.
pub struct CsvStore;

impl CsvStore {
    /// Read the header and every row.
    ///
    /// A zero-byte file is an empty snapshot. Blank lines are skipped, short
    /// rows are padded and cells past the header are dropped.
    pub fn read_all<P: AsRef<Path>>(path: P) -> Result<Snapshot> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::io_at(path, e),
        })?;

        if file.metadata().map_err(|e| Error::io_at(path, e))?.len() == 0 {
            debug!("{} is empty, treating as a store without columns", path.display());
            return Ok(Snapshot::default());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let header = reader
            .headers()
            .map_err(|e| csv_error(path, e, "unreadable header"))?
            .clone();
        let schema = Schema::from_header(path, header.iter())?;

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let cells = result.map_err(|e| csv_error(path, e, &format!("unreadable row {}", index + 2)))?;
            let row: Record = schema
                .fields()
                .iter()
                .enumerate()
                .map(|(i, field)| (field.as_str(), cells.get(i).unwrap_or("")))
                .collect();
            rows.push(row);
        }

        debug!(
            "Read {} rows with {} columns from {}",
            rows.len(),
            schema.len(),
            path.display()
        );
        Ok(Snapshot { schema, rows })
    }

    /// Append one row under the existing schema without touching earlier bytes.
    ///
    /// Fields the schema does not know are dropped; schema fields the record
    /// lacks are written as empty cells.
    pub fn append_known_schema<P: AsRef<Path>>(path: P, schema: &Schema, record: &Record) -> Result<()> {
        let path = path.as_ref();
        if schema.is_empty() {
            return Err(Error::InvalidInput(format!(
                "cannot append to {}: store has no columns",
                path.display()
            )));
        }

        let io = |e: io::Error| Error::io_at(path, e);
        let mut file = OpenOptions::new().read(true).append(true).open(path).map_err(io)?;
        let needs_separator = !ends_with_newline(&mut file).map_err(io)?;

        let mut writer = BufWriter::new(&file);
        if needs_separator {
            writer.write_all(b"\n").map_err(io)?;
        }
        {
            let mut csv_writer = row_writer(&mut writer);
            csv_writer
                .write_record(schema.project(record))
                .map_err(|e| csv_error(path, e, "failed to encode row"))?;
            csv_writer.flush().map_err(io)?;
        }
        writer.flush().map_err(io)?;
        drop(writer);

        file.sync_data().map_err(io)?;
        debug!("Appended row to {}", path.display());
        Ok(())
    }

    /// Append `record`, adding any columns it introduces.
    ///
    /// New columns go after the existing ones, in the record's key order.
    /// Every existing row is rewritten with empty cells for them and the new
    /// record is written last. When nothing is new this is a plain append.
    pub fn append_with_expansion<P: AsRef<Path>>(
        path: P,
        schema: &Schema,
        existing_rows: &[Record],
        record: &Record,
    ) -> Result<Schema> {
        let path = path.as_ref();
        let new_fields = schema.missing_from(record);
        if new_fields.is_empty() {
            Self::append_known_schema(path, schema, record)?;
            return Ok(schema.clone());
        }

        let expanded = schema.expanded_with(&new_fields);
        Self::rewrite(path, &expanded, existing_rows.iter().chain(std::iter::once(record)))?;

        info!(
            "Expanded schema of {} with columns [{}], rewrote {} rows",
            path.display(),
            new_fields.join(", "),
            existing_rows.len()
        );
        Ok(expanded)
    }

    /// Start a store whose columns are the record's keys, holding that one row.
    pub fn create_new<P: AsRef<Path>>(path: P, record: &Record) -> Result<Schema> {
        let path = path.as_ref();
        if record.is_empty() {
            return Err(Error::InvalidInput("cannot create a store from a record without fields".to_string()));
        }

        let schema = Schema::from_record(record);
        Self::rewrite(path, &schema, std::iter::once(record))?;
        info!("Created {} with columns [{}]", path.display(), schema.fields().join(", "));
        Ok(schema)
    }

    /// Write header + rows to a temp file next to `path`, then rename over it.
    fn rewrite<'a, I>(path: &Path, schema: &Schema, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        if let Some(name) = schema.fields().iter().find(|f| f.is_empty()) {
            return Err(Error::InvalidInput(format!("invalid column name '{}'", name)));
        }

        let atomic = AtomicFile::new_with_tmpdir(path, AllowOverwrite, parent_dir(path));
        atomic
            .write(|file| -> Result<()> {
                let mut csv_writer = row_writer(BufWriter::new(&mut *file));
                csv_writer
                    .write_record(schema.fields())
                    .map_err(|e| csv_error(path, e, "failed to encode header"))?;
                for row in rows {
                    csv_writer
                        .write_record(schema.project(row))
                        .map_err(|e| csv_error(path, e, "failed to encode row"))?;
                }
                csv_writer.flush().map_err(|e| Error::io_at(path, e))?;
                drop(csv_writer);
                file.sync_all().map_err(|e| Error::io_at(path, e))?;
                Ok(())
            })
            .map_err(|e| match e {
                atomicwrites::Error::Internal(e) => Error::io_at(path, e),
                atomicwrites::Error::User(e) => e,
            })
    }
}

fn row_writer<W: Write>(inner: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(inner)
}

fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn csv_error(path: &Path, err: csv::Error, context: &str) -> Error {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => Error::io_at(path, e),
        _ => Error::corrupt(path, format!("{}: {}", context, message)),
    }
}

/// True when `path` exists and holds at least one byte.
pub fn exists_and_nonempty<P: AsRef<Path>>(path: P) -> bool {
    fs::metadata(path).map(|m| m.is_file() && m.len() > 0).unwrap_or(false)
}

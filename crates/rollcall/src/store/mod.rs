//! Storage layer for rollcall.
//!
//! Each collection lives in its own comma-separated file with a fixed header
//! row. The file format has no in-place update, so reads parse the whole
//! file, inserts append a row, and updates and deletes rewrite the file.
//!
//! Every read-modify-write sequence runs under a per-collection guard, so
//! identifier allocation and rewrites are serialized within one process.
//! Nothing protects against a second process writing the same files.

pub mod csv;

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::record::{AttendanceRecord, Record, Student};

/// One collection file holding records of type `R`.
#[derive(Debug)]
pub struct Collection<R: Record> {
    /// Path to the backing file.
    path: PathBuf,
    /// Rewrite via a temporary file and rename.
    atomic_rewrite: bool,
    /// Serializes access to the backing file.
    guard: Mutex<()>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Collection<R> {
    /// Open a collection file, creating it with only a header if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory or the file cannot be created.
    pub fn open(path: impl AsRef<Path>, atomic_rewrite: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        if !path.exists() {
            fs::write(&path, csv::encode_row(R::HEADER))
                .map_err(|e| Error::storage_io(&path, e))?;
            info!("Created {} collection at {}", R::KIND, path.display());
        }

        Ok(Self {
            path,
            atomic_rewrite,
            guard: Mutex::new(()),
            _record: PhantomData,
        })
    }

    /// Get the path to the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse every record in file order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageCorrupt`] if the header is missing or differs,
    /// or any row cannot be parsed; [`Error::StorageIo`] if the file cannot
    /// be read.
    pub fn read_all(&self) -> Result<Vec<R>> {
        let _guard = self.lock();
        self.read_locked()
    }

    /// Append one record to the end of the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn append(&self, record: &R) -> Result<()> {
        let _guard = self.lock();
        self.append_locked(record)
    }

    /// Replace the file with the header followed by `records`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn rewrite_all(&self, records: &[R]) -> Result<()> {
        let _guard = self.lock();
        self.rewrite_locked(records)
    }

    /// The next free identifier: one more than the largest existing id, or
    /// 1 for an empty or unreadable collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if the largest id is already `u64::MAX`.
    pub fn next_id(&self) -> Result<u64> {
        let _guard = self.lock();
        self.next_id_locked()
    }

    /// Allocate an identifier and append the record built from it, as one
    /// guarded step.
    ///
    /// # Errors
    ///
    /// Returns an error if no identifier is left or the file cannot be
    /// written.
    pub fn insert_with(&self, build: impl FnOnce(u64) -> R) -> Result<R> {
        let _guard = self.lock();
        let record = build(self.next_id_locked()?);
        self.append_locked(&record)?;
        info!("Inserted {} {}", R::KIND, record.id());
        Ok(record)
    }

    /// Apply `change` to the record with `id` and rewrite the file.
    ///
    /// The file is left untouched when no record matches.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has `id`, or any read or
    /// write error.
    pub fn update(&self, id: u64, change: impl FnOnce(&mut R)) -> Result<R> {
        let _guard = self.lock();
        let mut records = self.read_locked()?;
        let Some(target) = records.iter_mut().find(|r| r.id() == id) else {
            return Err(Error::NotFound { kind: R::KIND, id });
        };
        change(target);
        let updated = target.clone();
        self.rewrite_locked(&records)?;
        info!("Updated {} {}", R::KIND, id);
        Ok(updated)
    }

    /// Remove the record with `id` by rewriting the file without it.
    ///
    /// The rewrite happens whether or not the record existed. Returns
    /// whether a record was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    pub fn remove(&self, id: u64) -> Result<bool> {
        let _guard = self.lock();
        let mut records = self.read_locked()?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        let removed = records.len() != before;
        self.rewrite_locked(&records)?;
        if removed {
            info!("Deleted {} {}", R::KIND, id);
        } else {
            debug!("Delete of missing {} {} left collection unchanged", R::KIND, id);
        }
        Ok(removed)
    }

    /// The raw bytes of the backing file, unmodified.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn raw_bytes(&self) -> Result<Vec<u8>> {
        let _guard = self.lock();
        fs::read(&self.path).map_err(|e| Error::storage_io(&self.path, e))
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guard protects no data, so a panic elsewhere leaves nothing
        // inconsistent behind it.
        self.guard.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_locked(&self) -> Result<Vec<R>> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::InvalidData => {
                Error::corrupt(&self.path, 1, "file is not valid UTF-8")
            }
            _ => Error::storage_io(&self.path, e),
        })?;

        let rows = csv::parse(&text).map_err(|e| Error::corrupt(&self.path, e.line, e.message))?;
        let mut rows = rows.into_iter();

        let header = rows
            .next()
            .ok_or_else(|| Error::corrupt(&self.path, 1, "missing header row"))?;
        if header.fields != R::HEADER {
            return Err(Error::corrupt(
                &self.path,
                header.line,
                format!(
                    "header mismatch: expected {:?}, found {:?}",
                    R::HEADER,
                    header.fields
                ),
            ));
        }

        let records = rows
            .map(|row| {
                if row.fields.len() != R::HEADER.len() {
                    return Err(Error::corrupt(
                        &self.path,
                        row.line,
                        format!(
                            "expected {} fields, found {}",
                            R::HEADER.len(),
                            row.fields.len()
                        ),
                    ));
                }
                R::from_row(row.fields).map_err(|msg| Error::corrupt(&self.path, row.line, msg))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Read {} {} records from {}",
            records.len(),
            R::KIND,
            self.path.display()
        );
        Ok(records)
    }

    fn append_locked(&self, record: &R) -> Result<()> {
        let io_err = |e: std::io::Error| Error::storage_io(&self.path, e);
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;

        // A hand-edited file may lack its final newline.
        let len = file.metadata().map_err(io_err)?.len();
        let mut line = String::new();
        if len > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1)).map_err(io_err)?;
            file.read_exact(&mut last).map_err(io_err)?;
            if last[0] != b'\n' && last[0] != b'\r' {
                line.push('\n');
            }
        }
        line.push_str(&csv::encode_row(&record.to_row()));

        file.write_all(line.as_bytes()).map_err(io_err)?;
        file.sync_data().map_err(io_err)?;
        Ok(())
    }

    fn rewrite_locked(&self, records: &[R]) -> Result<()> {
        let mut body = csv::encode_row(R::HEADER);
        for record in records {
            body.push_str(&csv::encode_row(&record.to_row()));
        }

        if self.atomic_rewrite {
            let tmp = self.temp_path();
            let replaced = write_synced(&tmp, body.as_bytes())
                .map_err(|e| Error::storage_io(&tmp, e))
                .and_then(|()| {
                    fs::rename(&tmp, &self.path).map_err(|e| Error::storage_io(&self.path, e))
                });
            if let Err(e) = replaced {
                warn!("Rewrite of {} failed: {}", self.path.display(), e);
                match fs::remove_file(&tmp) {
                    Err(cleanup) if cleanup.kind() != ErrorKind::NotFound => {
                        warn!("Failed to remove {}: {}", tmp.display(), cleanup);
                    }
                    _ => {}
                }
                return Err(e);
            }
        } else {
            fs::write(&self.path, body.as_bytes()).map_err(|e| Error::storage_io(&self.path, e))?;
        }

        debug!(
            "Rewrote {} with {} {} records",
            self.path.display(),
            records.len(),
            R::KIND
        );
        Ok(())
    }

    fn next_id_locked(&self) -> Result<u64> {
        let max = match self.read_locked() {
            Ok(records) => records.iter().map(Record::id).max(),
            Err(e) => {
                warn!("Allocating id 1 for {}: {}", R::KIND, e);
                None
            }
        };
        match max {
            None => Ok(1),
            Some(max) => max.checked_add(1).ok_or_else(|| {
                Error::internal(format!(
                    "no {} identifiers left in {}",
                    R::KIND,
                    self.path.display()
                ))
            }),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Both collections, opened from one storage configuration.
#[derive(Debug)]
pub struct RecordStore {
    students: Collection<Student>,
    attendance: Collection<AttendanceRecord>,
}

impl RecordStore {
    /// Open (and if necessary initialize) both collection files.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory or either file cannot be created.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let students = Collection::open(config.students_path(), config.atomic_rewrite)?;
        let attendance = Collection::open(config.attendance_path(), config.atomic_rewrite)?;
        info!(
            "Record store ready in {}",
            config.data_dir().display()
        );
        Ok(Self {
            students,
            attendance,
        })
    }

    /// The students collection.
    #[must_use]
    pub fn students(&self) -> &Collection<Student> {
        &self.students
    }

    /// The attendance collection.
    #[must_use]
    pub fn attendance(&self) -> &Collection<AttendanceRecord> {
        &self.attendance
    }
}

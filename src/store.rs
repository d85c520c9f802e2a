use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::record::{ResponseRecord, ResponseRow};
use crate::Error;

/// Single key under which the whole response table is kept.
pub const STORAGE_KEY: &str = "responses";

/// Durable string key-value storage the response table is written to.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), Error>;
}

/// Process-local storage. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a sibling temp file first so a crash never leaves half a table.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), Error> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Result of reading the persisted table.
#[derive(Debug)]
pub struct Loaded {
    pub records: Vec<ResponseRecord>,
    /// Set when stored data existed but could not be used; `records` is then empty.
    pub notice: Option<Error>,
}

/// Read the response table from `storage`.
///
/// Never fails: unreadable or corrupt data yields an empty table plus a notice.
pub fn load<S: KeyValueStore + ?Sized>(storage: &S) -> Loaded {
    match read_records(storage) {
        Ok(records) => Loaded {
            records,
            notice: None,
        },
        Err(err) => {
            warn!(error = %err, "stored responses are unusable, starting empty");
            Loaded {
                records: Vec::new(),
                notice: Some(err),
            }
        }
    }
}

fn read_records<S: KeyValueStore + ?Sized>(storage: &S) -> Result<Vec<ResponseRecord>, Error> {
    match storage.get_item(STORAGE_KEY)? {
        Some(blob) => decode(&blob),
        None => Ok(Vec::new()),
    }
}

fn decode(blob: &str) -> Result<Vec<ResponseRecord>, Error> {
    let rows: Vec<ResponseRow> = serde_json::from_str(blob)
        .map_err(|e| Error::MalformedPersistedData(e.to_string()))?;
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            ResponseRecord::try_from(row)
                .map_err(|e| Error::MalformedPersistedData(format!("row {index}: {e}")))
        })
        .collect()
}

fn encode(records: &[ResponseRecord]) -> Result<String, Error> {
    let rows = records.iter().map(ResponseRow::from).collect::<Vec<_>>();
    Ok(serde_json::to_string(&rows)?)
}

/// Live figures shown on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub count: usize,
    /// `None` while there is no data.
    pub mean_smeq: Option<f64>,
    pub mean_self_esteem: Option<f64>,
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Entries Submitted: {}", self.count)?;
        match self.mean_smeq {
            Some(mean) => writeln!(f, "Average Social Media Score: {mean:.2} / 35")?,
            None => writeln!(f, "Average Social Media Score: no data")?,
        }
        match self.mean_self_esteem {
            Some(mean) => write!(f, "Average Self-Esteem Score: {mean:.2} / 40"),
            None => write!(f, "Average Self-Esteem Score: no data"),
        }
    }
}

/// Session state: the ordered response table plus the storage it is mirrored to.
///
/// Every mutation rewrites the full table under [`STORAGE_KEY`]. If that write
/// fails the mutation is undone, so memory and storage never diverge.
#[derive(Debug)]
pub struct ResponseStore<S: KeyValueStore> {
    storage: S,
    records: Vec<ResponseRecord>,
    notice: Option<Error>,
}

impl<S: KeyValueStore> ResponseStore<S> {
    /// Hydrate from `storage`. A load problem is kept for [`Self::take_notice`].
    pub fn open(storage: S) -> Self {
        let Loaded { records, notice } = load(&storage);
        info!(count = records.len(), "responses loaded");
        Self {
            storage,
            records,
            notice,
        }
    }

    /// The non-fatal load problem, if any. Returned once.
    pub fn take_notice(&mut self) -> Option<Error> {
        self.notice.take()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn records(&self) -> &[ResponseRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&ResponseRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Add a submission to the end of the table and persist.
    pub fn append(&mut self, record: ResponseRecord) -> Result<(), Error> {
        self.records.push(record);
        if let Err(err) = self.persist() {
            self.records.pop();
            warn!(error = %err, "append rolled back");
            return Err(err);
        }
        info!(count = self.records.len(), "response recorded");
        Ok(())
    }

    /// Remove the row at `index` and persist. Later rows shift down by one.
    pub fn delete_at(&mut self, index: usize) -> Result<ResponseRecord, Error> {
        let len = self.records.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        let removed = self.records.remove(index);
        if let Err(err) = self.persist() {
            self.records.insert(index, removed);
            warn!(index, error = %err, "delete rolled back");
            return Err(err);
        }
        info!(index, count = self.records.len(), "response deleted");
        Ok(removed)
    }

    pub fn aggregate(&self) -> Aggregate {
        let count = self.records.len();
        if count == 0 {
            return Aggregate {
                count,
                mean_smeq: None,
                mean_self_esteem: None,
            };
        }
        let (smeq, self_esteem) = self.records.iter().fold((0u64, 0u64), |(a, b), r| {
            (
                a + u64::from(r.smeq_score()),
                b + u64::from(r.self_esteem_score()),
            )
        });
        Aggregate {
            count,
            mean_smeq: Some(smeq as f64 / count as f64),
            mean_self_esteem: Some(self_esteem as f64 / count as f64),
        }
    }

    /// End the session and hand the storage back.
    pub fn close(self) -> S {
        debug!(count = self.records.len(), "session closed");
        self.storage
    }

    fn persist(&mut self) -> Result<(), Error> {
        let blob = encode(&self.records)?;
        self.storage
            .set_item(STORAGE_KEY, &blob)
            .map_err(|e| Error::PersistWrite(e.to_string()))?;
        debug!(count = self.records.len(), bytes = blob.len(), "responses persisted");
        Ok(())
    }
}

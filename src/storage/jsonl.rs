//! JSONL (JSON Lines) reading.
//!
//! Each line is a valid JSON object representing one entity. Line order is
//! preserved, which matters for pick rows.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{StorageConfig, StorageError};

/// Entity files in the data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Pick,
    Event,
    Match,
    Card,
    Pool,
}

impl EntityType {
    /// Get the filename for this entity type.
    pub fn filename(&self) -> &'static str {
        match self {
            EntityType::Pick => "picks.jsonl",
            EntityType::Event => "events.jsonl",
            EntityType::Match => "matches.jsonl",
            EntityType::Card => "cards.jsonl",
            EntityType::Pool => "pools.jsonl",
        }
    }
}

/// Typed reader over one JSONL file.
///
/// [`iter`](Self::iter) is strict; [`read_all`](Self::read_all) tolerates a
/// missing file and malformed rows.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn for_entity(config: &StorageConfig, entity: EntityType) -> Self {
        Self::new(config.entity_path(entity))
    }

    /// Rows in file order, failing on the first unreadable or malformed line.
    pub fn iter(&self) -> Result<JsonlIterator<T>, StorageError> {
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::PathNotFound(self.path.clone()),
            _ => StorageError::Io(e),
        })?;

        Ok(JsonlIterator {
            path: self.path.clone(),
            lines: BufReader::new(file).lines(),
            line: 0,
            _marker: PhantomData,
        })
    }

    /// Every well-formed row in file order.
    ///
    /// An absent file reads as empty; malformed rows are logged and dropped.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        let rows = match self.iter() {
            Ok(rows) => rows,
            Err(StorageError::PathNotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut entities = Vec::new();
        for row in rows {
            match row {
                Ok(entity) => entities.push(entity),
                Err(err @ StorageError::BadLine { .. }) => warn!("Skipping row: {}", err),
                Err(e) => return Err(e),
            }
        }

        debug!("Read {} rows from {:?}", entities.len(), self.path);
        Ok(entities)
    }
}

/// Strict row iterator returned by [`JsonlReader::iter`]. Blank lines are
/// skipped; parse failures carry their 1-based line number.
pub struct JsonlIterator<T> {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line: usize,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> Iterator for JsonlIterator<T> {
    type Item = Result<T, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        for text in self.lines.by_ref() {
            self.line += 1;
            let text = match text {
                Ok(text) => text,
                Err(e) => return Some(Err(StorageError::Io(e))),
            };
            if text.trim().is_empty() {
                continue;
            }
            return Some(
                serde_json::from_str(&text).map_err(|source| StorageError::BadLine {
                    path: self.path.clone(),
                    line: self.line,
                    source,
                }),
            );
        }
        None
    }
}

//! Persisted known-vocabulary codes: IRI → 3-byte big-endian code

use super::schema::Table;
use super::storage::{PersistentStorage, StorageError, StorageResult};
use std::sync::Arc;
use tracing::debug;

pub struct DictionaryStore {
    storage: Arc<PersistentStorage>,
}

impl DictionaryStore {
    pub fn new(storage: Arc<PersistentStorage>) -> Self {
        Self { storage }
    }

    /// Every persisted `(iri, code)` pair
    pub fn load(&self) -> StorageResult<Vec<(String, u32)>> {
        let entries = self.storage.entries(Table::KnownVocabularies, b"")?;
        let mut loaded = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let iri = String::from_utf8(key)
                .map_err(|e| StorageError::CorruptedRow(format!("vocabulary IRI: {}", e)))?;
            let code = match value.as_slice() {
                [a, b, c] => u32::from_be_bytes([0, *a, *b, *c]),
                other => {
                    return Err(StorageError::CorruptedRow(format!(
                        "vocabulary code for {} has {} bytes",
                        iri,
                        other.len()
                    )))
                }
            };
            loaded.push((iri, code));
        }
        debug!("Loaded {} known-vocabulary entries", loaded.len());
        Ok(loaded)
    }

    /// Persist new entries; existing ones are never rewritten
    pub fn save(&self, entries: &[(String, u32)]) -> StorageResult<()> {
        for (iri, code) in entries {
            let bytes = code.to_be_bytes();
            self.storage
                .put(Table::KnownVocabularies, iri.as_bytes(), &bytes[1..])?;
        }
        Ok(())
    }
}

//! Persistent namespace registry

use crate::persistence::schema::{stored_prefix, visible_prefix};
use crate::persistence::{PersistentStorage, StorageError, StorageResult, Table};
use crate::rdf::Namespace;
use std::sync::Arc;

/// Prefix → namespace IRI table. The empty prefix is stored under a sentinel.
pub struct NamespaceRegistry {
    storage: Arc<PersistentStorage>,
}

impl NamespaceRegistry {
    pub fn new(storage: Arc<PersistentStorage>) -> Self {
        Self { storage }
    }

    fn utf8(bytes: Vec<u8>) -> StorageResult<String> {
        String::from_utf8(bytes).map_err(|e| StorageError::CorruptedRow(format!("namespace: {}", e)))
    }

    /// Namespace IRI bound to `prefix`
    pub fn get(&self, prefix: &str) -> StorageResult<Option<String>> {
        self.storage
            .get(Table::Namespaces, stored_prefix(prefix).as_bytes())?
            .map(Self::utf8)
            .transpose()
    }

    /// Bind `prefix`, replacing any previous binding
    pub fn set(&self, prefix: &str, iri: &str) -> StorageResult<()> {
        self.storage
            .put(Table::Namespaces, stored_prefix(prefix).as_bytes(), iri.as_bytes())
    }

    pub fn remove(&self, prefix: &str) -> StorageResult<()> {
        self.storage
            .delete(Table::Namespaces, stored_prefix(prefix).as_bytes())
    }

    /// Every binding, ordered by prefix
    pub fn list(&self) -> StorageResult<Vec<Namespace>> {
        self.storage
            .entries(Table::Namespaces, b"")?
            .into_iter()
            .map(|(prefix, iri)| {
                let prefix = Self::utf8(prefix)?;
                Ok(Namespace::new(visible_prefix(&prefix), Self::utf8(iri)?))
            })
            .collect()
    }

    pub fn clear(&self) -> StorageResult<()> {
        self.storage.truncate(Table::Namespaces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::RetryPolicy;
    use tempfile::TempDir;

    fn open() -> (TempDir, NamespaceRegistry) {
        let temp_dir = TempDir::new().unwrap();
        let storage =
            Arc::new(PersistentStorage::open(temp_dir.path(), RetryPolicy::default()).unwrap());
        (temp_dir, NamespaceRegistry::new(storage))
    }

    #[test]
    fn test_crud() {
        let (_dir, registry) = open();
        assert_eq!(registry.get("ex").unwrap(), None);

        registry.set("ex", "http://example.org/").unwrap();
        registry.set("foaf", "http://xmlns.com/foaf/0.1/").unwrap();
        assert_eq!(registry.get("ex").unwrap().as_deref(), Some("http://example.org/"));

        registry.set("ex", "http://example.com/").unwrap();
        assert_eq!(registry.get("ex").unwrap().as_deref(), Some("http://example.com/"));

        registry.remove("ex").unwrap();
        assert_eq!(registry.get("ex").unwrap(), None);
        assert_eq!(
            registry.list().unwrap(),
            vec![Namespace::new("foaf", "http://xmlns.com/foaf/0.1/")]
        );

        registry.clear().unwrap();
        assert!(registry.list().unwrap().is_empty());
    }

    #[test]
    fn test_empty_prefix() {
        let (_dir, registry) = open();
        registry.set("", "http://example.org/default#").unwrap();
        assert_eq!(
            registry.get("").unwrap().as_deref(),
            Some("http://example.org/default#")
        );
        assert_eq!(
            registry.list().unwrap(),
            vec![Namespace::new("", "http://example.org/default#")]
        );
        registry.remove("").unwrap();
        assert!(registry.list().unwrap().is_empty());
    }
}

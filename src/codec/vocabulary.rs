//! Known-vocabulary dictionary
//!
//! Well-known ontology IRIs get a small integer code so they encode to four
//! bytes. Codes are handed out in arrival order, persisted, and never reused:
//! a refresh keeps every persisted entry and appends what the providers add.

use super::vocabularies;
use super::{CodecError, CodecResult};
use crate::rdf::NamedNode;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

/// Source of well-known IRIs
pub trait VocabularyProvider: Send + Sync {
    /// Namespace IRI the values live under
    fn namespace(&self) -> &str;

    /// Every IRI of the vocabulary, in a stable order
    fn values(&self) -> Vec<NamedNode>;
}

/// Vocabulary given as a namespace plus a static list of local names
#[derive(Debug, Clone, Copy)]
pub struct StaticVocabulary {
    namespace: &'static str,
    local_names: &'static [&'static str],
}

impl StaticVocabulary {
    pub const fn new(namespace: &'static str, local_names: &'static [&'static str]) -> Self {
        Self {
            namespace,
            local_names,
        }
    }
}

impl VocabularyProvider for StaticVocabulary {
    fn namespace(&self) -> &str {
        self.namespace
    }

    fn values(&self) -> Vec<NamedNode> {
        self.local_names
            .iter()
            .filter_map(|local| NamedNode::new(&format!("{}{}", self.namespace, local)).ok())
            .collect()
    }
}

/// RDF, RDFS, OWL, XSD, FOAF, DC, DC terms and SKOS
pub fn builtin_vocabularies() -> Vec<Box<dyn VocabularyProvider>> {
    vec![
        Box::new(vocabularies::RDF),
        Box::new(vocabularies::RDFS),
        Box::new(vocabularies::OWL),
        Box::new(vocabularies::XSD),
        Box::new(vocabularies::FOAF),
        Box::new(vocabularies::DC),
        Box::new(vocabularies::DCTERMS),
        Box::new(vocabularies::SKOS),
    ]
}

/// Immutable IRI ↔ code dictionary
#[derive(Debug, Default)]
pub struct KnownVocabulary {
    codes: FxHashMap<String, u32>,
    values: FxHashMap<u32, NamedNode>,
}

impl KnownVocabulary {
    /// Largest code a 3-byte payload can carry
    pub const MAX_CODE: u32 = 0x00FF_FFFF;

    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge persisted entries with the providers' current values.
    ///
    /// Returns the dictionary and the entries that were not persisted yet, in
    /// code order. New codes continue after the highest persisted one; the
    /// first code ever assigned is 1.
    pub fn refresh(
        persisted: Vec<(String, u32)>,
        providers: &[Box<dyn VocabularyProvider>],
    ) -> CodecResult<(Self, Vec<(String, u32)>)> {
        let mut dictionary = Self::empty();
        let mut counter = 0u32;

        for (iri, code) in persisted {
            if code == 0 || code > Self::MAX_CODE {
                return Err(CodecError::Malformed(format!(
                    "persisted vocabulary code {} for {} is out of range",
                    code, iri
                )));
            }
            let node = NamedNode::new(&iri).map_err(|e| CodecError::Malformed(e.to_string()))?;
            counter = counter.max(code);
            dictionary.insert(node, code);
        }
        let loaded = dictionary.len();

        let mut added = Vec::new();
        for provider in providers {
            let mut fresh = 0usize;
            for value in provider.values() {
                if dictionary.codes.contains_key(value.as_str()) {
                    continue;
                }
                if counter >= Self::MAX_CODE {
                    return Err(CodecError::DictionaryFull(dictionary.len()));
                }
                counter += 1;
                added.push((value.as_str().to_string(), counter));
                dictionary.insert(value, counter);
                fresh += 1;
            }
            debug!(
                "Vocabulary {} contributed {} new entries",
                provider.namespace(),
                fresh
            );
        }

        info!(
            "Known vocabulary ready: {} persisted, {} added",
            loaded,
            added.len()
        );
        Ok((dictionary, added))
    }

    fn insert(&mut self, node: NamedNode, code: u32) {
        self.codes.insert(node.as_str().to_string(), code);
        self.values.insert(code, node);
    }

    /// Code assigned to an IRI
    pub fn code_of(&self, iri: &str) -> Option<u32> {
        self.codes.get(iri).copied()
    }

    /// IRI behind a code
    pub fn value_of(&self, code: u32) -> Option<&NamedNode> {
        self.values.get(&code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

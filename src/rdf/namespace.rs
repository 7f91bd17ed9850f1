//! Namespace declarations and IRI splitting
//!
//! A [`Namespace`] is the prefix → namespace IRI pair kept by the persistent
//! registry. [`split_iri`] cuts an IRI into namespace and local name, which the
//! fixed-namespace value coder keys on.

use serde::{Deserialize, Serialize};

/// Namespace (prefix → IRI mapping)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    /// Prefix, possibly empty
    pub prefix: String,
    /// Namespace IRI
    pub iri: String,
}

impl Namespace {
    /// Create a new namespace
    pub fn new(prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            iri: iri.into(),
        }
    }
}

/// Index where the local name starts.
///
/// The namespace ends after the first `#`, otherwise after the last `/`,
/// otherwise after the last `:`. Returns `None` for strings with none of these.
pub fn local_name_index(iri: &str) -> Option<usize> {
    if let Some(i) = iri.find('#') {
        return Some(i + 1);
    }
    if let Some(i) = iri.rfind('/') {
        return Some(i + 1);
    }
    iri.rfind(':').map(|i| i + 1)
}

/// Split an IRI into `(namespace, local_name)`
pub fn split_iri(iri: &str) -> Option<(&str, &str)> {
    local_name_index(iri).map(|i| iri.split_at(i))
}

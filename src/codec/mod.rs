//! Compact binary encoding of RDF values
//!
//! Every stored value becomes an [`EncodedKey`]: one marker byte followed by a
//! coder-specific payload. The marker packs the value kind in its low two bits
//! and the index of the coder that produced the key in the next five:
//!
//! ```text
//!  bit  7   6   5   4   3   2   1   0
//!     | r | coder index (0-31)  | kind  |
//! ```
//!
//! The single byte `0x00` is reserved for the default graph. No coder produces
//! it: every coder emits at least one payload byte after the marker.
//!
//! [`CoderFacade`] owns one ordered coder list per value kind and dispatches
//! encode (first match wins) and decode (by marker).

mod coders;
mod facade;
mod vocabularies;
mod vocabulary;

pub use coders::{
    BlankNodeUtf8Coder, FixedNamespaceCoder, GenericLiteralCoder, IriUtf8Coder,
    KnownVocabularyCoder, LanguageLiteralCoder, PrimitiveDatatypeCoder, ValueCoder,
    PRIMITIVE_DATATYPES,
};
pub use facade::{CoderFacade, DEFAULT_FIXED_NAMESPACES};
pub use vocabulary::{
    builtin_vocabularies, KnownVocabulary, StaticVocabulary, VocabularyProvider,
};

use crate::rdf::RdfError;
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use thiserror::Error;

/// Low two marker bits: value kind
pub const KIND_MASK: u8 = 0b0000_0011;
/// Next five marker bits: coder index
pub const CODER_MASK: u8 = 0b0111_1100;
/// Most significant marker bit, must stay clear
pub const RESERVED_MASK: u8 = 0b1000_0000;
/// Coders per kind addressable by the marker
pub const MAX_CODERS_PER_KIND: usize = 32;

/// Codec errors
#[derive(Error, Debug)]
pub enum CodecError {
    /// Every coder of a group declined the value
    #[error("No coder accepted a {kind:?} value: {value}")]
    NoCoder { kind: ValueKind, value: String },

    /// Marker names a coder slot that is not registered
    #[error("Unknown coder index {index} for {kind:?} keys")]
    UnknownCoder { kind: ValueKind, index: usize },

    /// Zero-length key
    #[error("Encoded key is empty")]
    EmptyKey,

    /// The default-graph sentinel was decoded as a value
    #[error("Default-graph sentinel cannot be decoded as a value")]
    ReservedKey,

    /// Payload does not fit the coder named by the marker
    #[error("Malformed key: {0}")]
    Malformed(String),

    /// Known-vocabulary dictionary ran out of 3-byte codes
    #[error("Known-vocabulary dictionary is full ({0} entries)")]
    DictionaryFull(usize),

    /// A decoded value is not allowed in its quad position
    #[error(transparent)]
    Rdf(#[from] RdfError),
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Value kind stored in the low marker bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueKind {
    LanguageLiteral = 0,
    Identifier = 1,
    BlankNode = 2,
    TypedLiteral = 3,
}

impl ValueKind {
    /// Decode the kind from a marker byte
    pub fn from_marker(marker: u8) -> Self {
        match marker & KIND_MASK {
            0 => ValueKind::LanguageLiteral,
            1 => ValueKind::Identifier,
            2 => ValueKind::BlankNode,
            _ => ValueKind::TypedLiteral,
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// Build a marker byte
pub fn marker(kind: ValueKind, coder_index: usize) -> u8 {
    debug_assert!(coder_index < MAX_CODERS_PER_KIND);
    ((coder_index as u8) << 2) | kind.bits()
}

/// Encoded value: marker byte + payload
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EncodedKey(Bytes);

impl EncodedKey {
    /// Key for the default graph
    pub const DEFAULT_GRAPH: &'static [u8] = &[0x00];

    /// Assemble a key from its marker parts and payload
    pub fn new(kind: ValueKind, coder_index: usize, payload: &[u8]) -> Self {
        let mut buf = BytesMut::with_capacity(payload.len() + 1);
        buf.put_u8(marker(kind, coder_index));
        buf.put_slice(payload);
        Self(buf.freeze())
    }

    /// Wrap raw bytes read back from storage
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// The default-graph sentinel
    pub fn default_graph() -> Self {
        Self(Bytes::from_static(Self::DEFAULT_GRAPH))
    }

    pub fn is_default_graph(&self) -> bool {
        self.0.as_ref() == Self::DEFAULT_GRAPH
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Marker byte, validated
    pub fn marker(&self) -> CodecResult<u8> {
        let m = *self.0.first().ok_or(CodecError::EmptyKey)?;
        if m & RESERVED_MASK != 0 {
            return Err(CodecError::Malformed(format!(
                "reserved marker bit set in 0x{:02x}",
                m
            )));
        }
        Ok(m)
    }

    pub fn kind(&self) -> CodecResult<ValueKind> {
        self.marker().map(ValueKind::from_marker)
    }

    pub fn coder_index(&self) -> CodecResult<usize> {
        self.marker().map(|m| ((m & CODER_MASK) >> 2) as usize)
    }

    /// Bytes after the marker
    pub fn payload(&self) -> &[u8] {
        self.0.get(1..).unwrap_or_default()
    }
}

impl AsRef<[u8]> for EncodedKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for EncodedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedKey(")?;
        for b in self.0.iter() {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}

/// A quad with every position encoded; `context` is the sentinel for the default graph
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedQuad {
    pub subject: EncodedKey,
    pub predicate: EncodedKey,
    pub object: EncodedKey,
    pub context: EncodedKey,
}

impl EncodedQuad {
    pub fn new(
        subject: EncodedKey,
        predicate: EncodedKey,
        object: EncodedKey,
        context: EncodedKey,
    ) -> Self {
        Self {
            subject,
            predicate,
            object,
            context,
        }
    }

    pub fn in_default_graph(&self) -> bool {
        self.context.is_default_graph()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_layout() {
        assert_eq!(marker(ValueKind::LanguageLiteral, 0), 0b0000_0000);
        assert_eq!(marker(ValueKind::Identifier, 0), 0b0000_0001);
        assert_eq!(marker(ValueKind::BlankNode, 0), 0b0000_0010);
        assert_eq!(marker(ValueKind::TypedLiteral, 1), 0b0000_0111);
        assert_eq!(marker(ValueKind::Identifier, 31), 0b0111_1101);
    }

    #[test]
    fn test_key_accessors() {
        let key = EncodedKey::new(ValueKind::Identifier, 2, b"http://example.org/a");
        assert_eq!(key.kind().unwrap(), ValueKind::Identifier);
        assert_eq!(key.coder_index().unwrap(), 2);
        assert_eq!(key.payload(), b"http://example.org/a");
        assert!(!key.is_default_graph());
    }

    #[test]
    fn test_default_graph_sentinel() {
        let sentinel = EncodedKey::default_graph();
        assert_eq!(sentinel.as_bytes(), &[0x00]);
        assert!(sentinel.is_default_graph());
        assert!(EncodedKey::from_bytes(vec![0u8]).is_default_graph());
        assert!(!EncodedKey::new(ValueKind::LanguageLiteral, 0, b"\"a\"@en").is_default_graph());
    }

    #[test]
    fn test_invalid_markers() {
        assert!(matches!(
            EncodedKey::from_bytes(Vec::<u8>::new()).marker(),
            Err(CodecError::EmptyKey)
        ));
        assert!(matches!(
            EncodedKey::from_bytes(vec![0x81u8, 1]).marker(),
            Err(CodecError::Malformed(_))
        ));
    }
}

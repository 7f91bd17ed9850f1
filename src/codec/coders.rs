//! Individual value coders
//!
//! A coder turns one kind of value into a payload and back. It never writes the
//! marker byte; the facade does that from the coder's slot in its group.

use super::vocabulary::KnownVocabulary;
use super::{CodecError, CodecResult, MAX_CODERS_PER_KIND};
use crate::rdf::{split_iri, BlankNode, Literal, NamedNode};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// One encoding strategy for values of type `T`
pub trait ValueCoder<T>: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Payload for `value`, or `None` when this coder does not handle it
    fn encode(&self, value: &T) -> Option<Vec<u8>>;

    /// Rebuild the value from a payload this coder produced
    fn decode(&self, payload: &[u8]) -> CodecResult<T>;
}

fn utf8(payload: &[u8], coder: &str) -> CodecResult<String> {
    String::from_utf8(payload.to_vec())
        .map_err(|e| CodecError::Malformed(format!("{}: {}", coder, e)))
}

fn named_node(iri: &str) -> CodecResult<NamedNode> {
    NamedNode::new(iri).map_err(|e| CodecError::Malformed(e.to_string()))
}

/// IRIs from the known-vocabulary dictionary, as a 3-byte code
pub struct KnownVocabularyCoder {
    vocabulary: Arc<KnownVocabulary>,
}

impl KnownVocabularyCoder {
    pub fn new(vocabulary: Arc<KnownVocabulary>) -> Self {
        Self { vocabulary }
    }
}

impl ValueCoder<NamedNode> for KnownVocabularyCoder {
    fn name(&self) -> &'static str {
        "known-vocabulary"
    }

    fn encode(&self, value: &NamedNode) -> Option<Vec<u8>> {
        let code = self.vocabulary.code_of(value.as_str())?;
        Some(code.to_be_bytes()[1..].to_vec())
    }

    fn decode(&self, payload: &[u8]) -> CodecResult<NamedNode> {
        let bytes: [u8; 3] = payload.try_into().map_err(|_| {
            CodecError::Malformed(format!(
                "known-vocabulary payload must be 3 bytes, got {}",
                payload.len()
            ))
        })?;
        let code = u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]);
        self.vocabulary
            .value_of(code)
            .cloned()
            .ok_or_else(|| CodecError::Malformed(format!("unknown vocabulary code {}", code)))
    }
}

/// IRIs under a fixed namespace table: namespace id byte + local name
pub struct FixedNamespaceCoder {
    namespaces: Vec<String>,
    ids: FxHashMap<String, u8>,
}

impl FixedNamespaceCoder {
    pub fn new<S: AsRef<str>>(namespaces: &[S]) -> CodecResult<Self> {
        if namespaces.len() > usize::from(u8::MAX) + 1 {
            return Err(CodecError::Malformed(format!(
                "at most 256 fixed namespaces are addressable, got {}",
                namespaces.len()
            )));
        }
        let namespaces: Vec<String> = namespaces.iter().map(|n| n.as_ref().to_string()).collect();
        let mut ids = FxHashMap::default();
        for (id, ns) in namespaces.iter().enumerate() {
            // first declaration keeps its id
            ids.entry(ns.clone()).or_insert(id as u8);
        }
        Ok(Self { namespaces, ids })
    }
}

impl ValueCoder<NamedNode> for FixedNamespaceCoder {
    fn name(&self) -> &'static str {
        "fixed-namespace"
    }

    fn encode(&self, value: &NamedNode) -> Option<Vec<u8>> {
        let (namespace, local) = split_iri(value.as_str())?;
        let id = *self.ids.get(namespace)?;
        let mut payload = Vec::with_capacity(local.len() + 1);
        payload.push(id);
        payload.extend_from_slice(local.as_bytes());
        Some(payload)
    }

    fn decode(&self, payload: &[u8]) -> CodecResult<NamedNode> {
        let (&id, local) = payload
            .split_first()
            .ok_or_else(|| CodecError::Malformed("fixed-namespace payload is empty".into()))?;
        let namespace = self.namespaces.get(usize::from(id)).ok_or_else(|| {
            CodecError::Malformed(format!("unknown fixed namespace id {}", id))
        })?;
        let local = utf8(local, self.name())?;
        named_node(&format!("{}{}", namespace, local))
    }
}

/// Any IRI as its UTF-8 string
pub struct IriUtf8Coder;

impl ValueCoder<NamedNode> for IriUtf8Coder {
    fn name(&self) -> &'static str {
        "iri-utf8"
    }

    fn encode(&self, value: &NamedNode) -> Option<Vec<u8>> {
        Some(value.as_str().as_bytes().to_vec())
    }

    fn decode(&self, payload: &[u8]) -> CodecResult<NamedNode> {
        named_node(&utf8(payload, self.name())?)
    }
}

/// Any blank node as its UTF-8 identifier
pub struct BlankNodeUtf8Coder;

impl ValueCoder<BlankNode> for BlankNodeUtf8Coder {
    fn name(&self) -> &'static str {
        "blank-node-utf8"
    }

    fn encode(&self, value: &BlankNode) -> Option<Vec<u8>> {
        Some(value.as_str().as_bytes().to_vec())
    }

    fn decode(&self, payload: &[u8]) -> CodecResult<BlankNode> {
        BlankNode::from_str(&utf8(payload, self.name())?)
            .map_err(|e| CodecError::Malformed(e.to_string()))
    }
}

/// Language-tagged literals in N-Triples form
pub struct LanguageLiteralCoder;

impl ValueCoder<Literal> for LanguageLiteralCoder {
    fn name(&self) -> &'static str {
        "language-literal"
    }

    fn encode(&self, value: &Literal) -> Option<Vec<u8>> {
        value.language()?;
        Some(value.to_ntriples().into_bytes())
    }

    fn decode(&self, payload: &[u8]) -> CodecResult<Literal> {
        let literal = Literal::from_ntriples(&utf8(payload, self.name())?)
            .map_err(|e| CodecError::Malformed(e.to_string()))?;
        if literal.language().is_none() {
            return Err(CodecError::Malformed(format!(
                "{} has no language tag",
                literal
            )));
        }
        Ok(literal)
    }
}

/// Primitive XML Schema datatypes. The position is the datatype id and is
/// part of the persisted key format.
pub const PRIMITIVE_DATATYPES: [&str; 21] = [
    "http://www.w3.org/2001/XMLSchema#boolean",
    "http://www.w3.org/2001/XMLSchema#base64Binary",
    "http://www.w3.org/2001/XMLSchema#hexBinary",
    "http://www.w3.org/2001/XMLSchema#float",
    "http://www.w3.org/2001/XMLSchema#decimal",
    "http://www.w3.org/2001/XMLSchema#integer",
    "http://www.w3.org/2001/XMLSchema#int",
    "http://www.w3.org/2001/XMLSchema#double",
    "http://www.w3.org/2001/XMLSchema#anyURI",
    "http://www.w3.org/2001/XMLSchema#QName",
    "http://www.w3.org/2001/XMLSchema#NOTATION",
    "http://www.w3.org/2001/XMLSchema#string",
    "http://www.w3.org/2001/XMLSchema#duration",
    "http://www.w3.org/2001/XMLSchema#dateTime",
    "http://www.w3.org/2001/XMLSchema#time",
    "http://www.w3.org/2001/XMLSchema#date",
    "http://www.w3.org/2001/XMLSchema#gYearMonth",
    "http://www.w3.org/2001/XMLSchema#gYear",
    "http://www.w3.org/2001/XMLSchema#gMonthDay",
    "http://www.w3.org/2001/XMLSchema#gDay",
    "http://www.w3.org/2001/XMLSchema#gMonth",
];

/// Typed literals with a primitive datatype: datatype id byte + lexical form
pub struct PrimitiveDatatypeCoder {
    ids: FxHashMap<&'static str, u8>,
}

impl PrimitiveDatatypeCoder {
    pub fn new() -> Self {
        let ids = PRIMITIVE_DATATYPES
            .iter()
            .enumerate()
            .map(|(id, iri)| (*iri, id as u8))
            .collect();
        Self { ids }
    }
}

impl Default for PrimitiveDatatypeCoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueCoder<Literal> for PrimitiveDatatypeCoder {
    fn name(&self) -> &'static str {
        "primitive-datatype"
    }

    fn encode(&self, value: &Literal) -> Option<Vec<u8>> {
        if value.language().is_some() {
            return None;
        }
        let id = *self.ids.get(value.datatype_iri())?;
        let lexical = value.value().as_bytes();
        let mut payload = Vec::with_capacity(lexical.len() + 1);
        payload.push(id);
        payload.extend_from_slice(lexical);
        Some(payload)
    }

    fn decode(&self, payload: &[u8]) -> CodecResult<Literal> {
        let (&id, lexical) = payload
            .split_first()
            .ok_or_else(|| CodecError::Malformed("primitive-datatype payload is empty".into()))?;
        let datatype = PRIMITIVE_DATATYPES
            .get(usize::from(id))
            .ok_or_else(|| CodecError::Malformed(format!("unknown datatype id {}", id)))?;
        Ok(Literal::new_typed_literal(
            utf8(lexical, self.name())?,
            named_node(datatype)?,
        ))
    }
}

/// Any literal in N-Triples form
pub struct GenericLiteralCoder;

impl ValueCoder<Literal> for GenericLiteralCoder {
    fn name(&self) -> &'static str {
        "generic-literal"
    }

    fn encode(&self, value: &Literal) -> Option<Vec<u8>> {
        Some(value.to_ntriples().into_bytes())
    }

    fn decode(&self, payload: &[u8]) -> CodecResult<Literal> {
        Literal::from_ntriples(&utf8(payload, self.name())?)
            .map_err(|e| CodecError::Malformed(e.to_string()))
    }
}

/// Ordered coders for one value kind
pub(crate) struct CoderGroup<T> {
    pub(crate) kind: super::ValueKind,
    coders: Vec<Box<dyn ValueCoder<T>>>,
}

impl<T: std::fmt::Display> CoderGroup<T> {
    pub(crate) fn new(kind: super::ValueKind, coders: Vec<Box<dyn ValueCoder<T>>>) -> Self {
        debug_assert!(coders.len() <= MAX_CODERS_PER_KIND);
        Self { kind, coders }
    }

    /// First coder that accepts the value wins
    pub(crate) fn encode(&self, value: &T) -> CodecResult<super::EncodedKey> {
        for (index, coder) in self.coders.iter().enumerate() {
            if let Some(payload) = coder.encode(value) {
                return Ok(super::EncodedKey::new(self.kind, index, &payload));
            }
        }
        Err(CodecError::NoCoder {
            kind: self.kind,
            value: value.to_string(),
        })
    }

    pub(crate) fn decode(&self, index: usize, payload: &[u8]) -> CodecResult<T> {
        let coder = self.coders.get(index).ok_or(CodecError::UnknownCoder {
            kind: self.kind,
            index,
        })?;
        coder.decode(payload)
    }
}

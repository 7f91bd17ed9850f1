//! RDF type definitions
//!
//! This module provides wrapper types around the oxrdf library for RDF primitives,
//! plus the pattern types used to address stored quads.

use oxrdf::{
    BlankNode as OxBlankNode, Literal as OxLiteral, NamedNode as OxNamedNode,
    Subject as OxSubject, Term as OxTerm,
};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// RDF errors
#[derive(Error, Debug)]
pub enum RdfError {
    /// Invalid IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    /// Invalid blank node
    #[error("Invalid blank node: {0}")]
    InvalidBlankNode(String),

    /// Invalid literal
    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),

    /// A value of the wrong kind was used in a position that forbids it
    #[error("{value} cannot be used as {position}")]
    InvalidPosition {
        value: String,
        position: &'static str,
    },
}

pub type RdfResult<T> = Result<T, RdfError>;

/// Named node (IRI)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedNode(OxNamedNode);

impl NamedNode {
    /// Create a new named node from an IRI string
    pub fn new(iri: &str) -> RdfResult<Self> {
        OxNamedNode::new(iri)
            .map(Self)
            .map_err(|e| RdfError::InvalidIri(e.to_string()))
    }

    /// Get the IRI string
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Get the inner oxrdf NamedNode
    pub fn inner(&self) -> &OxNamedNode {
        &self.0
    }
}

impl fmt::Display for NamedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.as_str())
    }
}

impl From<OxNamedNode> for NamedNode {
    fn from(node: OxNamedNode) -> Self {
        Self(node)
    }
}

impl From<NamedNode> for OxNamedNode {
    fn from(node: NamedNode) -> Self {
        node.0
    }
}

/// Blank node (anonymous node)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlankNode(OxBlankNode);

impl BlankNode {
    /// Create a new blank node with a unique identifier
    pub fn new() -> Self {
        Self(OxBlankNode::default())
    }

    /// Create a blank node from a string identifier
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> RdfResult<Self> {
        OxBlankNode::new(s)
            .map(Self)
            .map_err(|e| RdfError::InvalidBlankNode(e.to_string()))
    }

    /// Get the blank node identifier
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Get the inner oxrdf BlankNode
    pub fn inner(&self) -> &OxBlankNode {
        &self.0
    }
}

impl Default for BlankNode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.as_str())
    }
}

impl From<OxBlankNode> for BlankNode {
    fn from(node: OxBlankNode) -> Self {
        Self(node)
    }
}

/// RDF literal value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal(OxLiteral);

impl Literal {
    /// Create a simple literal (plain string)
    pub fn new_simple_literal(value: impl Into<String>) -> Self {
        Self(OxLiteral::new_simple_literal(value))
    }

    /// Create a literal with language tag
    pub fn new_language_tagged_literal(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> RdfResult<Self> {
        OxLiteral::new_language_tagged_literal(value, language)
            .map(Self)
            .map_err(|e| RdfError::InvalidLiteral(e.to_string()))
    }

    /// Create a typed literal
    pub fn new_typed_literal(value: impl Into<String>, datatype: NamedNode) -> Self {
        Self(OxLiteral::new_typed_literal(value, datatype.0))
    }

    /// Parse a literal from its N-Triples form, e.g. `"1"^^<http://...#int>`
    pub fn from_ntriples(s: &str) -> RdfResult<Self> {
        OxLiteral::from_str(s)
            .map(Self)
            .map_err(|e| RdfError::InvalidLiteral(e.to_string()))
    }

    /// Canonical N-Triples serialization (escaped lexical form plus suffix)
    pub fn to_ntriples(&self) -> String {
        self.0.to_string()
    }

    /// Get the lexical value
    pub fn value(&self) -> &str {
        self.0.value()
    }

    /// Get the language tag if present
    pub fn language(&self) -> Option<&str> {
        self.0.language()
    }

    /// Get the datatype IRI
    pub fn datatype_iri(&self) -> &str {
        self.0.datatype().as_str()
    }

    /// Get the datatype
    pub fn datatype(&self) -> NamedNode {
        NamedNode(self.0.datatype().into_owned())
    }

    /// Get the inner oxrdf Literal
    pub fn inner(&self) -> &OxLiteral {
        &self.0
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<OxLiteral> for Literal {
    fn from(lit: OxLiteral) -> Self {
        Self(lit)
    }
}

/// RDF subject (NamedNode or BlankNode). Also the type of a named graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RdfSubject {
    /// Named node (IRI)
    NamedNode(NamedNode),
    /// Blank node
    BlankNode(BlankNode),
}

impl RdfSubject {
    /// Check if this is a named node
    pub fn is_named_node(&self) -> bool {
        matches!(self, RdfSubject::NamedNode(_))
    }

    /// Check if this is a blank node
    pub fn is_blank_node(&self) -> bool {
        matches!(self, RdfSubject::BlankNode(_))
    }
}

impl fmt::Display for RdfSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfSubject::NamedNode(n) => write!(f, "{}", n),
            RdfSubject::BlankNode(b) => write!(f, "{}", b),
        }
    }
}

impl From<NamedNode> for RdfSubject {
    fn from(node: NamedNode) -> Self {
        RdfSubject::NamedNode(node)
    }
}

impl From<BlankNode> for RdfSubject {
    fn from(node: BlankNode) -> Self {
        RdfSubject::BlankNode(node)
    }
}

impl TryFrom<OxSubject> for RdfSubject {
    type Error = RdfError;

    fn try_from(subject: OxSubject) -> RdfResult<Self> {
        match subject {
            OxSubject::NamedNode(n) => Ok(RdfSubject::NamedNode(n.into())),
            OxSubject::BlankNode(b) => Ok(RdfSubject::BlankNode(b.into())),
            #[allow(unreachable_patterns)]
            other => Err(RdfError::InvalidPosition {
                value: other.to_string(),
                position: "a subject",
            }),
        }
    }
}

impl TryFrom<RdfObject> for RdfSubject {
    type Error = RdfError;

    fn try_from(value: RdfObject) -> RdfResult<Self> {
        match value {
            RdfObject::NamedNode(n) => Ok(RdfSubject::NamedNode(n)),
            RdfObject::BlankNode(b) => Ok(RdfSubject::BlankNode(b)),
            RdfObject::Literal(l) => Err(RdfError::InvalidPosition {
                value: l.to_string(),
                position: "a subject or context",
            }),
        }
    }
}

/// RDF predicate (always a NamedNode)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RdfPredicate(NamedNode);

impl RdfPredicate {
    /// Create a new predicate from an IRI
    pub fn new(iri: &str) -> RdfResult<Self> {
        Ok(Self(NamedNode::new(iri)?))
    }

    /// Get the underlying named node
    pub fn as_named_node(&self) -> &NamedNode {
        &self.0
    }
}

impl fmt::Display for RdfPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NamedNode> for RdfPredicate {
    fn from(node: NamedNode) -> Self {
        RdfPredicate(node)
    }
}

impl From<RdfPredicate> for NamedNode {
    fn from(pred: RdfPredicate) -> Self {
        pred.0
    }
}

impl TryFrom<RdfObject> for RdfPredicate {
    type Error = RdfError;

    fn try_from(value: RdfObject) -> RdfResult<Self> {
        match value {
            RdfObject::NamedNode(n) => Ok(RdfPredicate(n)),
            other => Err(RdfError::InvalidPosition {
                value: other.to_string(),
                position: "a predicate",
            }),
        }
    }
}

/// RDF object (NamedNode, BlankNode, or Literal). Any storable value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RdfObject {
    /// Named node (IRI)
    NamedNode(NamedNode),
    /// Blank node
    BlankNode(BlankNode),
    /// Literal value
    Literal(Literal),
}

impl RdfObject {
    /// Check if this is a named node
    pub fn is_named_node(&self) -> bool {
        matches!(self, RdfObject::NamedNode(_))
    }

    /// Check if this is a blank node
    pub fn is_blank_node(&self) -> bool {
        matches!(self, RdfObject::BlankNode(_))
    }

    /// Check if this is a literal
    pub fn is_literal(&self) -> bool {
        matches!(self, RdfObject::Literal(_))
    }
}

impl fmt::Display for RdfObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfObject::NamedNode(n) => write!(f, "{}", n),
            RdfObject::BlankNode(b) => write!(f, "{}", b),
            RdfObject::Literal(l) => write!(f, "{}", l),
        }
    }
}

impl From<NamedNode> for RdfObject {
    fn from(node: NamedNode) -> Self {
        RdfObject::NamedNode(node)
    }
}

impl From<BlankNode> for RdfObject {
    fn from(node: BlankNode) -> Self {
        RdfObject::BlankNode(node)
    }
}

impl From<Literal> for RdfObject {
    fn from(lit: Literal) -> Self {
        RdfObject::Literal(lit)
    }
}

impl From<RdfSubject> for RdfObject {
    fn from(subject: RdfSubject) -> Self {
        match subject {
            RdfSubject::NamedNode(n) => RdfObject::NamedNode(n),
            RdfSubject::BlankNode(b) => RdfObject::BlankNode(b),
        }
    }
}

impl From<RdfPredicate> for RdfObject {
    fn from(predicate: RdfPredicate) -> Self {
        RdfObject::NamedNode(predicate.0)
    }
}

impl TryFrom<OxTerm> for RdfObject {
    type Error = RdfError;

    fn try_from(term: OxTerm) -> RdfResult<Self> {
        match term {
            OxTerm::NamedNode(n) => Ok(RdfObject::NamedNode(n.into())),
            OxTerm::BlankNode(b) => Ok(RdfObject::BlankNode(b.into())),
            OxTerm::Literal(l) => Ok(RdfObject::Literal(l.into())),
            #[allow(unreachable_patterns)]
            other => Err(RdfError::InvalidPosition {
                value: other.to_string(),
                position: "an object",
            }),
        }
    }
}

/// RDF quad (triple + graph)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quad {
    /// Subject
    pub subject: RdfSubject,
    /// Predicate
    pub predicate: RdfPredicate,
    /// Object
    pub object: RdfObject,
    /// Graph (None = default graph)
    pub graph: Option<RdfSubject>,
}

impl Quad {
    /// Create a new quad
    pub fn new(
        subject: RdfSubject,
        predicate: RdfPredicate,
        object: RdfObject,
        graph: Option<RdfSubject>,
    ) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph,
        }
    }

    /// Whether the quad lives in the default graph
    pub fn in_default_graph(&self) -> bool {
        self.graph.is_none()
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(graph) = &self.graph {
            write!(
                f,
                "{} {} {} {} .",
                self.subject, self.predicate, self.object, graph
            )
        } else {
            write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
        }
    }
}

/// Quad pattern for lookups and cost estimation (with optional variables)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuadPattern {
    /// Subject (None = variable)
    pub subject: Option<RdfSubject>,
    /// Predicate (None = variable)
    pub predicate: Option<RdfPredicate>,
    /// Object (None = variable)
    pub object: Option<RdfObject>,
    /// Graph (None = variable, Some(None) = default graph)
    pub graph: Option<Option<RdfSubject>>,
}

impl QuadPattern {
    /// Create a triple pattern matching any graph
    pub fn new(
        subject: Option<RdfSubject>,
        predicate: Option<RdfPredicate>,
        object: Option<RdfObject>,
    ) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph: None,
        }
    }

    /// The fully unbound pattern
    pub fn any() -> Self {
        Self::default()
    }

    /// Restrict the pattern to one graph (None = default graph)
    pub fn in_graph(mut self, graph: Option<RdfSubject>) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Number of bound subject/predicate/object positions
    pub fn bound_count(&self) -> usize {
        [
            self.subject.is_some(),
            self.predicate.is_some(),
            self.object.is_some(),
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }

    /// Check if a quad matches this pattern
    pub fn matches(&self, quad: &Quad) -> bool {
        if let Some(ref s) = self.subject {
            if s != &quad.subject {
                return false;
            }
        }
        if let Some(ref p) = self.predicate {
            if p != &quad.predicate {
                return false;
            }
        }
        if let Some(ref o) = self.object {
            if o != &quad.object {
                return false;
            }
        }
        if let Some(ref g) = self.graph {
            if g != &quad.graph {
                return false;
            }
        }
        true
    }
}

/// Which graphs a lookup or delete addresses
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GraphSelector {
    /// Every graph, the default graph included
    #[default]
    Any,
    /// An explicit list; `None` entries stand for the default graph
    Graphs(Vec<Option<RdfSubject>>),
}

impl GraphSelector {
    /// Only the default graph
    pub fn default_graph() -> Self {
        GraphSelector::Graphs(vec![None])
    }

    /// A single named graph
    pub fn named(graph: impl Into<RdfSubject>) -> Self {
        GraphSelector::Graphs(vec![Some(graph.into())])
    }

    /// Several graphs, in the order results should be produced
    pub fn graphs<I>(graphs: I) -> Self
    where
        I: IntoIterator<Item = Option<RdfSubject>>,
    {
        GraphSelector::Graphs(graphs.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_node() {
        let node = NamedNode::new("http://example.org/alice").unwrap();
        assert_eq!(node.as_str(), "http://example.org/alice");
        assert_eq!(node.to_string(), "<http://example.org/alice>");
        assert!(NamedNode::new("not an iri").is_err());
    }

    #[test]
    fn test_blank_node() {
        let node1 = BlankNode::new();
        let node2 = BlankNode::new();
        assert_ne!(node1, node2);
        assert_eq!(BlankNode::from_str("b1").unwrap().to_string(), "_:b1");
    }

    #[test]
    fn test_literal_ntriples() {
        let lit = Literal::new_language_tagged_literal("chat", "fr").unwrap();
        assert_eq!(lit.to_ntriples(), "\"chat\"@fr");
        assert_eq!(Literal::from_ntriples("\"chat\"@fr").unwrap(), lit);

        let quoted = Literal::new_simple_literal("say \"hi\"\n");
        let parsed = Literal::from_ntriples(&quoted.to_ntriples()).unwrap();
        assert_eq!(parsed, quoted);
    }

    #[test]
    fn test_position_conversions() {
        let lit: RdfObject = Literal::new_simple_literal("x").into();
        assert!(RdfSubject::try_from(lit.clone()).is_err());
        assert!(RdfPredicate::try_from(lit).is_err());

        let iri: RdfObject = NamedNode::new("http://example.org/p").unwrap().into();
        assert!(RdfPredicate::try_from(iri.clone()).is_ok());
        assert!(RdfSubject::try_from(iri).unwrap().is_named_node());
    }

    #[test]
    fn test_quad_pattern_matching() {
        let subject: RdfSubject = NamedNode::new("http://example.org/alice").unwrap().into();
        let predicate = RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap();
        let graph: RdfSubject = NamedNode::new("http://example.org/g").unwrap().into();
        let quad = Quad::new(
            subject.clone(),
            predicate.clone(),
            Literal::new_simple_literal("Alice").into(),
            Some(graph.clone()),
        );

        assert!(QuadPattern::any().matches(&quad));
        assert!(QuadPattern::new(Some(subject.clone()), None, None).matches(&quad));
        assert!(QuadPattern::new(Some(subject.clone()), Some(predicate), None)
            .in_graph(Some(graph))
            .matches(&quad));
        assert!(!QuadPattern::new(Some(subject), None, None)
            .in_graph(None)
            .matches(&quad));
    }

    #[test]
    fn test_graph_selector() {
        assert_eq!(GraphSelector::default(), GraphSelector::Any);
        assert_eq!(GraphSelector::default_graph(), GraphSelector::Graphs(vec![None]));
    }
}

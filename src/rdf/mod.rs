//! RDF value model
//!
//! Wrapper types over oxrdf for the values a quad is made of, plus the
//! pattern and graph-selection types the store is queried with.
//!
//! # Example
//!
//! ```rust
//! use quadstore::rdf::{NamedNode, Literal, Quad, QuadPattern, RdfPredicate};
//!
//! let alice = NamedNode::new("http://example.org/alice").unwrap();
//! let name = RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap();
//! let quad = Quad::new(alice.clone().into(), name, Literal::new_simple_literal("Alice").into(), None);
//!
//! let pattern = QuadPattern::new(Some(alice.into()), None, None).in_graph(None);
//! assert!(pattern.matches(&quad));
//! ```

mod namespace;
mod types;

pub use types::{
    BlankNode, GraphSelector, Literal, NamedNode, Quad, QuadPattern, RdfError, RdfObject,
    RdfPredicate, RdfResult, RdfSubject,
};

pub use namespace::{local_name_index, split_iri, Namespace};

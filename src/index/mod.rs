//! Quad indexing
//!
//! Six permutation tables answer every bound/unbound combination of
//! subject, predicate, object and context with one prefix scan.

pub mod namespaces;
pub mod scan;
pub mod shape;
pub mod store;

pub use namespaces::NamespaceRegistry;
pub use scan::{EncodedQuadIter, RowPager};
pub use shape::{ContextBinding, QueryShape};
pub use store::{ContextScan, IndexStore};

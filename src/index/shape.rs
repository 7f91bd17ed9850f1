//! Choosing the table and key prefix for a lookup

use crate::codec::EncodedKey;
use crate::persistence::schema::compose_key;
use crate::persistence::Table;
use tracing::debug;

/// How the context position of a lookup is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextBinding<'a> {
    Unbound,
    /// Only the default graph
    DefaultGraph,
    Named(&'a EncodedKey),
}

impl<'a> ContextBinding<'a> {
    /// Binding for an encoded context, the sentinel meaning the default graph
    pub fn of(context: &'a EncodedKey) -> Self {
        if context.is_default_graph() {
            ContextBinding::DefaultGraph
        } else {
            ContextBinding::Named(context)
        }
    }
}

/// A single-table prefix scan answering one lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryShape {
    pub table: Table,
    /// Row-key prefix built from the bound components in table order
    pub prefix: Vec<u8>,
    /// Number of components in the prefix
    pub bound: usize,
    /// The prefix does not cover the table's partition key
    pub relaxed: bool,
    /// Rows whose context differs are dropped after the scan
    pub context_filter: Option<EncodedKey>,
}

impl QueryShape {
    /// Select the table whose key order starts with exactly the bound
    /// components.
    ///
    /// | bound | table | prefix |
    /// |---|---|---|
    /// | - | S_POC | |
    /// | s, sp, spo | S_POC | s, p, o |
    /// | p, po | P_OSC | p, o |
    /// | o | O_SPC | o |
    /// | so | O_SPC | o, s |
    /// | c, cs, csp, cspo | CS_PO | c, s, p, o |
    /// | cp, cpo | CP_OS | c, p, o |
    /// | co, cso | CO_SP | c, o, s |
    ///
    /// The default graph has no rows in the context-first tables, so it uses
    /// the context-agnostic shape and filters on the sentinel (or appends the
    /// sentinel when subject, predicate and object are all bound).
    pub fn select(
        subject: Option<&EncodedKey>,
        predicate: Option<&EncodedKey>,
        object: Option<&EncodedKey>,
        context: ContextBinding<'_>,
    ) -> Self {
        let sentinel = EncodedKey::default_graph();
        let (table, mut components): (Table, Vec<&EncodedKey>) = match context {
            ContextBinding::Named(c) => match (subject, predicate, object) {
                (None, None, None) => (Table::Cspo, vec![c]),
                (Some(s), None, None) => (Table::Cspo, vec![c, s]),
                (Some(s), Some(p), None) => (Table::Cspo, vec![c, s, p]),
                (Some(s), Some(p), Some(o)) => (Table::Cspo, vec![c, s, p, o]),
                (None, Some(p), None) => (Table::Cpos, vec![c, p]),
                (None, Some(p), Some(o)) => (Table::Cpos, vec![c, p, o]),
                (None, None, Some(o)) => (Table::Cosp, vec![c, o]),
                (Some(s), None, Some(o)) => (Table::Cosp, vec![c, o, s]),
            },
            ContextBinding::Unbound | ContextBinding::DefaultGraph => {
                match (subject, predicate, object) {
                    (None, None, None) => (Table::Spoc, vec![]),
                    (Some(s), None, None) => (Table::Spoc, vec![s]),
                    (Some(s), Some(p), None) => (Table::Spoc, vec![s, p]),
                    (Some(s), Some(p), Some(o)) => (Table::Spoc, vec![s, p, o]),
                    (None, Some(p), None) => (Table::Posc, vec![p]),
                    (None, Some(p), Some(o)) => (Table::Posc, vec![p, o]),
                    (None, None, Some(o)) => (Table::Ospc, vec![o]),
                    (Some(s), None, Some(o)) => (Table::Ospc, vec![o, s]),
                }
            }
        };

        let mut context_filter = None;
        if context == ContextBinding::DefaultGraph {
            if components.len() == 3 {
                components.push(&sentinel);
            } else {
                context_filter = Some(sentinel.clone());
            }
        }

        let parts: Vec<&[u8]> = components.iter().map(|k| k.as_bytes()).collect();
        let shape = Self {
            table,
            prefix: compose_key(&parts),
            bound: parts.len(),
            relaxed: parts.len() < table.partition_len(),
            context_filter,
        };
        if shape.relaxed {
            debug!(
                "Relaxed scan on {} with {} bound components",
                table.cf_name(),
                shape.bound
            );
        }
        shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ValueKind;

    fn key(s: &str) -> EncodedKey {
        EncodedKey::new(ValueKind::Identifier, 2, s.as_bytes())
    }

    fn prefix(keys: &[&EncodedKey]) -> Vec<u8> {
        let parts: Vec<&[u8]> = keys.iter().map(|k| k.as_bytes()).collect();
        compose_key(&parts)
    }

    #[test]
    fn test_any_context_shapes() {
        let (s, p, o) = (key("s"), key("p"), key("o"));
        let any = ContextBinding::Unbound;

        let shape = QueryShape::select(None, None, None, any);
        assert_eq!((shape.table, shape.bound, shape.relaxed), (Table::Spoc, 0, true));

        let shape = QueryShape::select(Some(&s), None, Some(&o), any);
        assert_eq!(shape.table, Table::Ospc);
        assert_eq!(shape.prefix, prefix(&[&o, &s]));

        let shape = QueryShape::select(None, Some(&p), Some(&o), any);
        assert_eq!(shape.table, Table::Posc);
        assert_eq!(shape.prefix, prefix(&[&p, &o]));

        let shape = QueryShape::select(Some(&s), Some(&p), Some(&o), any);
        assert_eq!(shape.table, Table::Spoc);
        assert_eq!(shape.bound, 3);
        assert!(!shape.relaxed);
        assert!(shape.context_filter.is_none());
    }

    #[test]
    fn test_named_context_shapes() {
        let (s, p, o, c) = (key("s"), key("p"), key("o"), key("c"));
        let named = ContextBinding::Named(&c);

        let shape = QueryShape::select(None, None, None, named);
        assert_eq!(shape.table, Table::Cspo);
        assert!(shape.relaxed);

        let shape = QueryShape::select(None, None, Some(&o), named);
        assert_eq!(shape.table, Table::Cosp);
        assert_eq!(shape.prefix, prefix(&[&c, &o]));
        assert!(!shape.relaxed);

        let shape = QueryShape::select(Some(&s), None, Some(&o), named);
        assert_eq!(shape.table, Table::Cosp);
        assert_eq!(shape.prefix, prefix(&[&c, &o, &s]));

        let shape = QueryShape::select(None, Some(&p), Some(&o), named);
        assert_eq!(shape.table, Table::Cpos);

        let shape = QueryShape::select(Some(&s), Some(&p), Some(&o), named);
        assert_eq!(shape.table, Table::Cspo);
        assert_eq!(shape.bound, 4);
    }

    #[test]
    fn test_default_graph_shapes() {
        let (s, p, o) = (key("s"), key("p"), key("o"));
        let sentinel = EncodedKey::default_graph();

        let shape = QueryShape::select(None, Some(&p), None, ContextBinding::DefaultGraph);
        assert_eq!(shape.table, Table::Posc);
        assert_eq!(shape.context_filter, Some(sentinel.clone()));

        let shape = QueryShape::select(Some(&s), Some(&p), Some(&o), ContextBinding::DefaultGraph);
        assert_eq!(shape.prefix, prefix(&[&s, &p, &o, &sentinel]));
        assert!(shape.context_filter.is_none());

        assert_eq!(ContextBinding::of(&sentinel), ContextBinding::DefaultGraph);
    }
}

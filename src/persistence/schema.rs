//! Table layout and row-key format
//!
//! Every table is a column family. Index rows are composite keys with an empty
//! value; each component is written as an unsigned LEB128 length followed by
//! its bytes, so any leading run of components is a usable scan prefix.

use super::storage::{StorageError, StorageResult};
use crate::codec::{EncodedKey, EncodedQuad};

/// Stored prefix standing in for the empty namespace prefix
pub const EMPTY_PREFIX: &str = "\u{0}";

/// Quad position inside an index row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Subject,
    Predicate,
    Object,
    Context,
}

/// Logical tables, one column family each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Spoc,
    Posc,
    Ospc,
    Cspo,
    Cpos,
    Cosp,
    CardC,
    CardS,
    CardP,
    CardO,
    CardPo,
    CardSp,
    CardSo,
    Namespaces,
    KnownVocabularies,
}

impl Table {
    pub const ALL: [Table; 15] = [
        Table::Spoc,
        Table::Posc,
        Table::Ospc,
        Table::Cspo,
        Table::Cpos,
        Table::Cosp,
        Table::CardC,
        Table::CardS,
        Table::CardP,
        Table::CardO,
        Table::CardPo,
        Table::CardSp,
        Table::CardSo,
        Table::Namespaces,
        Table::KnownVocabularies,
    ];

    /// Permutations holding every quad, the default graph included
    pub const CONTEXT_AGNOSTIC: [Table; 3] = [Table::Spoc, Table::Posc, Table::Ospc];

    /// All six permutations
    pub const INDEXES: [Table; 6] = [
        Table::Spoc,
        Table::Posc,
        Table::Ospc,
        Table::Cspo,
        Table::Cpos,
        Table::Cosp,
    ];

    pub const COUNTERS: [Table; 7] = [
        Table::CardC,
        Table::CardS,
        Table::CardP,
        Table::CardO,
        Table::CardPo,
        Table::CardSp,
        Table::CardSo,
    ];

    /// Column family name
    pub fn cf_name(self) -> &'static str {
        match self {
            Table::Spoc => "s_poc",
            Table::Posc => "p_osc",
            Table::Ospc => "o_spc",
            Table::Cspo => "cs_po",
            Table::Cpos => "cp_os",
            Table::Cosp => "co_sp",
            Table::CardC => "card_c",
            Table::CardS => "card_s",
            Table::CardP => "card_p",
            Table::CardO => "card_o",
            Table::CardPo => "card_po",
            Table::CardSp => "card_sp",
            Table::CardSo => "card_so",
            Table::Namespaces => "namespaces",
            Table::KnownVocabularies => "known_vocabularies",
        }
    }

    pub fn is_counter(self) -> bool {
        Self::COUNTERS.contains(&self)
    }

    pub fn is_index(self) -> bool {
        self.layout().is_some()
    }

    pub fn is_context_first(self) -> bool {
        matches!(self, Table::Cspo | Table::Cpos | Table::Cosp)
    }

    /// Component order of an index table's rows
    pub fn layout(self) -> Option<[Component; 4]> {
        use Component::*;
        match self {
            Table::Spoc => Some([Subject, Predicate, Object, Context]),
            Table::Posc => Some([Predicate, Object, Subject, Context]),
            Table::Ospc => Some([Object, Subject, Predicate, Context]),
            Table::Cspo => Some([Context, Subject, Predicate, Object]),
            Table::Cpos => Some([Context, Predicate, Object, Subject]),
            Table::Cosp => Some([Context, Object, Subject, Predicate]),
            _ => None,
        }
    }

    /// Leading components that identify a partition
    pub fn partition_len(self) -> usize {
        if self.is_context_first() {
            2
        } else {
            1
        }
    }
}

/// Append an unsigned LEB128 integer
pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Read an unsigned LEB128 integer, returning it with the bytes consumed
pub fn decode_varint(bytes: &[u8]) -> Option<(u64, usize)> {
    let mut value = 0u64;
    let mut shift = 0u32;
    for (i, &byte) in bytes.iter().enumerate() {
        if shift >= 64 {
            return None;
        }
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
        shift += 7;
    }
    None
}

/// Length-prefixed concatenation of `parts`
pub fn compose_key(parts: &[&[u8]]) -> Vec<u8> {
    let mut key = Vec::with_capacity(parts.iter().map(|p| p.len() + 2).sum());
    for part in parts {
        encode_varint(part.len() as u64, &mut key);
        key.extend_from_slice(part);
    }
    key
}

/// Inverse of [`compose_key`]
pub fn split_key(key: &[u8]) -> StorageResult<Vec<&[u8]>> {
    let mut parts = Vec::with_capacity(4);
    let mut rest = key;
    while !rest.is_empty() {
        let (len, used) = decode_varint(rest)
            .ok_or_else(|| StorageError::CorruptedRow("bad component length".to_string()))?;
        let len = len as usize;
        let end = used
            .checked_add(len)
            .filter(|end| *end <= rest.len())
            .ok_or_else(|| StorageError::CorruptedRow("truncated component".to_string()))?;
        parts.push(&rest[used..end]);
        rest = &rest[end..];
    }
    Ok(parts)
}

fn component<'a>(quad: &'a EncodedQuad, which: Component) -> &'a [u8] {
    match which {
        Component::Subject => quad.subject.as_bytes(),
        Component::Predicate => quad.predicate.as_bytes(),
        Component::Object => quad.object.as_bytes(),
        Component::Context => quad.context.as_bytes(),
    }
}

/// Row key of `quad` in an index table
pub fn index_row(table: Table, quad: &EncodedQuad) -> StorageResult<Vec<u8>> {
    let layout = table
        .layout()
        .ok_or_else(|| StorageError::ColumnFamily(format!("{} is not an index", table.cf_name())))?;
    let parts: Vec<&[u8]> = layout.iter().map(|c| component(quad, *c)).collect();
    Ok(compose_key(&parts))
}

/// Rebuild the quad stored under an index row key
pub fn quad_from_row(table: Table, key: &[u8]) -> StorageResult<EncodedQuad> {
    let layout = table
        .layout()
        .ok_or_else(|| StorageError::ColumnFamily(format!("{} is not an index", table.cf_name())))?;
    let parts = split_key(key)?;
    if parts.len() != 4 {
        return Err(StorageError::CorruptedRow(format!(
            "{} row has {} components",
            table.cf_name(),
            parts.len()
        )));
    }

    let mut subject = None;
    let mut predicate = None;
    let mut object = None;
    let mut context = None;
    for (which, bytes) in layout.iter().zip(parts) {
        let key = Some(EncodedKey::from_bytes(bytes.to_vec()));
        match which {
            Component::Subject => subject = key,
            Component::Predicate => predicate = key,
            Component::Object => object = key,
            Component::Context => context = key,
        }
    }
    match (subject, predicate, object, context) {
        (Some(s), Some(p), Some(o), Some(c)) => Ok(EncodedQuad::new(s, p, o, c)),
        _ => Err(StorageError::CorruptedRow(format!(
            "{} row is missing a component",
            table.cf_name()
        ))),
    }
}

/// Counter deltas are big-endian i64 operands
pub fn encode_counter(delta: i64) -> [u8; 8] {
    delta.to_be_bytes()
}

/// Malformed counter bytes read as zero
pub fn decode_counter(bytes: &[u8]) -> i64 {
    <[u8; 8]>::try_from(bytes)
        .map(i64::from_be_bytes)
        .unwrap_or(0)
}

/// Stored form of a namespace prefix
pub fn stored_prefix(prefix: &str) -> &str {
    if prefix.is_empty() {
        EMPTY_PREFIX
    } else {
        prefix
    }
}

/// Prefix as seen by callers
pub fn visible_prefix(stored: &str) -> &str {
    if stored == EMPTY_PREFIX {
        ""
    } else {
        stored
    }
}

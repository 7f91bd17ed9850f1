//! Dispatch over the coder groups

use super::coders::{
    BlankNodeUtf8Coder, CoderGroup, FixedNamespaceCoder, GenericLiteralCoder, IriUtf8Coder,
    KnownVocabularyCoder, LanguageLiteralCoder, PrimitiveDatatypeCoder, ValueCoder,
};
use super::vocabulary::KnownVocabulary;
use super::{CodecError, CodecResult, EncodedKey, EncodedQuad, ValueKind};
use crate::rdf::{BlankNode, Literal, NamedNode, Quad, RdfObject, RdfPredicate, RdfSubject};
use std::sync::Arc;

/// Namespace table used when the configuration does not name one.
///
/// Ids are positional and persisted inside keys: append only.
pub const DEFAULT_FIXED_NAMESPACES: &[&str] = &[
    "http://example.org/",
    "http://example.com/",
    "urn:uuid:",
    "http://schema.org/",
    "https://schema.org/",
    "http://dbpedia.org/resource/",
    "http://dbpedia.org/ontology/",
    "http://dbpedia.org/property/",
    "http://www.wikidata.org/entity/",
    "http://www.wikidata.org/prop/direct/",
    "http://purl.obolibrary.org/obo/",
    "http://sws.geonames.org/",
    "http://www.geonames.org/ontology#",
    "http://www.w3.org/ns/prov#",
    "http://www.w3.org/ns/dcat#",
    "http://www.w3.org/2003/01/geo/wgs84_pos#",
];

/// Encodes values with the most compact coder of their kind and decodes keys
/// by their marker.
///
/// Coder slots, most specific first:
///
/// | kind | 0 | 1 | 2 |
/// |---|---|---|---|
/// | identifier | known vocabulary | fixed namespace | UTF-8 |
/// | blank node | UTF-8 | | |
/// | language literal | N-Triples | | |
/// | typed literal | primitive datatype | N-Triples | |
pub struct CoderFacade {
    identifiers: CoderGroup<NamedNode>,
    blank_nodes: CoderGroup<BlankNode>,
    language_literals: CoderGroup<Literal>,
    typed_literals: CoderGroup<Literal>,
    vocabulary: Arc<KnownVocabulary>,
}

impl CoderFacade {
    pub fn new<S: AsRef<str>>(
        vocabulary: Arc<KnownVocabulary>,
        fixed_namespaces: &[S],
    ) -> CodecResult<Self> {
        let identifier_coders: Vec<Box<dyn ValueCoder<NamedNode>>> = vec![
            Box::new(KnownVocabularyCoder::new(Arc::clone(&vocabulary))),
            Box::new(FixedNamespaceCoder::new(fixed_namespaces)?),
            Box::new(IriUtf8Coder),
        ];
        let blank_node_coders: Vec<Box<dyn ValueCoder<BlankNode>>> =
            vec![Box::new(BlankNodeUtf8Coder)];
        let language_literal_coders: Vec<Box<dyn ValueCoder<Literal>>> =
            vec![Box::new(LanguageLiteralCoder)];
        let typed_literal_coders: Vec<Box<dyn ValueCoder<Literal>>> = vec![
            Box::new(PrimitiveDatatypeCoder::new()),
            Box::new(GenericLiteralCoder),
        ];

        let identifiers = CoderGroup::new(ValueKind::Identifier, identifier_coders);
        let blank_nodes = CoderGroup::new(ValueKind::BlankNode, blank_node_coders);
        let language_literals =
            CoderGroup::new(ValueKind::LanguageLiteral, language_literal_coders);
        let typed_literals = CoderGroup::new(ValueKind::TypedLiteral, typed_literal_coders);

        Ok(Self {
            identifiers,
            blank_nodes,
            language_literals,
            typed_literals,
            vocabulary,
        })
    }

    /// Facade with the default namespace table
    pub fn with_default_namespaces(vocabulary: Arc<KnownVocabulary>) -> CodecResult<Self> {
        Self::new(vocabulary, DEFAULT_FIXED_NAMESPACES)
    }

    pub fn vocabulary(&self) -> &Arc<KnownVocabulary> {
        &self.vocabulary
    }

    pub fn encode_iri(&self, value: &NamedNode) -> CodecResult<EncodedKey> {
        self.identifiers.encode(value)
    }

    pub fn encode_blank_node(&self, value: &BlankNode) -> CodecResult<EncodedKey> {
        self.blank_nodes.encode(value)
    }

    pub fn encode_literal(&self, value: &Literal) -> CodecResult<EncodedKey> {
        if value.language().is_some() {
            self.language_literals.encode(value)
        } else {
            self.typed_literals.encode(value)
        }
    }

    pub fn encode_value(&self, value: &RdfObject) -> CodecResult<EncodedKey> {
        match value {
            RdfObject::NamedNode(n) => self.encode_iri(n),
            RdfObject::BlankNode(b) => self.encode_blank_node(b),
            RdfObject::Literal(l) => self.encode_literal(l),
        }
    }

    pub fn encode_subject(&self, value: &RdfSubject) -> CodecResult<EncodedKey> {
        match value {
            RdfSubject::NamedNode(n) => self.encode_iri(n),
            RdfSubject::BlankNode(b) => self.encode_blank_node(b),
        }
    }

    pub fn encode_predicate(&self, value: &RdfPredicate) -> CodecResult<EncodedKey> {
        self.encode_iri(value.as_named_node())
    }

    /// `None` encodes to the default-graph sentinel
    pub fn encode_context(&self, value: Option<&RdfSubject>) -> CodecResult<EncodedKey> {
        match value {
            Some(context) => self.encode_subject(context),
            None => Ok(EncodedKey::default_graph()),
        }
    }

    pub fn encode_quad(&self, quad: &Quad) -> CodecResult<EncodedQuad> {
        Ok(EncodedQuad::new(
            self.encode_subject(&quad.subject)?,
            self.encode_predicate(&quad.predicate)?,
            self.encode_value(&quad.object)?,
            self.encode_context(quad.graph.as_ref())?,
        ))
    }

    /// Decode any value key
    pub fn decode_value(&self, key: &EncodedKey) -> CodecResult<RdfObject> {
        if key.is_default_graph() {
            return Err(CodecError::ReservedKey);
        }
        let index = key.coder_index()?;
        let payload = key.payload();
        let value: RdfObject = match key.kind()? {
            ValueKind::Identifier => self.identifiers.decode(index, payload)?.into(),
            ValueKind::BlankNode => self.blank_nodes.decode(index, payload)?.into(),
            ValueKind::LanguageLiteral => self.language_literals.decode(index, payload)?.into(),
            ValueKind::TypedLiteral => self.typed_literals.decode(index, payload)?.into(),
        };
        Ok(value)
    }

    pub fn decode_subject(&self, key: &EncodedKey) -> CodecResult<RdfSubject> {
        Ok(RdfSubject::try_from(self.decode_value(key)?)?)
    }

    pub fn decode_predicate(&self, key: &EncodedKey) -> CodecResult<RdfPredicate> {
        Ok(RdfPredicate::try_from(self.decode_value(key)?)?)
    }

    /// The sentinel decodes to `None`
    pub fn decode_context(&self, key: &EncodedKey) -> CodecResult<Option<RdfSubject>> {
        if key.is_default_graph() {
            return Ok(None);
        }
        self.decode_subject(key).map(Some)
    }

    pub fn decode_quad(&self, quad: &EncodedQuad) -> CodecResult<Quad> {
        Ok(Quad::new(
            self.decode_subject(&quad.subject)?,
            self.decode_predicate(&quad.predicate)?,
            self.decode_value(&quad.object)?,
            self.decode_context(&quad.context)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::vocabulary::builtin_vocabularies;

    fn facade() -> CoderFacade {
        let (vocabulary, _) =
            KnownVocabulary::refresh(Vec::new(), &builtin_vocabularies()).unwrap();
        CoderFacade::with_default_namespaces(Arc::new(vocabulary)).unwrap()
    }

    fn iri(s: &str) -> NamedNode {
        NamedNode::new(s).unwrap()
    }

    #[test]
    fn test_known_vocabulary_key() {
        let facade = facade();
        let key = facade
            .encode_iri(&iri("http://www.w3.org/1999/02/22-rdf-syntax-ns#type"))
            .unwrap();
        assert_eq!(key.as_bytes(), &[0b01, 0, 0, 1]);
    }

    #[test]
    fn test_dispatch_prefers_specific_coders() {
        let facade = facade();

        let fixed = facade.encode_iri(&iri("http://example.org/alice")).unwrap();
        assert_eq!(fixed.coder_index().unwrap(), 1);
        assert_eq!(fixed.as_bytes()[1], 0);
        assert_eq!(&fixed.as_bytes()[2..], b"alice");

        let fallback = facade.encode_iri(&iri("http://elsewhere.net/alice")).unwrap();
        assert_eq!(fallback.coder_index().unwrap(), 2);
        assert!(fixed.len() < fallback.len());

        let primitive = facade
            .encode_literal(&Literal::new_typed_literal(
                "3.5",
                iri("http://www.w3.org/2001/XMLSchema#double"),
            ))
            .unwrap();
        assert_eq!(primitive.as_bytes()[0], 0b0000_0011);

        let generic = facade
            .encode_literal(&Literal::new_typed_literal("x", iri("http://example.org/dt")))
            .unwrap();
        assert_eq!(generic.as_bytes()[0], 0b0000_0111);
    }

    #[test]
    fn test_markers_match_groups() {
        let facade = facade();
        let blank = facade.encode_blank_node(&BlankNode::from_str("n1").unwrap()).unwrap();
        assert_eq!(blank.kind().unwrap(), ValueKind::BlankNode);
        let tagged = facade
            .encode_literal(&Literal::new_language_tagged_literal("hi", "en").unwrap())
            .unwrap();
        assert_eq!(tagged.kind().unwrap(), ValueKind::LanguageLiteral);
        assert_eq!(tagged.coder_index().unwrap(), 0);
    }

    #[test]
    fn test_value_round_trips() {
        let facade = facade();
        let values: Vec<RdfObject> = vec![
            iri("http://www.w3.org/2000/01/rdf-schema#label").into(),
            iri("http://example.com/x/y").into(),
            iri("http://elsewhere.net/#frag").into(),
            BlankNode::from_str("b42").unwrap().into(),
            Literal::new_simple_literal("plain").into(),
            Literal::new_language_tagged_literal("hallo", "de").unwrap().into(),
            Literal::new_typed_literal("2024-01-01", iri("http://www.w3.org/2001/XMLSchema#date"))
                .into(),
            Literal::new_typed_literal("{}", iri("http://example.org/json")).into(),
        ];
        for value in values {
            let key = facade.encode_value(&value).unwrap();
            let decoded = facade.decode_value(&key).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(facade.encode_value(&decoded).unwrap(), key);
        }
    }

    #[test]
    fn test_context_sentinel() {
        let facade = facade();
        let key = facade.encode_context(None).unwrap();
        assert!(key.is_default_graph());
        assert_eq!(facade.decode_context(&key).unwrap(), None);
        assert!(matches!(facade.decode_value(&key), Err(CodecError::ReservedKey)));
    }

    #[test]
    fn test_corrupted_keys() {
        let facade = facade();
        // identifier slot 5 does not exist
        let key = EncodedKey::from_bytes(vec![(5 << 2) | 1, b'x']);
        assert!(matches!(
            facade.decode_value(&key),
            Err(CodecError::UnknownCoder { index: 5, .. })
        ));
        // unassigned vocabulary code
        let key = EncodedKey::from_bytes(vec![0b01, 0xff, 0xff, 0xfe]);
        assert!(matches!(facade.decode_value(&key), Err(CodecError::Malformed(_))));
        // a literal cannot sit in subject position
        let literal = facade.encode_literal(&Literal::new_simple_literal("s")).unwrap();
        assert!(facade.decode_subject(&literal).is_err());
    }

    #[test]
    fn test_quad_round_trip() {
        let facade = facade();
        let quad = Quad::new(
            iri("http://example.org/a").into(),
            RdfPredicate::new("http://xmlns.com/foaf/0.1/knows").unwrap(),
            iri("http://example.org/b").into(),
            Some(BlankNode::from_str("g").unwrap().into()),
        );
        let encoded = facade.encode_quad(&quad).unwrap();
        assert!(!encoded.in_default_graph());
        assert_eq!(facade.decode_quad(&encoded).unwrap(), quad);
    }
}

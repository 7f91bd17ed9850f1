//! Built-in vocabularies seeding the known-vocabulary dictionary.
//!
//! Entries may be appended; reordering or removing them only changes which
//! codes a fresh store hands out, never the codes of an existing store.

use super::vocabulary::StaticVocabulary;

pub const RDF: StaticVocabulary = StaticVocabulary::new(
    "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
    &[
        "type", "Property", "Statement", "subject", "predicate", "object", "Bag", "Seq", "Alt",
        "value", "List", "first", "rest", "nil", "XMLLiteral", "HTML", "langString", "JSON",
        "PlainLiteral", "CompoundLiteral", "language", "direction",
    ],
);

pub const RDFS: StaticVocabulary = StaticVocabulary::new(
    "http://www.w3.org/2000/01/rdf-schema#",
    &[
        "Resource", "Class", "subClassOf", "subPropertyOf", "comment", "label", "domain", "range",
        "seeAlso", "isDefinedBy", "Literal", "Container", "ContainerMembershipProperty", "member",
        "Datatype",
    ],
);

pub const OWL: StaticVocabulary = StaticVocabulary::new(
    "http://www.w3.org/2002/07/owl#",
    &[
        "Class", "Thing", "Nothing", "Ontology", "ObjectProperty", "DatatypeProperty",
        "AnnotationProperty", "OntologyProperty", "FunctionalProperty",
        "InverseFunctionalProperty", "TransitiveProperty", "SymmetricProperty",
        "AsymmetricProperty", "ReflexiveProperty", "IrreflexiveProperty", "Restriction",
        "onProperty", "allValuesFrom", "someValuesFrom", "hasValue", "hasSelf", "cardinality",
        "minCardinality", "maxCardinality", "qualifiedCardinality", "minQualifiedCardinality",
        "maxQualifiedCardinality", "onClass", "onDataRange", "equivalentClass",
        "equivalentProperty", "disjointWith", "propertyDisjointWith", "complementOf",
        "unionOf", "intersectionOf", "oneOf", "inverseOf", "sameAs", "differentFrom",
        "AllDifferent", "AllDisjointClasses", "AllDisjointProperties", "distinctMembers",
        "members", "imports", "versionInfo", "versionIRI", "priorVersion", "backwardCompatibleWith",
        "incompatibleWith", "deprecated", "DeprecatedClass", "DeprecatedProperty",
        "NamedIndividual", "NegativePropertyAssertion", "sourceIndividual", "assertionProperty",
        "targetIndividual", "targetValue", "topObjectProperty", "bottomObjectProperty",
        "topDataProperty", "bottomDataProperty", "propertyChainAxiom", "hasKey",
        "disjointUnionOf", "withRestrictions", "onDatatype", "datatypeComplementOf", "Axiom",
        "annotatedSource", "annotatedProperty", "annotatedTarget", "rational", "real",
    ],
);

pub const XSD: StaticVocabulary = StaticVocabulary::new(
    "http://www.w3.org/2001/XMLSchema#",
    &[
        "string", "boolean", "decimal", "integer", "double", "float", "date", "time", "dateTime",
        "dateTimeStamp", "gYear", "gMonth", "gDay", "gYearMonth", "gMonthDay", "duration",
        "yearMonthDuration", "dayTimeDuration", "byte", "short", "int", "long", "unsignedByte",
        "unsignedShort", "unsignedInt", "unsignedLong", "positiveInteger", "nonNegativeInteger",
        "negativeInteger", "nonPositiveInteger", "hexBinary", "base64Binary", "anyURI",
        "language", "normalizedString", "token", "NMTOKEN", "NMTOKENS", "Name", "NCName", "ID",
        "IDREF", "IDREFS", "ENTITY", "ENTITIES", "QName", "NOTATION",
    ],
);

pub const FOAF: StaticVocabulary = StaticVocabulary::new(
    "http://xmlns.com/foaf/0.1/",
    &[
        "Agent", "Person", "Organization", "Group", "Document", "Image", "OnlineAccount",
        "PersonalProfileDocument", "Project", "name", "title", "mbox", "mbox_sha1sum",
        "homepage", "weblog", "openid", "jabberID", "img", "depiction", "depicts", "familyName",
        "givenName", "firstName", "lastName", "nick", "knows", "based_near", "age", "birthday",
        "gender", "interest", "topic_interest", "made", "maker", "member", "primaryTopic",
        "isPrimaryTopicOf", "page", "topic", "logo", "account", "accountName",
        "accountServiceHomepage", "holdsAccount", "workplaceHomepage", "workInfoHomepage",
        "schoolHomepage", "publications", "currentProject", "pastProject", "fundedBy", "theme",
        "phone", "thumbnail", "tipjar", "sha1", "status",
    ],
);

pub const DC: StaticVocabulary = StaticVocabulary::new(
    "http://purl.org/dc/elements/1.1/",
    &[
        "contributor", "coverage", "creator", "date", "description", "format", "identifier",
        "language", "publisher", "relation", "rights", "source", "subject", "title", "type",
    ],
);

pub const DCTERMS: StaticVocabulary = StaticVocabulary::new(
    "http://purl.org/dc/terms/",
    &[
        "abstract", "accessRights", "alternative", "audience", "available", "bibliographicCitation",
        "conformsTo", "contributor", "coverage", "created", "creator", "date", "dateAccepted",
        "dateCopyrighted", "dateSubmitted", "description", "extent", "format", "hasFormat",
        "hasPart", "hasVersion", "identifier", "isFormatOf", "isPartOf", "isReferencedBy",
        "isReplacedBy", "isRequiredBy", "isVersionOf", "issued", "language", "license",
        "mediator", "medium", "modified", "provenance", "publisher", "references", "relation",
        "replaces", "requires", "rights", "rightsHolder", "source", "spatial", "subject",
        "tableOfContents", "temporal", "title", "type", "valid",
    ],
);

pub const SKOS: StaticVocabulary = StaticVocabulary::new(
    "http://www.w3.org/2004/02/skos/core#",
    &[
        "Concept", "ConceptScheme", "Collection", "OrderedCollection", "inScheme",
        "hasTopConcept", "topConceptOf", "prefLabel", "altLabel", "hiddenLabel", "notation",
        "note", "changeNote", "definition", "editorialNote", "example", "historyNote",
        "scopeNote", "semanticRelation", "broader", "narrower", "related", "broaderTransitive",
        "narrowerTransitive", "member", "memberList", "mappingRelation", "closeMatch",
        "exactMatch", "broadMatch", "narrowMatch", "relatedMatch",
    ],
);

use oxigraph::model::NamedNodeRef;

macro_rules! shacl_iri {
    ($local:literal) => {
        NamedNodeRef::new_unchecked(concat!("http://www.w3.org/ns/shacl#", $local))
    };
}

/// SHACL vocabulary used by the shape reader and the report writer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SHACL {
    pub node_shape: NamedNodeRef<'static>,
    pub property_shape: NamedNodeRef<'static>,
    pub property: NamedNodeRef<'static>,
    pub path: NamedNodeRef<'static>,
    pub inverse_path: NamedNodeRef<'static>,
    pub alternative_path: NamedNodeRef<'static>,
    pub zero_or_more_path: NamedNodeRef<'static>,
    pub one_or_more_path: NamedNodeRef<'static>,
    pub zero_or_one_path: NamedNodeRef<'static>,

    pub target_class: NamedNodeRef<'static>,
    pub target_node: NamedNodeRef<'static>,
    pub target_subjects_of: NamedNodeRef<'static>,
    pub target_objects_of: NamedNodeRef<'static>,

    pub severity: NamedNodeRef<'static>,
    pub message: NamedNodeRef<'static>,
    pub deactivated: NamedNodeRef<'static>,
    pub violation: NamedNodeRef<'static>,
    pub warning: NamedNodeRef<'static>,
    pub info: NamedNodeRef<'static>,

    pub min_count: NamedNodeRef<'static>,
    pub max_count: NamedNodeRef<'static>,
    pub datatype: NamedNodeRef<'static>,
    pub class: NamedNodeRef<'static>,
    pub node_kind: NamedNodeRef<'static>,
    pub min_inclusive: NamedNodeRef<'static>,
    pub min_exclusive: NamedNodeRef<'static>,
    pub max_inclusive: NamedNodeRef<'static>,
    pub max_exclusive: NamedNodeRef<'static>,
    pub min_length: NamedNodeRef<'static>,
    pub max_length: NamedNodeRef<'static>,
    pub pattern: NamedNodeRef<'static>,
    pub flags: NamedNodeRef<'static>,
    pub language_in: NamedNodeRef<'static>,
    pub r#in: NamedNodeRef<'static>,
    pub has_value: NamedNodeRef<'static>,
    pub node: NamedNodeRef<'static>,
    pub and: NamedNodeRef<'static>,
    pub or: NamedNodeRef<'static>,
    pub xone: NamedNodeRef<'static>,
    pub not: NamedNodeRef<'static>,
    pub qualified_value_shape: NamedNodeRef<'static>,
    pub qualified_min_count: NamedNodeRef<'static>,
    pub qualified_max_count: NamedNodeRef<'static>,

    pub sparql: NamedNodeRef<'static>,
    pub select: NamedNodeRef<'static>,
    pub prefixes: NamedNodeRef<'static>,
    pub declare: NamedNodeRef<'static>,
    pub prefix: NamedNodeRef<'static>,
    pub namespace: NamedNodeRef<'static>,

    pub iri: NamedNodeRef<'static>,
    pub blank_node: NamedNodeRef<'static>,
    pub literal: NamedNodeRef<'static>,
    pub blank_node_or_iri: NamedNodeRef<'static>,
    pub blank_node_or_literal: NamedNodeRef<'static>,
    pub iri_or_literal: NamedNodeRef<'static>,

    pub validation_report: NamedNodeRef<'static>,
    pub validation_result: NamedNodeRef<'static>,
    pub conforms: NamedNodeRef<'static>,
    pub result: NamedNodeRef<'static>,
    pub focus_node: NamedNodeRef<'static>,
    pub result_path: NamedNodeRef<'static>,
    pub source_shape: NamedNodeRef<'static>,
    pub result_severity: NamedNodeRef<'static>,
    pub result_message: NamedNodeRef<'static>,
    pub source_constraint_component: NamedNodeRef<'static>,
    pub value: NamedNodeRef<'static>,
}

impl SHACL {
    pub const fn new() -> Self {
        SHACL {
            node_shape: shacl_iri!("NodeShape"),
            property_shape: shacl_iri!("PropertyShape"),
            property: shacl_iri!("property"),
            path: shacl_iri!("path"),
            inverse_path: shacl_iri!("inversePath"),
            alternative_path: shacl_iri!("alternativePath"),
            zero_or_more_path: shacl_iri!("zeroOrMorePath"),
            one_or_more_path: shacl_iri!("oneOrMorePath"),
            zero_or_one_path: shacl_iri!("zeroOrOnePath"),

            target_class: shacl_iri!("targetClass"),
            target_node: shacl_iri!("targetNode"),
            target_subjects_of: shacl_iri!("targetSubjectsOf"),
            target_objects_of: shacl_iri!("targetObjectsOf"),

            severity: shacl_iri!("severity"),
            message: shacl_iri!("message"),
            deactivated: shacl_iri!("deactivated"),
            violation: shacl_iri!("Violation"),
            warning: shacl_iri!("Warning"),
            info: shacl_iri!("Info"),

            min_count: shacl_iri!("minCount"),
            max_count: shacl_iri!("maxCount"),
            datatype: shacl_iri!("datatype"),
            class: shacl_iri!("class"),
            node_kind: shacl_iri!("nodeKind"),
            min_inclusive: shacl_iri!("minInclusive"),
            min_exclusive: shacl_iri!("minExclusive"),
            max_inclusive: shacl_iri!("maxInclusive"),
            max_exclusive: shacl_iri!("maxExclusive"),
            min_length: shacl_iri!("minLength"),
            max_length: shacl_iri!("maxLength"),
            pattern: shacl_iri!("pattern"),
            flags: shacl_iri!("flags"),
            language_in: shacl_iri!("languageIn"),
            r#in: shacl_iri!("in"),
            has_value: shacl_iri!("hasValue"),
            node: shacl_iri!("node"),
            and: shacl_iri!("and"),
            or: shacl_iri!("or"),
            xone: shacl_iri!("xone"),
            not: shacl_iri!("not"),
            qualified_value_shape: shacl_iri!("qualifiedValueShape"),
            qualified_min_count: shacl_iri!("qualifiedMinCount"),
            qualified_max_count: shacl_iri!("qualifiedMaxCount"),

            sparql: shacl_iri!("sparql"),
            select: shacl_iri!("select"),
            prefixes: shacl_iri!("prefixes"),
            declare: shacl_iri!("declare"),
            prefix: shacl_iri!("prefix"),
            namespace: shacl_iri!("namespace"),

            iri: shacl_iri!("IRI"),
            blank_node: shacl_iri!("BlankNode"),
            literal: shacl_iri!("Literal"),
            blank_node_or_iri: shacl_iri!("BlankNodeOrIRI"),
            blank_node_or_literal: shacl_iri!("BlankNodeOrLiteral"),
            iri_or_literal: shacl_iri!("IRIOrLiteral"),

            validation_report: shacl_iri!("ValidationReport"),
            validation_result: shacl_iri!("ValidationResult"),
            conforms: shacl_iri!("conforms"),
            result: shacl_iri!("result"),
            focus_node: shacl_iri!("focusNode"),
            result_path: shacl_iri!("resultPath"),
            source_shape: shacl_iri!("sourceShape"),
            result_severity: shacl_iri!("resultSeverity"),
            result_message: shacl_iri!("resultMessage"),
            source_constraint_component: shacl_iri!("sourceConstraintComponent"),
            value: shacl_iri!("value"),
        }
    }
}

/// `rdfs:Class`, used to detect implicit class targets.
pub(crate) const RDFS_CLASS: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#Class");

pub(crate) const SHACL_NS: &str = "http://www.w3.org/ns/shacl#";

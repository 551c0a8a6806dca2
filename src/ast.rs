use serde::{Deserialize, Serialize};

/// A class-diagram snapshot as handed over by the diagram editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalModel {
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    pub class_name: String,
    /// Raw `name: Type` declarations (enum constants for enums)
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Raw `name(param: Type): Return` signatures
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub element_type: ElementType,
    #[serde(default)]
    pub position: Position,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    #[default]
    Class,
    Interface,
    Abstract,
    Enum,
}

impl ElementType {
    /// Classes and abstract classes are persisted as tables.
    pub fn is_class_like(self) -> bool {
        matches!(self, Self::Class | Self::Abstract)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(default)]
    pub relationship: RelationshipKind,
    #[serde(default)]
    pub source_cardinality: String,
    #[serde(default)]
    pub target_cardinality: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    #[default]
    Association,
    Aggregation,
    Composition,
    Inheritance,
    Realization,
    Dependency,
}

impl RelationshipKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "association" => Some(Self::Association),
            "aggregation" => Some(Self::Aggregation),
            "composition" => Some(Self::Composition),
            "inheritance" | "extends" => Some(Self::Inheritance),
            "realization" | "implements" => Some(Self::Realization),
            "dependency" => Some(Self::Dependency),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Association => "association",
            Self::Aggregation => "aggregation",
            Self::Composition => "composition",
            Self::Inheritance => "inheritance",
            Self::Realization => "realization",
            Self::Dependency => "dependency",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,       // 1
    ZeroOrOne, // 0..1
    Many,      // *, 0..*, n
    OneOrMore, // 1..*
}

impl Cardinality {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "1" => Some(Self::One),
            "0..1" => Some(Self::ZeroOrOne),
            "*" | "0..*" | "n" | "N" | "0..n" | "0..N" => Some(Self::Many),
            "1..*" | "1..n" | "1..N" => Some(Self::OneOrMore),
            _ => None,
        }
    }

    /// True when the end is bounded to at most one row.
    pub fn is_single(self) -> bool {
        matches!(self, Self::One | Self::ZeroOrOne)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::One => "1",
            Self::ZeroOrOne => "0..1",
            Self::Many => "*",
            Self::OneOrMore => "1..*",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinality_vocabulary() {
        assert_eq!(Cardinality::parse("1"), Some(Cardinality::One));
        assert_eq!(Cardinality::parse("0..1"), Some(Cardinality::ZeroOrOne));
        assert_eq!(Cardinality::parse("*"), Some(Cardinality::Many));
        assert_eq!(Cardinality::parse("0..*"), Some(Cardinality::Many));
        assert_eq!(Cardinality::parse("n"), Some(Cardinality::Many));
        assert_eq!(Cardinality::parse(" 1..* "), Some(Cardinality::OneOrMore));
        assert_eq!(Cardinality::parse(""), None);
        assert_eq!(Cardinality::parse("2..5"), None);
    }

    #[test]
    fn test_deserialize_editor_snapshot() {
        let json = r#"{
            "elements": [
                {"id": "e1", "className": "Usuario", "attributes": ["id: Long"],
                 "methods": [], "elementType": "class", "position": {"x": 10, "y": 20}}
            ],
            "relationships": [
                {"id": "r1", "sourceId": "e1", "targetId": "e1",
                 "relationship": "composition", "sourceCardinality": "1", "targetCardinality": "*"}
            ]
        }"#;
        let model: LogicalModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.elements[0].class_name, "Usuario");
        assert_eq!(model.elements[0].element_type, ElementType::Class);
        assert_eq!(model.elements[0].position.y, 20.0);
        assert_eq!(model.relationships[0].relationship, RelationshipKind::Composition);
        assert_eq!(model.relationships[0].target_cardinality, "*");
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{"elements": [{"id": "e1", "className": "Nota"}]}"#;
        let model: LogicalModel = serde_json::from_str(json).unwrap();
        assert!(model.elements[0].attributes.is_empty());
        assert_eq!(model.elements[0].element_type, ElementType::Class);
        assert!(model.relationships.is_empty());
    }
}

//! Error types shared by the model compiler stages.

use std::fmt;
use thiserror::Error;

/// Which end of a relationship an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Target,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Source => write!(f, "source"),
            Endpoint::Target => write!(f, "target"),
        }
    }
}

/// A single validation fault in a logical or physical model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("unknown type `{token}` in attribute `{declaration}` of `{element}`")]
    UnknownType {
        token: String,
        declaration: String,
        element: String,
    },
    #[error("malformed attribute `{declaration}` in `{element}`: {reason}")]
    MalformedAttribute {
        declaration: String,
        element: String,
        reason: String,
    },
    #[error("malformed method `{signature}` in `{element}`: {reason}")]
    MalformedMethod {
        signature: String,
        element: String,
        reason: String,
    },
    #[error("relationship `{relationship}` {endpoint} references unknown element `{element_id}`")]
    DanglingReference {
        relationship: String,
        endpoint: Endpoint,
        element_id: String,
    },
    #[error(
        "relationship `{relationship}` has unresolvable cardinality `{source_cardinality}` -> `{target_cardinality}`"
    )]
    AmbiguousCardinality {
        relationship: String,
        source_cardinality: String,
        target_cardinality: String,
    },
    #[error("elements `{first}` and `{second}` both normalize to table `{table}`")]
    DuplicateTableName {
        table: String,
        first: String,
        second: String,
    },
    #[error("table `{table}` declares column `{column}` more than once")]
    DuplicateColumnName { table: String, column: String },
    #[error("element id `{id}` is used more than once")]
    DuplicateElementId { id: String },
    #[error("inheritance conflict on `{table}`: {detail}")]
    InheritanceConflict { table: String, detail: String },
    #[error("invalid physical model: {detail}")]
    InvalidPhysicalModel { detail: String },
}

/// Non-empty set of faults collected by one validation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(Vec<ModelError>);

impl ValidationErrors {
    /// Returns `None` for an empty set so callers can't build an empty error.
    pub fn from_vec(errors: Vec<ModelError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModelError> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<ModelError> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ModelError;
    type IntoIter = std::vec::IntoIter<ModelError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ModelError;
    type IntoIter = std::slice::Iter<'a, ModelError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Failure of the code generation stage.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("physical model is structurally invalid:\n{0}")]
    InvalidModel(ValidationErrors),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid base package `{0}`: expected dotted Java identifiers")]
    InvalidPackage(String),
    #[error("invalid project name `{0}`")]
    InvalidProjectName(String),
}

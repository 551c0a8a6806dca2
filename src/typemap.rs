//! Logical type to SQL / Java type mapping.

/// Canonical physical typing for one logical type token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    pub sql_type: String,
    pub java_type: String,
    pub default_nullable: bool,
}

impl TypeMapping {
    fn new(sql_type: &str, java_type: &str, default_nullable: bool) -> Self {
        Self {
            sql_type: sql_type.to_string(),
            java_type: java_type.to_string(),
            default_nullable,
        }
    }

    /// Columns typed by a model enum are stored by constant name.
    pub fn enumerated(enum_name: &str) -> Self {
        Self::new("VARCHAR(50)", enum_name, true)
    }

    /// Integral key types get identity generation.
    pub fn is_integral(&self) -> bool {
        matches!(self.sql_type.as_str(), "INTEGER" | "BIGINT" | "SMALLINT")
    }
}

/// Map a logical type token. Returns `None` for tokens outside the vocabulary.
///
/// Lowercase Java primitives (`int`, `long`, ...) default to non-nullable,
/// their wrapper spellings default to nullable.
pub fn map(logical_type: &str) -> Option<TypeMapping> {
    let token = logical_type.trim();

    let mapping = match token {
        // Primitives keep their own nullability default
        "int" => TypeMapping::new("INTEGER", "Integer", false),
        "long" => TypeMapping::new("BIGINT", "Long", false),
        "short" => TypeMapping::new("SMALLINT", "Short", false),
        "byte" => TypeMapping::new("SMALLINT", "Byte", false),
        "float" => TypeMapping::new("REAL", "Float", false),
        "double" => TypeMapping::new("DOUBLE PRECISION", "Double", false),
        "char" => TypeMapping::new("CHAR(1)", "Character", false),
        "boolean" | "bool" => TypeMapping::new("BOOLEAN", "Boolean", false),
        _ => return map_reference_type(token),
    };

    Some(mapping)
}

fn map_reference_type(token: &str) -> Option<TypeMapping> {
    let lower = token.to_lowercase();

    let mapping = match lower.as_str() {
        // Integer types
        "integer" => TypeMapping::new("INTEGER", "Integer", true),
        "long" => TypeMapping::new("BIGINT", "Long", true),
        "short" => TypeMapping::new("SMALLINT", "Short", true),
        "byte" => TypeMapping::new("SMALLINT", "Byte", true),

        // Floating point
        "float" => TypeMapping::new("REAL", "Float", true),
        "double" => TypeMapping::new("DOUBLE PRECISION", "Double", true),
        "bigdecimal" | "decimal" => TypeMapping::new("NUMERIC(19,2)", "BigDecimal", true),

        // String types
        "string" | "varchar" => TypeMapping::new("VARCHAR(255)", "String", true),
        "text" => TypeMapping::new("TEXT", "String", true),
        "character" => TypeMapping::new("CHAR(1)", "Character", true),

        // Boolean
        "boolean" => TypeMapping::new("BOOLEAN", "Boolean", true),

        // Date/time
        "date" | "localdate" => TypeMapping::new("DATE", "LocalDate", true),
        "localdatetime" | "datetime" | "timestamp" => {
            TypeMapping::new("TIMESTAMP", "LocalDateTime", true)
        }
        "localtime" | "time" => TypeMapping::new("TIME", "LocalTime", true),
        "instant" => TypeMapping::new("TIMESTAMP WITH TIME ZONE", "Instant", true),

        // Identifiers
        "uuid" => TypeMapping::new("UUID", "UUID", true),
        "id" | "identifier" | "ref" => TypeMapping::new("BIGINT", "Long", false),

        _ => return None,
    };

    Some(mapping)
}

/// Import needed to use a mapped Java type, if any.
pub fn java_import(java_type: &str) -> Option<&'static str> {
    match java_type {
        "LocalDate" => Some("java.time.LocalDate"),
        "LocalDateTime" => Some("java.time.LocalDateTime"),
        "LocalTime" => Some("java.time.LocalTime"),
        "Instant" => Some("java.time.Instant"),
        "BigDecimal" => Some("java.math.BigDecimal"),
        "UUID" => Some("java.util.UUID"),
        _ => None,
    }
}

/// Every token the mapper recognizes, in documentation order.
pub const VOCABULARY: &[&str] = &[
    "int", "integer", "Integer", "long", "Long", "short", "Short", "byte", "Byte", "float",
    "Float", "double", "Double", "BigDecimal", "decimal", "String", "varchar", "Text", "char",
    "Character", "boolean", "bool", "Boolean", "Date", "LocalDate", "LocalDateTime", "DateTime",
    "Timestamp", "LocalTime", "Time", "Instant", "UUID", "ID", "Id", "Identifier", "Ref",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_is_total() {
        for token in VOCABULARY {
            let mapping = map(token).unwrap_or_else(|| panic!("unmapped token {token}"));
            assert!(!mapping.sql_type.is_empty());
            assert!(!mapping.java_type.is_empty());
        }
    }

    #[test]
    fn test_unknown_token() {
        assert_eq!(map("Blob"), None);
        assert_eq!(map("List<String>"), None);
        assert_eq!(map(""), None);
    }

    #[test]
    fn test_primitive_nullability() {
        assert!(!map("long").unwrap().default_nullable);
        assert!(map("Long").unwrap().default_nullable);
        assert!(!map("boolean").unwrap().default_nullable);
        assert!(map("Boolean").unwrap().default_nullable);
        assert!(map("String").unwrap().default_nullable);
    }

    #[test]
    fn test_canonical_types() {
        assert_eq!(map("Long").unwrap().sql_type, "BIGINT");
        assert_eq!(map("String").unwrap().sql_type, "VARCHAR(255)");
        assert_eq!(map("Double").unwrap().sql_type, "DOUBLE PRECISION");
        assert_eq!(map("LocalDate").unwrap().java_type, "LocalDate");
        assert_eq!(map("DateTime").unwrap().java_type, "LocalDateTime");
        assert_eq!(map("BigDecimal").unwrap().sql_type, "NUMERIC(19,2)");
    }

    #[test]
    fn test_java_imports() {
        assert_eq!(java_import("LocalDate"), Some("java.time.LocalDate"));
        assert_eq!(java_import("BigDecimal"), Some("java.math.BigDecimal"));
        assert_eq!(java_import("String"), None);
    }
}

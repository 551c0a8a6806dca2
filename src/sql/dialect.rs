//! SQL dialect selection and identifier handling.

/// SQL dialect variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Standard SQL
    Generic,
    /// PostgreSQL
    #[default]
    PostgreSQL,
    /// MySQL
    MySQL,
}

/// Words that cannot be used bare as table or column names.
const RESERVED: &[&str] = &[
    "all", "alter", "and", "as", "asc", "between", "by", "case", "check", "column", "constraint",
    "create", "cross", "current", "default", "delete", "desc", "distinct", "drop", "else", "end",
    "exists", "foreign", "from", "full", "grant", "group", "having", "in", "index", "inner",
    "insert", "into", "is", "join", "key", "left", "like", "limit", "not", "null", "on", "or",
    "order", "outer", "primary", "references", "right", "select", "set", "table", "then", "to",
    "union", "unique", "update", "user", "using", "values", "when", "where", "with",
];

impl Dialect {
    /// Parse dialect from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "generic" | "sql" => Some(Self::Generic),
            "postgres" | "postgresql" | "pg" => Some(Self::PostgreSQL),
            "mysql" | "mariadb" => Some(Self::MySQL),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::PostgreSQL => "postgresql",
            Self::MySQL => "mysql",
        }
    }

    /// Clause placed after the type of a database-generated key.
    pub fn identity_clause(self) -> Option<&'static str> {
        match self {
            Self::PostgreSQL => Some("GENERATED BY DEFAULT AS IDENTITY"),
            Self::MySQL => Some("AUTO_INCREMENT"),
            Self::Generic => None,
        }
    }

    pub fn is_reserved(ident: &str) -> bool {
        RESERVED.contains(&ident.to_lowercase().as_str())
    }

    /// Quote `ident` if it collides with a reserved word.
    pub fn quote(self, ident: &str) -> String {
        if !Self::is_reserved(ident) {
            return ident.to_string();
        }
        match self {
            Self::MySQL => format!("`{}`", ident),
            Self::Generic | Self::PostgreSQL => format!("\"{}\"", ident),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(Dialect::from_str("Postgres"), Some(Dialect::PostgreSQL));
        assert_eq!(Dialect::from_str("mysql"), Some(Dialect::MySQL));
        assert_eq!(Dialect::from_str("generic"), Some(Dialect::Generic));
        assert_eq!(Dialect::from_str("oracle"), None);
        assert_eq!(Dialect::default(), Dialect::PostgreSQL);
    }

    #[test]
    fn test_quote_reserved() {
        assert_eq!(Dialect::PostgreSQL.quote("user"), "\"user\"");
        assert_eq!(Dialect::MySQL.quote("order"), "`order`");
        assert_eq!(Dialect::Generic.quote("usuario"), "usuario");
    }

    #[test]
    fn test_identity_clause() {
        assert_eq!(
            Dialect::PostgreSQL.identity_clause(),
            Some("GENERATED BY DEFAULT AS IDENTITY")
        );
        assert_eq!(Dialect::MySQL.identity_clause(), Some("AUTO_INCREMENT"));
        assert_eq!(Dialect::Generic.identity_clause(), None);
    }
}

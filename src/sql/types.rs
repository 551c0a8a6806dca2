//! Canonical column types to dialect-specific spellings.

use super::Dialect;

/// Render a canonical SQL type (as produced by the type mapper) for `dialect`.
pub fn render_type(sql_type: &str, dialect: Dialect) -> String {
    match dialect {
        Dialect::MySQL => render_mysql_type(sql_type),
        Dialect::PostgreSQL => render_postgres_type(sql_type),
        Dialect::Generic => sql_type.to_string(),
    }
}

fn render_postgres_type(sql_type: &str) -> String {
    match sql_type {
        "TIMESTAMP WITH TIME ZONE" => "TIMESTAMPTZ".to_string(),
        _ => sql_type.to_string(),
    }
}

fn render_mysql_type(sql_type: &str) -> String {
    let base = sql_type.split('(').next().unwrap_or(sql_type).trim();
    let args = &sql_type[base.len()..];

    match base {
        "REAL" => "FLOAT".to_string(),
        "DOUBLE PRECISION" => "DOUBLE".to_string(),
        "NUMERIC" => format!("DECIMAL{}", args),
        "TIMESTAMP" | "TIMESTAMP WITH TIME ZONE" => "DATETIME".to_string(),
        "UUID" => "CHAR(36)".to_string(),

        // INTEGER, BIGINT, VARCHAR(n), TEXT, BOOLEAN, DATE, TIME, ...
        _ => sql_type.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_types() {
        assert_eq!(render_type("BIGINT", Dialect::PostgreSQL), "BIGINT");
        assert_eq!(
            render_type("TIMESTAMP WITH TIME ZONE", Dialect::PostgreSQL),
            "TIMESTAMPTZ"
        );
    }

    #[test]
    fn test_mysql_types() {
        assert_eq!(render_type("DOUBLE PRECISION", Dialect::MySQL), "DOUBLE");
        assert_eq!(render_type("NUMERIC(19,2)", Dialect::MySQL), "DECIMAL(19,2)");
        assert_eq!(render_type("UUID", Dialect::MySQL), "CHAR(36)");
        assert_eq!(render_type("VARCHAR(255)", Dialect::MySQL), "VARCHAR(255)");
    }

    #[test]
    fn test_generic_types_unchanged() {
        assert_eq!(render_type("UUID", Dialect::Generic), "UUID");
        assert_eq!(render_type("TIMESTAMP", Dialect::Generic), "TIMESTAMP");
    }
}

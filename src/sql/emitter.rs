//! DDL rendering.

use super::{render_type, Dialect};
use crate::ir::{PhysicalModel, Table};
use std::collections::HashSet;
use unicode_width::UnicodeWidthStr;

/// Foreign key whose target table is created later in the script.
struct DeferredKey {
    table: String,
    column: String,
    ref_table: String,
    ref_column: String,
}

/// Render the whole model as PostgreSQL DDL.
pub fn emit(model: &PhysicalModel) -> String {
    emit_with_dialect(model, Dialect::PostgreSQL)
}

pub fn emit_with_dialect(model: &PhysicalModel, dialect: Dialect) -> String {
    let names: Vec<&str> = model.tables.keys().map(String::as_str).collect();
    emit_tables(model, &names, dialect)
}

/// Render `CREATE TABLE` statements for the named tables only.
///
/// Tables outside `names` are assumed to exist already, so references to
/// them stay inline.
pub fn emit_tables(model: &PhysicalModel, names: &[&str], dialect: Dialect) -> String {
    let (mut ordered, mut joins): (Vec<&Table>, Vec<&Table>) = model
        .tables
        .values()
        .filter(|t| names.contains(&t.name.as_str()))
        .partition(|t| !t.is_join_table());
    // join tables follow their relationships; unlinked ones go last
    joins.sort_by_key(|t| {
        model
            .relationships
            .iter()
            .position(|l| l.join_table_name.as_deref() == Some(t.name.as_str()))
            .unwrap_or(usize::MAX)
    });
    ordered.extend(joins);

    let mut pending: HashSet<&str> = ordered.iter().map(|t| t.name.as_str()).collect();
    let mut deferred = Vec::new();
    let mut statements = Vec::new();

    for table in &ordered {
        statements.push(create_table(table, dialect, &pending, &mut deferred));
        pending.remove(table.name.as_str());
    }

    for key in &deferred {
        statements.push(format!(
            "ALTER TABLE {} ADD FOREIGN KEY ({}) REFERENCES {} ({});",
            dialect.quote(&key.table),
            dialect.quote(&key.column),
            dialect.quote(&key.ref_table),
            dialect.quote(&key.ref_column)
        ));
    }

    let mut output = statements.join("\n\n");
    if !output.is_empty() {
        output.push('\n');
    }
    output
}

fn create_table(
    table: &Table,
    dialect: Dialect,
    pending: &HashSet<&str>,
    deferred: &mut Vec<DeferredKey>,
) -> String {
    let composite = table.is_join_table();
    let names: Vec<String> = table.columns.iter().map(|c| dialect.quote(&c.name)).collect();
    let width = names.iter().map(|n| n.width()).max().unwrap_or(0);

    let mut lines = Vec::with_capacity(table.columns.len() + 1);
    for (col, name) in table.columns.iter().zip(&names) {
        let mut line = String::from("    ");
        line.push_str(name);
        line.push_str(&" ".repeat(width - name.width() + 1));
        line.push_str(&render_type(&col.sql_type, dialect));

        if col.primary_key && col.generated {
            if let Some(clause) = dialect.identity_clause() {
                line.push(' ');
                line.push_str(clause);
            }
        }
        if col.primary_key && !composite {
            line.push_str(" PRIMARY KEY");
        } else if !col.nullable {
            line.push_str(" NOT NULL");
        }
        if col.unique && !col.primary_key {
            line.push_str(" UNIQUE");
        }

        if let Some(r) = &col.references {
            if r.table != table.name && pending.contains(r.table.as_str()) {
                deferred.push(DeferredKey {
                    table: table.name.clone(),
                    column: col.name.clone(),
                    ref_table: r.table.clone(),
                    ref_column: r.column.clone(),
                });
            } else {
                line.push_str(&format!(
                    " REFERENCES {} ({})",
                    dialect.quote(&r.table),
                    dialect.quote(&r.column)
                ));
            }
        }
        lines.push(line);
    }

    if composite {
        let keys: Vec<String> = table
            .columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| dialect.quote(&c.name))
            .collect();
        lines.push(format!("    PRIMARY KEY ({})", keys.join(", ")));
    }

    format!(
        "CREATE TABLE {} (\n{}\n);",
        dialect.quote(&table.name),
        lines.join(",\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::fixtures::*;
    use crate::ir::{Column, Link, LinkKind};
    use pretty_assertions::assert_eq;

    fn shop() -> PhysicalModel {
        model(
            vec![
                table(
                    "usuario",
                    vec![id_column(), column("nombre", "VARCHAR(255)", "String")],
                ),
                table(
                    "producto",
                    vec![
                        id_column(),
                        column("precio", "DOUBLE PRECISION", "Double"),
                        fk_column("usuario_id", "usuario"),
                    ],
                ),
            ],
            vec![fk_link("r1", "producto", "usuario", "usuario_id")],
        )
    }

    #[test]
    fn test_emit_postgres() {
        let expected = "\
CREATE TABLE usuario (
    id     BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
    nombre VARCHAR(255)
);

CREATE TABLE producto (
    id         BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
    precio     DOUBLE PRECISION,
    usuario_id BIGINT NOT NULL REFERENCES usuario (id)
);
";
        assert_eq!(emit(&shop()), expected);
    }

    #[test]
    fn test_emit_mysql() {
        let sql = emit_with_dialect(&shop(), Dialect::MySQL);
        assert!(sql.contains("    id     BIGINT AUTO_INCREMENT PRIMARY KEY,\n"));
        assert!(sql.contains("    precio     DOUBLE,\n"));
    }

    #[test]
    fn test_emit_is_idempotent() {
        let m = shop();
        assert_eq!(emit(&m), emit(&m));
        assert_eq!(emit(&m), emit(&m.clone()));
    }

    #[test]
    fn test_forward_reference_deferred() {
        let m = model(
            vec![
                table("producto", vec![id_column(), fk_column("usuario_id", "usuario")]),
                table("usuario", vec![id_column()]),
            ],
            vec![fk_link("r1", "producto", "usuario", "usuario_id")],
        );
        let expected = "\
CREATE TABLE producto (
    id         BIGINT PRIMARY KEY,
    usuario_id BIGINT NOT NULL
);

CREATE TABLE usuario (
    id BIGINT PRIMARY KEY
);

ALTER TABLE producto ADD FOREIGN KEY (usuario_id) REFERENCES usuario (id);
";
        assert_eq!(emit_with_dialect(&m, Dialect::Generic), expected);
    }

    #[test]
    fn test_join_table_last_with_composite_key() {
        let mut join = table(
            "curso_estudiante",
            vec![
                Column {
                    primary_key: true,
                    ..fk_column("curso_id", "curso")
                },
                Column {
                    primary_key: true,
                    ..fk_column("estudiante_id", "estudiante")
                },
            ],
        );
        join.source_element_id = None;
        let m = model(
            vec![
                table("curso", vec![id_column()]),
                join,
                table("estudiante", vec![id_column()]),
            ],
            vec![Link {
                id: "r1".into(),
                kind: LinkKind::JoinTable,
                owning_table: "curso".into(),
                referenced_table: "estudiante".into(),
                join_table_name: Some("curso_estudiante".into()),
                column: None,
            }],
        );

        let sql = emit_with_dialect(&m, Dialect::Generic);
        let expected_tail = "\
CREATE TABLE curso_estudiante (
    curso_id      BIGINT NOT NULL REFERENCES curso (id),
    estudiante_id BIGINT NOT NULL REFERENCES estudiante (id),
    PRIMARY KEY (curso_id, estudiante_id)
);
";
        assert!(sql.ends_with(expected_tail), "{sql}");
        assert!(!sql.contains("ALTER TABLE"));
    }

    #[test]
    fn test_join_tables_follow_relationship_order() {
        fn join(a: &str, b: &str) -> Table {
            let mut t = table(
                &format!("{}_{}", a, b),
                vec![
                    Column {
                        primary_key: true,
                        ..fk_column(&format!("{}_id", a), a)
                    },
                    Column {
                        primary_key: true,
                        ..fk_column(&format!("{}_id", b), b)
                    },
                ],
            );
            t.source_element_id = None;
            t
        }
        fn link(id: &str, a: &str, b: &str) -> Link {
            Link {
                id: id.into(),
                kind: LinkKind::JoinTable,
                owning_table: a.into(),
                referenced_table: b.into(),
                join_table_name: Some(format!("{}_{}", a, b)),
                column: None,
            }
        }

        let m = model(
            vec![
                table("a", vec![id_column()]),
                table("b", vec![id_column()]),
                table("c", vec![id_column()]),
                join("b", "c"),
                join("a", "b"),
            ],
            vec![link("r1", "a", "b"), link("r2", "b", "c")],
        );
        let sql = emit(&m);
        let a_b = sql.find("CREATE TABLE a_b (").unwrap();
        let b_c = sql.find("CREATE TABLE b_c (").unwrap();
        assert!(a_b < b_c, "{sql}");
        assert!(sql.find("CREATE TABLE c (").unwrap() < a_b);
    }

    #[test]
    fn test_unique_and_reserved_words() {
        let m = model(
            vec![
                table("user", vec![id_column()]),
                table(
                    "perfil",
                    vec![
                        id_column(),
                        Column {
                            unique: true,
                            ..fk_column("user_id", "user")
                        },
                    ],
                ),
            ],
            vec![],
        );
        let sql = emit(&m);
        assert!(sql.contains("CREATE TABLE \"user\" ("));
        assert!(sql.contains("user_id BIGINT NOT NULL UNIQUE REFERENCES \"user\" (id)"));
    }

    #[test]
    fn test_emit_tables_subset() {
        let sql = emit_tables(&shop(), &["producto"], Dialect::PostgreSQL);
        assert!(!sql.contains("CREATE TABLE usuario"));
        assert!(sql.contains("usuario_id BIGINT NOT NULL REFERENCES usuario (id)"));
        assert_eq!(sql.matches("CREATE TABLE").count(), 1);
    }

    #[test]
    fn test_self_reference_inline() {
        let mut parent = fk_column("empleado_id", "empleado");
        parent.nullable = true;
        let m = model(vec![table("empleado", vec![id_column(), parent])], vec![]);
        let sql = emit_with_dialect(&m, Dialect::Generic);
        assert!(sql.contains("empleado_id BIGINT REFERENCES empleado (id)"));
        assert!(!sql.contains("ALTER TABLE"));
    }

    #[test]
    fn test_alignment_uses_display_width() {
        let m = model(
            vec![table(
                "cliente",
                vec![id_column(), column("名前", "VARCHAR(255)", "String")],
            )],
            vec![],
        );
        let sql = emit_with_dialect(&m, Dialect::Generic);
        assert!(sql.contains("    id   BIGINT PRIMARY KEY,\n    名前 VARCHAR(255)\n"));
    }

    #[test]
    fn test_empty_model() {
        assert_eq!(emit(&PhysicalModel::default()), "");
    }
}

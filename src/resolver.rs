//! Cardinality-driven relationship resolution.
//!
//! Association, aggregation and composition are physically identical and
//! resolve through the cardinality pair alone. Inheritance and realization
//! select the joined-table strategy; dependencies have no physical shape.

use crate::ast::{Cardinality, Relationship, RelationshipKind};
use crate::error::ModelError;
use crate::ir::{Column, ColumnRef, Link, LinkKind, Table};
use crate::naming;

/// How a UML relationship kind is represented physically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Structural,
    Inheritance,
    NonStructural,
}

pub fn family(kind: RelationshipKind) -> Family {
    match kind {
        RelationshipKind::Association
        | RelationshipKind::Aggregation
        | RelationshipKind::Composition => Family::Structural,
        RelationshipKind::Inheritance | RelationshipKind::Realization => Family::Inheritance,
        RelationshipKind::Dependency => Family::NonStructural,
    }
}

/// Physical shape selected for one structural relationship.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Add `column` to `link.owning_table`
    ForeignKey { link: Link, column: Column },
    /// Append `table` to the model
    JoinTable { link: Link, table: Table },
}

impl Resolution {
    pub fn link(&self) -> &Link {
        match self {
            Resolution::ForeignKey { link, .. } | Resolution::JoinTable { link, .. } => link,
        }
    }
}

fn cardinality_pair(rel: &Relationship) -> Result<(Cardinality, Cardinality), ModelError> {
    let ambiguous = || ModelError::AmbiguousCardinality {
        relationship: rel.id.clone(),
        source_cardinality: rel.source_cardinality.clone(),
        target_cardinality: rel.target_cardinality.clone(),
    };
    let source = Cardinality::parse(&rel.source_cardinality).ok_or_else(ambiguous)?;
    let target = Cardinality::parse(&rel.target_cardinality).ok_or_else(ambiguous)?;
    Ok((source, target))
}

fn key_of<'a>(table: &'a Table) -> Result<&'a Column, ModelError> {
    table
        .primary_key()
        .ok_or_else(|| ModelError::InvalidPhysicalModel {
            detail: format!("table `{}` has no primary key", table.name),
        })
}

/// Foreign-key column on `owner` pointing at the key of `referenced`.
fn foreign_key_column(
    owner: &Table,
    referenced: &Table,
    nullable: bool,
    unique: bool,
) -> Result<Column, ModelError> {
    let key = key_of(referenced)?;
    let base = format!("{}_{}", referenced.name, key.name);
    let name = naming::disambiguate(&base, |n| owner.has_column(n));

    Ok(Column {
        name,
        sql_type: key.sql_type.clone(),
        java_type: key.java_type.clone(),
        nullable,
        primary_key: false,
        unique,
        generated: false,
        references: Some(ColumnRef {
            table: referenced.name.clone(),
            column: key.name.clone(),
        }),
    })
}

/// Deterministic join table name: both table names in lexicographic order.
pub fn join_table_name(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}_{}", a, b)
    } else {
        format!("{}_{}", b, a)
    }
}

fn join_table(name: String, source: &Table, target: &Table) -> Result<Table, ModelError> {
    let (first, second) = if source.name <= target.name {
        (source, target)
    } else {
        (target, source)
    };

    let mut columns: Vec<Column> = Vec::with_capacity(2);
    for side in [first, second] {
        let key = key_of(side)?;
        let base = format!("{}_{}", side.name, key.name);
        let col_name = naming::disambiguate(&base, |n| columns.iter().any(|c| c.name == n));
        columns.push(Column {
            name: col_name,
            sql_type: key.sql_type.clone(),
            java_type: key.java_type.clone(),
            nullable: false,
            primary_key: true,
            unique: false,
            generated: false,
            references: Some(ColumnRef {
                table: side.name.clone(),
                column: key.name.clone(),
            }),
        });
    }

    Ok(Table {
        name,
        columns,
        source_element_id: None,
        parent: None,
        is_abstract: false,
        methods: vec![],
    })
}

/// Resolve a structural relationship between two existing tables.
///
/// `table_taken` reports whether a join table name is already used in the
/// model under construction.
pub fn resolve(
    rel: &Relationship,
    source: &Table,
    target: &Table,
    table_taken: impl Fn(&str) -> bool,
) -> Result<Resolution, ModelError> {
    let (source_card, target_card) = cardinality_pair(rel)?;

    let fk = |owner: &Table,
              referenced: &Table,
              referenced_card: Cardinality,
              unique: bool|
     -> Result<Resolution, ModelError> {
        let nullable = referenced_card == Cardinality::ZeroOrOne;
        let column = foreign_key_column(owner, referenced, nullable, unique)?;
        let link = Link {
            id: rel.id.clone(),
            kind: LinkKind::ForeignKey,
            owning_table: owner.name.clone(),
            referenced_table: referenced.name.clone(),
            join_table_name: None,
            column: Some(column.name.clone()),
        };
        Ok(Resolution::ForeignKey { link, column })
    };

    match (source_card.is_single(), target_card.is_single()) {
        // One-to-one: the source owns the key
        (true, true) => fk(source, target, target_card, true),
        // One-to-many: the key lives on the many side
        (true, false) => fk(target, source, source_card, false),
        (false, true) => fk(source, target, target_card, false),
        (false, false) => {
            let base = join_table_name(&source.name, &target.name);
            let name = naming::disambiguate(&base, &table_taken);
            let table = join_table(name.clone(), source, target)?;
            let link = Link {
                id: rel.id.clone(),
                kind: LinkKind::JoinTable,
                owning_table: source.name.clone(),
                referenced_table: target.name.clone(),
                join_table_name: Some(name),
                column: None,
            };
            Ok(Resolution::JoinTable { link, table })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::fixtures::{column, id_column, table};

    fn rel(source: &str, target: &str) -> Relationship {
        Relationship {
            id: "r1".into(),
            source_id: "a".into(),
            target_id: "b".into(),
            relationship: RelationshipKind::Association,
            source_cardinality: source.into(),
            target_cardinality: target.into(),
        }
    }

    fn tables() -> (Table, Table) {
        (
            table("usuario", vec![id_column(), column("nombre", "VARCHAR(255)", "String")]),
            table("producto", vec![id_column()]),
        )
    }

    fn resolve_pair(source: &str, target: &str) -> Resolution {
        let (usuario, producto) = tables();
        resolve(&rel(source, target), &usuario, &producto, |_| false).unwrap()
    }

    #[test]
    fn test_family_lookup() {
        assert_eq!(family(RelationshipKind::Composition), Family::Structural);
        assert_eq!(family(RelationshipKind::Aggregation), Family::Structural);
        assert_eq!(family(RelationshipKind::Realization), Family::Inheritance);
        assert_eq!(family(RelationshipKind::Dependency), Family::NonStructural);
    }

    #[test]
    fn test_one_to_one_source_owns() {
        for (s, t) in [("1", "1"), ("1", "0..1"), ("0..1", "1"), ("0..1", "0..1")] {
            match resolve_pair(s, t) {
                Resolution::ForeignKey { link, column } => {
                    assert_eq!(link.owning_table, "usuario");
                    assert_eq!(link.referenced_table, "producto");
                    assert_eq!(column.name, "producto_id");
                    assert!(column.unique);
                    assert_eq!(column.nullable, t == "0..1");
                }
                other => panic!("expected foreign key for ({s}, {t}), got {other:?}"),
            }
        }
    }

    #[test]
    fn test_one_to_many_key_on_many_side() {
        for (s, t) in [("1", "*"), ("1", "0..*"), ("1", "1..*"), ("0..1", "n")] {
            match resolve_pair(s, t) {
                Resolution::ForeignKey { link, column } => {
                    assert_eq!(link.owning_table, "producto");
                    assert_eq!(link.referenced_table, "usuario");
                    assert_eq!(column.name, "usuario_id");
                    assert!(!column.unique);
                    assert_eq!(column.nullable, s == "0..1");
                }
                other => panic!("expected foreign key for ({s}, {t}), got {other:?}"),
            }
        }
    }

    #[test]
    fn test_many_to_one_key_on_source() {
        match resolve_pair("*", "1") {
            Resolution::ForeignKey { link, column } => {
                assert_eq!(link.owning_table, "usuario");
                assert_eq!(column.name, "producto_id");
                assert!(!column.nullable);
            }
            other => panic!("expected foreign key, got {other:?}"),
        }
    }

    #[test]
    fn test_many_to_many_join_table() {
        for (s, t) in [("*", "*"), ("0..*", "1..*"), ("1..*", "n")] {
            match resolve_pair(s, t) {
                Resolution::JoinTable { link, table } => {
                    assert_eq!(link.join_table_name.as_deref(), Some("producto_usuario"));
                    assert_eq!(table.name, "producto_usuario");
                    assert!(table.is_join_table());
                    let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
                    assert_eq!(names, vec!["producto_id", "usuario_id"]);
                    assert!(table.columns.iter().all(|c| c.primary_key && !c.nullable));
                }
                other => panic!("expected join table for ({s}, {t}), got {other:?}"),
            }
        }
    }

    #[test]
    fn test_join_name_independent_of_direction() {
        let (usuario, producto) = tables();
        let forward = resolve(&rel("*", "*"), &usuario, &producto, |_| false).unwrap();
        let backward = resolve(&rel("*", "*"), &producto, &usuario, |_| false).unwrap();
        assert_eq!(
            forward.link().join_table_name,
            backward.link().join_table_name
        );
    }

    #[test]
    fn test_self_many_to_many() {
        let persona = table("persona", vec![id_column()]);
        match resolve(&rel("*", "*"), &persona, &persona, |_| false).unwrap() {
            Resolution::JoinTable { table, .. } => {
                assert_eq!(table.name, "persona_persona");
                assert_eq!(table.columns[0].name, "persona_id");
                assert_eq!(table.columns[1].name, "persona_id_2");
            }
            other => panic!("expected join table, got {other:?}"),
        }
    }

    #[test]
    fn test_colliding_names_get_suffix() {
        let usuario = table("usuario", vec![id_column()]);
        let producto = table(
            "producto",
            vec![id_column(), column("usuario_id", "BIGINT", "Long")],
        );
        match resolve(&rel("1", "*"), &usuario, &producto, |_| false).unwrap() {
            Resolution::ForeignKey { column, .. } => assert_eq!(column.name, "usuario_id_2"),
            other => panic!("expected foreign key, got {other:?}"),
        }

        let taken = resolve(&rel("*", "*"), &usuario, &producto, |n| n == "producto_usuario")
            .unwrap();
        assert_eq!(
            taken.link().join_table_name.as_deref(),
            Some("producto_usuario_2")
        );
    }

    #[test]
    fn test_ambiguous_cardinality() {
        let (usuario, producto) = tables();
        for (s, t) in [("", "*"), ("1", "many"), ("2", "3")] {
            let err = resolve(&rel(s, t), &usuario, &producto, |_| false).unwrap_err();
            assert!(matches!(err, ModelError::AmbiguousCardinality { .. }));
        }
    }
}

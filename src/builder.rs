//! Logical model to physical model transformation.

use crate::ast::{Element, ElementType, LogicalModel, Relationship};
use crate::attribute::{parse_attribute, parse_enum_constant, parse_method};
use crate::error::{Endpoint, ModelError, ValidationErrors};
use crate::ir::{Column, ColumnRef, EnumType, PhysicalModel, Table};
use crate::naming;
use crate::resolver::{self, Family, Resolution};
use crate::typemap::{self, TypeMapping};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Build the physical schema, or every validation error found on the way.
pub fn build(model: &LogicalModel) -> Result<PhysicalModel, ValidationErrors> {
    let mut errors = Vec::new();
    let mut physical = PhysicalModel::default();

    let mut elements: HashMap<&str, &Element> = HashMap::new();
    for element in &model.elements {
        if elements.insert(element.id.as_str(), element).is_some() {
            errors.push(ModelError::DuplicateElementId {
                id: element.id.clone(),
            });
        }
    }

    for element in model
        .elements
        .iter()
        .filter(|e| e.element_type == ElementType::Enum)
    {
        let enum_type = build_enum(element, &mut errors);
        if physical.enums.contains_key(&enum_type.name) {
            debug!(name = %enum_type.name, "duplicate enum ignored");
            continue;
        }
        physical.enums.insert(enum_type.name.clone(), enum_type);
    }

    // element id -> table name
    let mut table_of: HashMap<&str, String> = HashMap::new();
    for element in model
        .elements
        .iter()
        .filter(|e| e.element_type.is_class_like())
    {
        let name = naming::table_name(&element.class_name);
        if let Some(existing) = physical.tables.get(&name) {
            errors.push(ModelError::DuplicateTableName {
                table: name,
                first: existing.source_element_id.clone().unwrap_or_default(),
                second: element.id.clone(),
            });
            continue;
        }

        let table = build_table(element, name.clone(), &physical.enums, &mut errors);
        debug!(table = %name, columns = table.columns.len(), "mapped element");
        table_of.insert(element.id.as_str(), name.clone());
        physical.tables.insert(name, table);
    }

    let mut inheritance: Vec<(&Relationship, String, String)> = Vec::new();
    let mut structural: Vec<(&Relationship, String, String)> = Vec::new();

    for rel in &model.relationships {
        let mut dangling = false;
        for (endpoint, id) in [
            (Endpoint::Source, &rel.source_id),
            (Endpoint::Target, &rel.target_id),
        ] {
            if !elements.contains_key(id.as_str()) {
                errors.push(ModelError::DanglingReference {
                    relationship: rel.id.clone(),
                    endpoint,
                    element_id: id.clone(),
                });
                dangling = true;
            }
        }
        if dangling {
            continue;
        }

        let tables = (
            table_of.get(rel.source_id.as_str()),
            table_of.get(rel.target_id.as_str()),
        );
        match (resolver::family(rel.relationship), tables) {
            (Family::NonStructural, _) => {
                debug!(relationship = %rel.id, "dependency has no physical shape");
            }
            (Family::Inheritance, (Some(child), Some(parent))) => {
                inheritance.push((rel, child.clone(), parent.clone()));
            }
            (Family::Inheritance, _) => {
                debug!(relationship = %rel.id, "realization of a non-persistent type");
            }
            (Family::Structural, (Some(source), Some(target))) => {
                structural.push((rel, source.clone(), target.clone()));
            }
            (Family::Structural, _) => {
                warn!(
                    relationship = %rel.id,
                    kind = rel.relationship.as_str(),
                    "skipping relationship with a non-persistent endpoint"
                );
            }
        }
    }

    apply_inheritance(&mut physical, &inheritance, &mut errors);

    for (rel, source, target) in &structural {
        let resolution = {
            let (Some(source), Some(target)) =
                (physical.tables.get(source), physical.tables.get(target))
            else {
                continue;
            };
            resolver::resolve(rel, source, target, |n| physical.tables.contains_key(n))
        };

        match resolution {
            Ok(Resolution::ForeignKey { link, column }) => {
                debug!(
                    relationship = %link.id,
                    owner = %link.owning_table,
                    column = %column.name,
                    "foreign key"
                );
                if let Some(owner) = physical.tables.get_mut(&link.owning_table) {
                    owner.columns.push(column);
                }
                physical.relationships.push(link);
            }
            Ok(Resolution::JoinTable { link, table }) => {
                debug!(relationship = %link.id, table = %table.name, "join table");
                physical.tables.insert(table.name.clone(), table);
                physical.relationships.push(link);
            }
            Err(err) => errors.push(err),
        }
    }

    if let Some(errors) = ValidationErrors::from_vec(errors) {
        info!(errors = errors.len(), "logical model rejected");
        return Err(errors);
    }

    info!(
        tables = physical.tables.len(),
        relationships = physical.relationships.len(),
        enums = physical.enums.len(),
        "built physical model"
    );
    Ok(physical)
}

fn build_enum(element: &Element, errors: &mut Vec<ModelError>) -> EnumType {
    let mut constants = Vec::new();
    for decl in &element.attributes {
        match parse_enum_constant(decl) {
            Ok(name) if !constants.contains(&name) => constants.push(name),
            Ok(_) => {}
            Err(reason) => errors.push(ModelError::MalformedAttribute {
                declaration: decl.clone(),
                element: element.class_name.clone(),
                reason: reason.to_string(),
            }),
        }
    }
    EnumType {
        name: element.class_name.trim().to_string(),
        constants,
    }
}

/// `id`, `id_<table>` and `<table>_id` name the key of `table`.
fn is_key_name(column: &str, table: &str) -> bool {
    column == "id" || column == format!("id_{}", table) || column == format!("{}_id", table)
}

fn synthetic_key() -> Column {
    Column {
        name: "id".to_string(),
        sql_type: "BIGINT".to_string(),
        java_type: "Long".to_string(),
        nullable: false,
        primary_key: true,
        unique: false,
        generated: true,
        references: None,
    }
}

fn build_table(
    element: &Element,
    name: String,
    enums: &IndexMap<String, EnumType>,
    errors: &mut Vec<ModelError>,
) -> Table {
    let mut columns: Vec<Column> = Vec::new();
    let mut has_key = false;

    for decl in &element.attributes {
        let attr = match parse_attribute(decl) {
            Ok(attr) => attr,
            Err(reason) => {
                errors.push(ModelError::MalformedAttribute {
                    declaration: decl.clone(),
                    element: element.class_name.clone(),
                    reason: reason.to_string(),
                });
                continue;
            }
        };

        let mapping = match enums.get(&attr.type_token) {
            Some(e) => TypeMapping::enumerated(&e.name),
            None => match typemap::map(&attr.type_token) {
                Some(mapping) => mapping,
                None => {
                    errors.push(ModelError::UnknownType {
                        token: attr.type_token.clone(),
                        declaration: decl.trim().to_string(),
                        element: element.class_name.clone(),
                    });
                    continue;
                }
            },
        };

        let column_name = naming::column_name(&attr.name);
        if columns.iter().any(|c| c.name == column_name) {
            errors.push(ModelError::DuplicateColumnName {
                table: name.clone(),
                column: column_name,
            });
            continue;
        }

        let primary_key = !has_key && is_key_name(&column_name, &name);
        has_key |= primary_key;

        columns.push(Column {
            name: column_name,
            nullable: !primary_key && (attr.optional || mapping.default_nullable),
            primary_key,
            unique: false,
            generated: primary_key && mapping.is_integral(),
            references: None,
            sql_type: mapping.sql_type,
            java_type: mapping.java_type,
        });
    }

    if !has_key {
        // "id" is free here, otherwise it would have been the key
        columns.insert(0, synthetic_key());
    }

    let mut methods = Vec::new();
    for sig in &element.methods {
        match parse_method(sig) {
            Ok(method) => methods.push(method),
            Err(reason) => errors.push(ModelError::MalformedMethod {
                signature: sig.clone(),
                element: element.class_name.clone(),
                reason: reason.to_string(),
            }),
        }
    }

    Table {
        name,
        columns,
        source_element_id: Some(element.id.clone()),
        parent: None,
        is_abstract: element.element_type == ElementType::Abstract,
        methods,
    }
}

/// Joined-table strategy: children key on their parent's key and drop
/// columns already declared by an ancestor.
fn apply_inheritance(
    physical: &mut PhysicalModel,
    inheritance: &[(&Relationship, String, String)],
    errors: &mut Vec<ModelError>,
) {
    for (rel, child, parent) in inheritance {
        if child == parent {
            errors.push(ModelError::InheritanceConflict {
                table: child.clone(),
                detail: format!("relationship `{}` makes it its own parent", rel.id),
            });
            continue;
        }
        let Some(table) = physical.tables.get_mut(child) else {
            continue;
        };
        match &table.parent {
            Some(existing) if existing != parent => {
                errors.push(ModelError::InheritanceConflict {
                    table: child.clone(),
                    detail: format!(
                        "already inherits from `{}`, relationship `{}` adds `{}`",
                        existing, rel.id, parent
                    ),
                });
            }
            _ => table.parent = Some(parent.clone()),
        }
    }

    break_cycles(physical, errors);

    let children: Vec<String> = physical
        .tables
        .values()
        .filter(|t| t.parent.is_some())
        .map(|t| t.name.clone())
        .collect();

    for child in children {
        let ancestors = physical.ancestors(&child);
        let (Some(parent), Some(root)) = (ancestors.first(), ancestors.last()) else {
            continue;
        };
        let (Some(parent_key), Some(root_key)) = (parent.primary_key(), root.primary_key()) else {
            continue;
        };

        let reference = ColumnRef {
            table: parent.name.clone(),
            column: parent_key.name.clone(),
        };
        let (sql_type, java_type) = (root_key.sql_type.clone(), root_key.java_type.clone());
        let inherited: HashSet<String> = ancestors
            .iter()
            .flat_map(|t| t.columns.iter())
            .filter(|c| !c.primary_key)
            .map(|c| c.name.clone())
            .collect();

        let Some(table) = physical.tables.get_mut(&child) else {
            continue;
        };
        table
            .columns
            .retain(|c| c.primary_key || !inherited.contains(&c.name));
        if let Some(key) = table.columns.iter_mut().find(|c| c.primary_key) {
            key.sql_type = sql_type;
            key.java_type = java_type;
            key.nullable = false;
            key.generated = false;
            key.references = Some(reference);
        }
        debug!(table = %child, parent = ?table.parent, "joined inheritance");
    }
}

fn break_cycles(physical: &mut PhysicalModel, errors: &mut Vec<ModelError>) {
    let mut in_cycle: HashSet<String> = HashSet::new();

    for start in physical.tables.keys() {
        if in_cycle.contains(start) {
            continue;
        }
        let mut path: Vec<&str> = vec![start.as_str()];
        let mut current = physical.tables[start].parent.as_deref();
        while let Some(name) = current {
            if let Some(pos) = path.iter().position(|p| *p == name) {
                if pos == 0 {
                    errors.push(ModelError::InheritanceConflict {
                        table: start.clone(),
                        detail: format!("inheritance cycle {} -> {}", path.join(" -> "), name),
                    });
                    in_cycle.extend(path.iter().map(|p| p.to_string()));
                }
                break;
            }
            path.push(name);
            current = physical.tables.get(name).and_then(|t| t.parent.as_deref());
        }
    }

    for name in &in_cycle {
        if let Some(table) = physical.tables.get_mut(name) {
            table.parent = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Position, RelationshipKind};
    use crate::ir::LinkKind;

    fn element(id: &str, class_name: &str, attributes: &[&str]) -> Element {
        Element {
            id: id.to_string(),
            class_name: class_name.to_string(),
            attributes: attributes.iter().map(|s| s.to_string()).collect(),
            methods: vec![],
            element_type: ElementType::Class,
            position: Position::default(),
        }
    }

    fn rel(id: &str, source: &str, target: &str, kind: RelationshipKind, cards: (&str, &str)) -> Relationship {
        Relationship {
            id: id.to_string(),
            source_id: source.to_string(),
            target_id: target.to_string(),
            relationship: kind,
            source_cardinality: cards.0.to_string(),
            target_cardinality: cards.1.to_string(),
        }
    }

    #[test]
    fn test_columns_in_declaration_order() {
        let model = LogicalModel {
            elements: vec![element(
                "e1",
                "Usuario",
                &["nombre: String", "id: Long", "fechaAlta: LocalDate", "activo: boolean"],
            )],
            relationships: vec![],
        };
        let physical = build(&model).unwrap();
        let usuario = &physical.tables["usuario"];

        let names: Vec<&str> = usuario.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["nombre", "id", "fecha_alta", "activo"]);

        let id = usuario.column("id").unwrap();
        assert!(id.primary_key && id.generated && !id.nullable);
        assert!(usuario.column("nombre").unwrap().nullable);
        assert!(!usuario.column("activo").unwrap().nullable);
    }

    #[test]
    fn test_synthetic_key() {
        let model = LogicalModel {
            elements: vec![element("e1", "Nota", &["texto: Text"])],
            relationships: vec![],
        };
        let physical = build(&model).unwrap();
        let nota = &physical.tables["nota"];
        assert_eq!(nota.columns[0].name, "id");
        assert!(nota.columns[0].primary_key);
        assert_eq!(nota.columns[1].name, "texto");
    }

    #[test]
    fn test_named_key_conventions() {
        let model = LogicalModel {
            elements: vec![
                element("e1", "Cliente", &["idCliente: Integer", "nombre: String"]),
                element("e2", "Pedido", &["codigo: String", "pedidoId: UUID"]),
            ],
            relationships: vec![],
        };
        let physical = build(&model).unwrap();

        let cliente = physical.tables["cliente"].primary_key().unwrap();
        assert_eq!(cliente.name, "id_cliente");
        assert!(cliente.generated);

        let pedido = physical.tables["pedido"].primary_key().unwrap();
        assert_eq!(pedido.name, "pedido_id");
        assert!(!pedido.generated);
        assert_eq!(physical.tables["pedido"].columns.len(), 2);
    }

    #[test]
    fn test_enum_typed_attribute() {
        let mut estado = element("e0", "Estado", &["ACTIVO", "INACTIVO"]);
        estado.element_type = ElementType::Enum;
        let model = LogicalModel {
            elements: vec![estado, element("e1", "Cuenta", &["estado: Estado"])],
            relationships: vec![],
        };
        let physical = build(&model).unwrap();

        assert_eq!(physical.enums["Estado"].constants, vec!["ACTIVO", "INACTIVO"]);
        let col = physical.tables["cuenta"].column("estado").unwrap();
        assert_eq!(col.sql_type, "VARCHAR(50)");
        assert_eq!(col.java_type, "Estado");
        assert!(!physical.tables.contains_key("estado"));
    }

    #[test]
    fn test_interfaces_have_no_table() {
        let mut pagable = element("e0", "Pagable", &[]);
        pagable.element_type = ElementType::Interface;
        let model = LogicalModel {
            elements: vec![pagable, element("e1", "Factura", &["total: Double"])],
            relationships: vec![rel(
                "r1",
                "e1",
                "e0",
                RelationshipKind::Realization,
                ("", ""),
            )],
        };
        let physical = build(&model).unwrap();
        assert_eq!(physical.tables.len(), 1);
        assert!(physical.tables["factura"].parent.is_none());
    }

    #[test]
    fn test_foreign_key_and_join_table() {
        let model = LogicalModel {
            elements: vec![
                element("u", "Usuario", &["id: Long"]),
                element("p", "Producto", &["id: Long"]),
                element("c", "Categoria", &["id: Long"]),
            ],
            relationships: vec![
                rel("r1", "u", "p", RelationshipKind::Association, ("1", "*")),
                rel("r2", "p", "c", RelationshipKind::Aggregation, ("*", "*")),
                rel("r3", "u", "c", RelationshipKind::Dependency, ("", "")),
            ],
        };
        let physical = build(&model).unwrap();

        let keys: Vec<&str> = physical.tables.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["usuario", "producto", "categoria", "categoria_producto"]);

        let fk = physical.tables["producto"].column("usuario_id").unwrap();
        assert_eq!(fk.references.as_ref().unwrap().table, "usuario");
        assert!(!fk.nullable);

        assert_eq!(physical.relationships.len(), 2);
        assert_eq!(physical.relationships[0].kind, LinkKind::ForeignKey);
        assert_eq!(physical.relationships[1].kind, LinkKind::JoinTable);
        assert!(crate::ir::validate(&physical).is_ok());
    }

    #[test]
    fn test_joined_inheritance() {
        let mut persona = element("p", "Persona", &["id: Long", "nombre: String"]);
        persona.element_type = ElementType::Abstract;
        let model = LogicalModel {
            elements: vec![
                persona,
                element("e", "Empleado", &["nombre: String", "salario: Double"]),
            ],
            relationships: vec![rel(
                "r1",
                "e",
                "p",
                RelationshipKind::Inheritance,
                ("", ""),
            )],
        };
        let physical = build(&model).unwrap();

        let empleado = &physical.tables["empleado"];
        assert_eq!(empleado.parent.as_deref(), Some("persona"));
        let names: Vec<&str> = empleado.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "salario"]);

        let key = empleado.primary_key().unwrap();
        assert!(!key.generated);
        assert_eq!(
            key.references,
            Some(ColumnRef {
                table: "persona".into(),
                column: "id".into()
            })
        );
        assert!(physical.tables["persona"].is_abstract);
        assert!(physical.relationships.is_empty());
    }

    #[test]
    fn test_inheritance_conflicts() {
        let model = LogicalModel {
            elements: vec![
                element("a", "A", &[]),
                element("b", "B", &[]),
                element("c", "C", &[]),
            ],
            relationships: vec![
                rel("r1", "a", "b", RelationshipKind::Inheritance, ("", "")),
                rel("r2", "b", "a", RelationshipKind::Inheritance, ("", "")),
                rel("r3", "c", "a", RelationshipKind::Inheritance, ("", "")),
                rel("r4", "c", "b", RelationshipKind::Inheritance, ("", "")),
            ],
        };
        let errors = build(&model).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| matches!(e, ModelError::InheritanceConflict { .. })));
    }

    #[test]
    fn test_errors_are_aggregated() {
        let model = LogicalModel {
            elements: vec![
                element("u", "Usuario", &["id: Long", "foto: Blob", "alias String"]),
                element("u2", "usuario", &[]),
                element("u", "Otro", &[]),
            ],
            relationships: vec![
                rel("r1", "u", "ghost", RelationshipKind::Association, ("1", "*")),
                rel("r2", "u", "u", RelationshipKind::Association, ("x", "*")),
            ],
        };
        let errors = build(&model).unwrap_err().into_vec();

        assert!(matches!(errors[0], ModelError::DuplicateElementId { .. }));
        assert!(errors.iter().any(|e| matches!(
            e,
            ModelError::UnknownType { token, .. } if token == "Blob"
        )));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ModelError::MalformedAttribute { .. })));
        assert!(errors.iter().any(|e| matches!(
            e,
            ModelError::DuplicateTableName { table, .. } if table == "usuario"
        )));
        assert!(errors.iter().any(|e| matches!(
            e,
            ModelError::DanglingReference { element_id, .. } if element_id == "ghost"
        )));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ModelError::AmbiguousCardinality { .. })));
        assert_eq!(errors.len(), 6);
    }
}

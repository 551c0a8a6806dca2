//! Flat transfer objects for addressable entities.

use super::context::{claim, Context, Entity, FieldKind};
use super::java::{compilation_unit, import_type, push_accessors, Imports};
use super::Layer;
use crate::naming;
use std::collections::HashSet;

pub struct DtoLayer;

impl Layer for DtoLayer {
    fn name(&self) -> &'static str {
        "dto"
    }

    fn render(&self, ctx: &Context) -> Vec<(String, String)> {
        ctx.addressable()
            .map(|e| (ctx.path("dto", &e.type_name, "DTO"), render_dto(ctx, e)))
            .collect()
    }
}

/// Entity reference flattened to its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    /// Field holding the association on the entity
    pub field: String,
    pub target_type: String,
    pub target_id: String,
    /// Abstract targets cannot be stubbed with `new`
    pub instantiable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DtoField {
    pub name: String,
    pub java_type: String,
    pub reference: Option<Reference>,
}

/// DTO fields of `entity`: the id, then scalars and owned keys along the
/// inheritance chain, root first. A flattened key whose name is already
/// taken gets a numeric suffix.
pub fn dto_fields(ctx: &Context, entity: &Entity) -> Vec<DtoField> {
    let mut fields = Vec::new();

    if let Some(id) = ctx.id_field(&entity.table.name) {
        fields.push(DtoField {
            name: id.name.clone(),
            java_type: id.java_type.clone(),
            reference: None,
        });
    }

    for member in ctx.chain(&entity.table.name) {
        for field in &member.fields {
            match &field.kind {
                FieldKind::Scalar { .. } => fields.push(DtoField {
                    name: field.name.clone(),
                    java_type: field.java_type.clone(),
                    reference: None,
                }),
                FieldKind::ManyToOne { target, .. } | FieldKind::OneToOne { target, .. } => {
                    let Some(target_id) = ctx.id_field(target) else {
                        continue;
                    };
                    let instantiable = ctx.entity(target).is_some_and(|t| !t.table.is_abstract);
                    fields.push(DtoField {
                        name: format!("{}Id", field.name),
                        java_type: target_id.java_type.clone(),
                        reference: Some(Reference {
                            field: field.name.clone(),
                            target_type: naming::type_name(target),
                            target_id: target_id.name.clone(),
                            instantiable,
                        }),
                    });
                }
                _ => {}
            }
        }
    }

    // scalars map 1:1 onto entity properties and keep their names
    let mut taken: HashSet<String> = fields
        .iter()
        .filter(|f| f.reference.is_none())
        .map(|f| f.name.clone())
        .collect();
    for field in fields.iter_mut().filter(|f| f.reference.is_some()) {
        field.name = claim(std::slice::from_ref(&field.name), &mut taken);
    }
    fields
}

fn render_dto(ctx: &Context, entity: &Entity) -> String {
    let fields = dto_fields(ctx, entity);
    let mut imports = Imports::new();
    let name = format!("{}DTO", entity.type_name);

    let mut out = format!("public class {} {{\n\n", name);
    for field in &fields {
        import_type(ctx, &field.java_type, &mut imports);
        out.push_str(&format!("    private {} {};\n", field.java_type, field.name));
    }
    if !fields.is_empty() {
        out.push('\n');
    }
    out.push_str(&format!("    public {}() {{\n    }}\n", name));
    for field in &fields {
        push_accessors(&mut out, &field.name, &field.java_type);
    }
    out.push_str("}\n");

    compilation_unit(&ctx.cfg.package("dto"), &imports, &out)
}

use super::context::{Context, Entity, FieldKind};
use super::java::{compilation_unit, import_type, Imports};
use super::Layer;
use crate::naming::capitalize;

pub struct RepositoryLayer;

impl Layer for RepositoryLayer {
    fn name(&self) -> &'static str {
        "repository"
    }

    fn render(&self, ctx: &Context) -> Vec<(String, String)> {
        ctx.targets()
            .map(|e| {
                (
                    ctx.path("repository", &e.type_name, "Repository"),
                    render_repository(ctx, e),
                )
            })
            .collect()
    }
}

/// Derived query finders: one per owned many-to-one, one per join key.
fn finders(ctx: &Context, entity: &Entity, imports: &mut Imports) -> Vec<String> {
    let ty = &entity.type_name;
    let mut out = Vec::new();

    if entity.table.is_join_table() {
        for key in entity.key_fields() {
            import_type(ctx, &key.java_type, imports);
            out.push(format!(
                "    List<{}> findBy{}({} {});\n",
                ty,
                capitalize(&key.name),
                key.java_type,
                key.name
            ));
        }
        return out;
    }

    for field in &entity.fields {
        let FieldKind::ManyToOne { target, .. } = &field.kind else {
            continue;
        };
        let Some(target_id) = ctx.id_field(target) else {
            continue;
        };
        let param = format!("{}{}", field.name, capitalize(&target_id.name));
        import_type(ctx, &target_id.java_type, imports);
        out.push(format!(
            "    List<{}> findBy{}({} {});\n",
            ty,
            capitalize(&param),
            target_id.java_type,
            param
        ));
    }
    out
}

fn render_repository(ctx: &Context, entity: &Entity) -> String {
    let ty = &entity.type_name;
    let mut imports = Imports::new();
    imports.add(ctx.import("entity", ty));
    imports.add("org.springframework.data.jpa.repository.JpaRepository");
    imports.add("org.springframework.stereotype.Repository");

    let id_type = if entity.table.is_join_table() {
        format!("{}.Key", ty)
    } else {
        let id_type = ctx
            .id_field(&entity.table.name)
            .map(|f| f.java_type.clone())
            .unwrap_or_else(|| "Long".to_string());
        import_type(ctx, &id_type, &mut imports);
        id_type
    };

    let finders = finders(ctx, entity, &mut imports);
    if !finders.is_empty() {
        imports.add("java.util.List");
    }

    let mut out = String::new();
    out.push_str("@Repository\n");
    out.push_str(&format!(
        "public interface {}Repository extends JpaRepository<{}, {}> {{\n",
        ty, ty, id_type
    ));
    for finder in &finders {
        out.push('\n');
        out.push_str(finder);
    }
    out.push_str("}\n");

    compilation_unit(&ctx.cfg.package("repository"), &imports, &out)
}

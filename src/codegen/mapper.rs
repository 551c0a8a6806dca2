use super::context::{Context, Entity};
use super::dto::dto_fields;
use super::java::{compilation_unit, Imports};
use super::Layer;
use crate::naming::capitalize;

pub struct MapperLayer;

impl Layer for MapperLayer {
    fn name(&self) -> &'static str {
        "mapper"
    }

    fn render(&self, ctx: &Context) -> Vec<(String, String)> {
        ctx.addressable()
            .map(|e| (ctx.path("mapper", &e.type_name, "Mapper"), render_mapper(ctx, e)))
            .collect()
    }
}

fn render_mapper(ctx: &Context, entity: &Entity) -> String {
    let ty = &entity.type_name;
    let dto = format!("{}DTO", ty);
    let fields = dto_fields(ctx, entity);

    let mut imports = Imports::new();
    imports.add(ctx.import("dto", &dto));
    imports.add(ctx.import("entity", ty));
    imports.add("org.springframework.stereotype.Component");

    let mut out = String::new();
    out.push_str("@Component\n");
    out.push_str(&format!("public class {}Mapper {{\n", ty));

    out.push_str(&format!("\n    public {} toDto({} entity) {{\n", dto, ty));
    out.push_str("        if (entity == null) {\n            return null;\n        }\n");
    out.push_str(&format!("        {} dto = new {}();\n", dto, dto));
    for field in &fields {
        let setter = capitalize(&field.name);
        match &field.reference {
            None => out.push_str(&format!(
                "        dto.set{}(entity.get{}());\n",
                setter,
                capitalize(&field.name)
            )),
            Some(r) => {
                let getter = capitalize(&r.field);
                out.push_str(&format!("        if (entity.get{}() != null) {{\n", getter));
                out.push_str(&format!(
                    "            dto.set{}(entity.get{}().get{}());\n",
                    setter,
                    getter,
                    capitalize(&r.target_id)
                ));
                out.push_str("        }\n");
            }
        }
    }
    out.push_str("        return dto;\n    }\n");

    out.push_str(&format!("\n    public {} toEntity({} dto) {{\n", ty, dto));
    out.push_str("        if (dto == null) {\n            return null;\n        }\n");
    out.push_str(&format!("        {} entity = new {}();\n", ty, ty));
    for field in &fields {
        let getter = capitalize(&field.name);
        match &field.reference {
            None => out.push_str(&format!(
                "        entity.set{}(dto.get{}());\n",
                getter, getter
            )),
            Some(r) if r.instantiable => {
                imports.add(ctx.import("entity", &r.target_type));
                out.push_str(&format!("        if (dto.get{}() != null) {{\n", getter));
                out.push_str(&format!(
                    "            {} {} = new {}();\n",
                    r.target_type, r.field, r.target_type
                ));
                out.push_str(&format!(
                    "            {}.set{}(dto.get{}());\n",
                    r.field,
                    capitalize(&r.target_id),
                    getter
                ));
                out.push_str(&format!(
                    "            entity.set{}({});\n",
                    capitalize(&r.field),
                    r.field
                ));
                out.push_str("        }\n");
            }
            // abstract target, set by the service through getReferenceById
            Some(_) => {}
        }
    }
    out.push_str("        return entity;\n    }\n");
    out.push_str("}\n");

    compilation_unit(&ctx.cfg.package("mapper"), &imports, &out)
}

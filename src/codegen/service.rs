use super::context::{Context, Entity, FieldKind};
use super::dto::{dto_fields, DtoField};
use super::java::{compilation_unit, import_type, method_type, Imports};
use super::Layer;
use crate::naming::{capitalize, field_name};
use tracing::debug;

pub struct ServiceLayer;

impl Layer for ServiceLayer {
    fn name(&self) -> &'static str {
        "service"
    }

    fn render(&self, ctx: &Context) -> Vec<(String, String)> {
        ctx.addressable()
            .map(|e| (ctx.path("service", &e.type_name, "Service"), render_service(ctx, e)))
            .collect()
    }
}

/// Names owned by the CRUD surface; declared methods cannot reuse them.
const CRUD: &[&str] = &["findAll", "findById", "create", "update", "delete"];

fn push_declared_methods(ctx: &Context, entity: &Entity, out: &mut String, imports: &mut Imports) {
    for method in &entity.table.methods {
        if CRUD.contains(&method.name.as_str()) {
            debug!(
                table = %entity.table.name,
                method = %method.name,
                "declared method shadows a CRUD operation"
            );
            continue;
        }
        let ret = match &method.return_type {
            Some(token) => method_type(ctx, token, imports),
            None => "void".to_string(),
        };
        let params: Vec<String> = method
            .params
            .iter()
            .map(|p| format!("{} {}", method_type(ctx, &p.type_token, imports), p.name))
            .collect();
        out.push_str(&format!(
            "\n    public {} {}({}) {{\n",
            ret,
            method.name,
            params.join(", ")
        ));
        out.push_str(&format!(
            "        throw new UnsupportedOperationException(\"{}.{} is not implemented\");\n    }}\n",
            entity.type_name, method.name
        ));
    }
}

/// References the mapper cannot stub, resolved through the target's repository.
fn push_reference_lookups(out: &mut String, references: &[DtoField]) {
    for field in references {
        let Some(r) = &field.reference else {
            continue;
        };
        let getter = format!("dto.get{}()", capitalize(&field.name));
        out.push_str(&format!("        if ({} != null) {{\n", getter));
        out.push_str(&format!(
            "            entity.set{}({}Repository.getReferenceById({}));\n",
            capitalize(&r.field),
            field_name(&r.target_type),
            getter
        ));
        out.push_str("        }\n");
    }
}

fn render_service(ctx: &Context, entity: &Entity) -> String {
    let ty = &entity.type_name;
    let dto = format!("{}DTO", ty);
    let repo = format!("{}Repository", field_name(ty));
    let mapper = format!("{}Mapper", field_name(ty));

    let (id_name, id_type, generated) = match ctx.id_field(&entity.table.name) {
        Some(f) => (
            f.name.clone(),
            f.java_type.clone(),
            matches!(f.kind, FieldKind::Id { generated: true, .. }),
        ),
        None => ("id".to_string(), "Long".to_string(), true),
    };
    let set_id = format!("set{}", capitalize(&id_name));

    let lookups: Vec<DtoField> = dto_fields(ctx, entity)
        .into_iter()
        .filter(|f| f.reference.as_ref().is_some_and(|r| !r.instantiable))
        .collect();
    let mut repos = vec![(format!("{}Repository", ty), repo.clone())];
    for r in lookups.iter().filter_map(|f| f.reference.as_ref()) {
        let target = format!("{}Repository", r.target_type);
        if !repos.iter().any(|(t, _)| *t == target) {
            repos.push((target, format!("{}Repository", field_name(&r.target_type))));
        }
    }

    let mut imports = Imports::new();
    imports.add(ctx.import("dto", &dto));
    imports.add(ctx.import("entity", ty));
    imports.add(ctx.import("mapper", &format!("{}Mapper", ty)));
    for (repo_type, _) in &repos {
        imports.add(ctx.import("repository", repo_type));
    }
    imports.add("org.springframework.http.HttpStatus");
    imports.add("org.springframework.stereotype.Service");
    imports.add("org.springframework.transaction.annotation.Transactional");
    imports.add("org.springframework.web.server.ResponseStatusException");
    imports.add("java.util.List");
    import_type(ctx, &id_type, &mut imports);

    let not_found = format!(
        "new ResponseStatusException(HttpStatus.NOT_FOUND, \"{} not found: \" + id)",
        ty
    );

    let mut out = String::new();
    out.push_str("@Service\n@Transactional\n");
    out.push_str(&format!("public class {}Service {{\n\n", ty));
    for (repo_type, repo_field) in &repos {
        out.push_str(&format!("    private final {} {};\n", repo_type, repo_field));
    }
    out.push_str(&format!("    private final {}Mapper {};\n", ty, mapper));

    let mut params: Vec<String> = repos.iter().map(|(t, f)| format!("{} {}", t, f)).collect();
    params.push(format!("{}Mapper {}", ty, mapper));
    out.push_str(&format!(
        "\n    public {}Service({}) {{\n",
        ty,
        params.join(", ")
    ));
    for (_, repo_field) in &repos {
        out.push_str(&format!("        this.{} = {};\n", repo_field, repo_field));
    }
    out.push_str(&format!("        this.{} = {};\n    }}\n", mapper, mapper));

    // findAll
    out.push_str("\n    @Transactional(readOnly = true)\n");
    out.push_str(&format!("    public List<{}> findAll() {{\n", dto));
    out.push_str(&format!(
        "        return {}.findAll().stream().map({}::toDto).toList();\n    }}\n",
        repo, mapper
    ));

    // findById
    out.push_str("\n    @Transactional(readOnly = true)\n");
    out.push_str(&format!("    public {} findById({} id) {{\n", dto, id_type));
    out.push_str(&format!("        return {}.findById(id)\n", repo));
    out.push_str(&format!("                .map({}::toDto)\n", mapper));
    out.push_str(&format!("                .orElseThrow(() -> {});\n    }}\n", not_found));

    // create
    out.push_str(&format!("\n    public {} create({} dto) {{\n", dto, dto));
    out.push_str(&format!("        {} entity = {}.toEntity(dto);\n", ty, mapper));
    push_reference_lookups(&mut out, &lookups);
    if generated {
        out.push_str(&format!("        entity.{}(null);\n", set_id));
    }
    out.push_str(&format!(
        "        return {}.toDto({}.save(entity));\n    }}\n",
        mapper, repo
    ));

    // update
    out.push_str(&format!(
        "\n    public {} update({} id, {} dto) {{\n",
        dto, id_type, dto
    ));
    out.push_str(&format!("        if (!{}.existsById(id)) {{\n", repo));
    out.push_str(&format!("            throw {};\n        }}\n", not_found));
    out.push_str(&format!("        {} entity = {}.toEntity(dto);\n", ty, mapper));
    push_reference_lookups(&mut out, &lookups);
    out.push_str(&format!("        entity.{}(id);\n", set_id));
    out.push_str(&format!(
        "        return {}.toDto({}.save(entity));\n    }}\n",
        mapper, repo
    ));

    // delete
    out.push_str(&format!("\n    public void delete({} id) {{\n", id_type));
    out.push_str(&format!("        if (!{}.existsById(id)) {{\n", repo));
    out.push_str(&format!("            throw {};\n        }}\n", not_found));
    out.push_str(&format!("        {}.deleteById(id);\n    }}\n", repo));

    push_declared_methods(ctx, entity, &mut out, &mut imports);
    out.push_str("}\n");

    compilation_unit(&ctx.cfg.package("service"), &imports, &out)
}

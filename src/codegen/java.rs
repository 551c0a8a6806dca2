//! Java source text helpers shared by the layer emitters.

use super::context::Context;
use crate::attribute::split_params;
use crate::naming;
use crate::typemap;
use std::collections::BTreeSet;

/// Sorted import set of one compilation unit.
#[derive(Debug, Default)]
pub struct Imports(BTreeSet<String>);

impl Imports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, import: impl Into<String>) {
        self.0.insert(import.into());
    }

    /// Framework and project imports first, `java.*` after a blank line.
    fn render(&self) -> String {
        let (java, other): (Vec<&String>, Vec<&String>) =
            self.0.iter().partition(|i| i.starts_with("java."));

        let mut out = String::new();
        for group in [other, java] {
            if group.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            for import in group {
                out.push_str(&format!("import {};\n", import));
            }
        }
        out
    }
}

pub fn compilation_unit(package: &str, imports: &Imports, body: &str) -> String {
    let mut out = format!("package {};\n\n", package);
    let rendered = imports.render();
    if !rendered.is_empty() {
        out.push_str(&rendered);
        out.push('\n');
    }
    out.push_str(body);
    out
}

/// Import needed by a field or parameter of `java_type`, if any.
pub fn import_type(ctx: &Context, java_type: &str, imports: &mut Imports) {
    if let Some(import) = typemap::java_import(java_type) {
        imports.add(import);
    } else if ctx.is_enum(java_type) {
        imports.add(ctx.import("enums", java_type));
    }
}

pub fn push_accessors(out: &mut String, name: &str, java_type: &str) {
    let cap = naming::capitalize(name);
    out.push_str(&format!(
        "\n    public {} get{}() {{\n        return {};\n    }}\n",
        java_type, cap, name
    ));
    out.push_str(&format!(
        "\n    public void set{}({} {}) {{\n        this.{} = {};\n    }}\n",
        cap, java_type, name, name, name
    ));
}

const COLLECTIONS: &[&str] = &["List", "Set", "Map", "Optional", "Collection"];

/// Java type for a logical type token in a method signature.
///
/// Mapped primitives, enums and entities resolve to their Java names; any
/// other token is passed through unchanged.
pub fn method_type(ctx: &Context, token: &str, imports: &mut Imports) -> String {
    let token = token.trim();

    if let Some((outer, rest)) = token.split_once('<') {
        let outer = outer.trim();
        let inner = rest.strip_suffix('>').unwrap_or(rest);
        let args: Vec<String> = split_params(inner)
            .into_iter()
            .map(|arg| method_type(ctx, arg, imports))
            .collect();
        if COLLECTIONS.contains(&outer) {
            imports.add(format!("java.util.{}", outer));
        }
        return format!("{}<{}>", outer, args.join(", "));
    }

    if token == "void" {
        return token.to_string();
    }
    if ctx.is_enum(token) {
        imports.add(ctx.import("enums", token));
        return token.to_string();
    }
    if let Some(mapping) = typemap::map(token) {
        import_type(ctx, &mapping.java_type, imports);
        return mapping.java_type;
    }
    if let Some(entity) = ctx.entity(&naming::table_name(token)) {
        if !entity.table.is_join_table() {
            imports.add(ctx.import("entity", &entity.type_name));
            return entity.type_name.clone();
        }
    }
    token.to_string()
}

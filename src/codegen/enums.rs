use super::context::Context;
use super::java::{compilation_unit, Imports};
use super::Layer;
use crate::ir::EnumType;

pub struct EnumLayer;

impl Layer for EnumLayer {
    fn name(&self) -> &'static str {
        "enums"
    }

    fn render(&self, ctx: &Context) -> Vec<(String, String)> {
        ctx.enums()
            .iter()
            .map(|e| (ctx.path("enums", &e.name, ""), render_enum(ctx, e)))
            .collect()
    }
}

fn render_enum(ctx: &Context, enum_type: &EnumType) -> String {
    let mut out = format!("public enum {} {{\n", enum_type.name);
    let constants: Vec<String> = enum_type
        .constants
        .iter()
        .map(|c| format!("    {}", c))
        .collect();
    if !constants.is_empty() {
        out.push_str(&constants.join(",\n"));
        out.push('\n');
    }
    out.push_str("}\n");
    compilation_unit(&ctx.cfg.package("enums"), &Imports::new(), &out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::PhysicalModel;
    use crate::naming::NamingConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_enum_file() {
        let mut m = PhysicalModel::default();
        m.enums.insert(
            "Estado".into(),
            EnumType {
                name: "Estado".into(),
                constants: vec!["ACTIVO".into(), "INACTIVO".into()],
            },
        );
        let cfg = NamingConfig::default();
        let ctx = Context::new(&m, &cfg);

        let files = EnumLayer.render(&ctx);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, "src/main/java/com/example/demo/enums/Estado.java");
        assert_eq!(
            files[0].1,
            "package com.example.demo.enums;\n\npublic enum Estado {\n    ACTIVO,\n    INACTIVO\n}\n"
        );
    }
}

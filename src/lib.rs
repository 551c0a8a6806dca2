pub mod ast;
pub mod attribute;
pub mod builder;
pub mod codegen;
pub mod diff;
pub mod error;
pub mod ir;
pub mod lexer;
pub mod naming;
pub mod parser;
pub mod resolver;
pub mod sql;
pub mod typemap;

use wasm_bindgen::prelude::*;

pub use ast::LogicalModel;
pub use builder::build;
pub use codegen::{generate, generate_project, scaffold, CodeBundle};
pub use diff::{diff, merge, regenerate, regenerate_ddl};
pub use error::{ConfigError, GenerateError, ModelError, ValidationErrors};
pub use ir::PhysicalModel;
pub use naming::NamingConfig;
pub use sql::Dialect;

use parser::{ParseError, Parser};

/// Read a logical model in the diagram editor's JSON shape.
pub fn model_from_json(json: &str) -> Result<LogicalModel, serde_json::Error> {
    serde_json::from_str(json)
}

/// Read a logical model written in the textual class-diagram notation.
pub fn model_from_dsl(source: &str) -> Result<LogicalModel, ParseError> {
    Parser::new(source)?.parse()
}

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Derive the SQL schema of a JSON logical model
#[wasm_bindgen(js_name = "modelToSql")]
pub fn model_to_sql(json: &str, dialect: Option<String>) -> Result<String, String> {
    let dialect = match dialect.as_deref() {
        Some(name) => Dialect::from_str(name).ok_or_else(|| format!("Unknown dialect: {}", name))?,
        None => Dialect::default(),
    };
    let model = model_from_json(json).map_err(|e| e.to_string())?;
    let physical = build(&model).map_err(|e| e.to_string())?;
    Ok(sql::emit_with_dialect(&physical, dialect))
}

/// Generate backend sources for a JSON logical model, as a path -> source Map
#[wasm_bindgen(js_name = "modelToCode")]
pub fn model_to_code(
    json: &str,
    base_package: Option<String>,
    project_name: Option<String>,
) -> Result<js_sys::Map, String> {
    let cfg = NamingConfig::from_options(base_package.as_deref(), project_name.as_deref())
        .map_err(|e| e.to_string())?;
    let model = model_from_json(json).map_err(|e| e.to_string())?;
    let physical = build(&model).map_err(|e| e.to_string())?;
    let bundle = generate(&physical, &cfg).map_err(|e| e.to_string())?;

    let files = js_sys::Map::new();
    for (path, source) in bundle {
        files.set(&JsValue::from_str(&path), &JsValue::from_str(&source));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::LinkKind;
    use pretty_assertions::assert_eq;

    const SHOP_JSON: &str = r#"{
        "elements": [
            {"id": "e1", "className": "Usuario", "elementType": "class",
             "attributes": ["id: Long", "nombre: String"], "methods": [],
             "position": {"x": 0, "y": 0}},
            {"id": "e2", "className": "Producto", "elementType": "class",
             "attributes": ["id: Long", "nombre: String", "precio: Double"], "methods": [],
             "position": {"x": 200, "y": 0}}
        ],
        "relationships": [
            {"id": "r1", "sourceId": "e1", "targetId": "e2", "relationship": "association",
             "sourceCardinality": "1", "targetCardinality": "*"}
        ]
    }"#;

    const SHOP_DSL: &str = r#"
        class Usuario {
            id: Long
            nombre: String
        }
        class Producto {
            id: Long
            nombre: String
            precio: Double
        }
        rel {
            Usuario 1 -- * Producto
        }
    "#;

    fn shop() -> PhysicalModel {
        build(&model_from_json(SHOP_JSON).unwrap()).unwrap()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let physical = shop();

        let tables: Vec<&str> = physical.tables.keys().map(String::as_str).collect();
        assert_eq!(tables, vec!["usuario", "producto"]);

        assert_eq!(physical.relationships.len(), 1);
        let link = &physical.relationships[0];
        assert_eq!(link.kind, LinkKind::ForeignKey);
        assert_eq!(link.owning_table, "producto");
        assert_eq!(link.column.as_deref(), Some("usuario_id"));
        let fk = physical.tables["producto"].column("usuario_id").unwrap();
        assert_eq!(fk.references.as_ref().unwrap().table, "usuario");

        let ddl = sql::emit(&physical);
        assert_eq!(ddl.matches("CREATE TABLE").count(), 2);
        let usuario = ddl.find("CREATE TABLE usuario").unwrap();
        let producto = ddl.find("CREATE TABLE producto").unwrap();
        assert!(usuario < producto);

        let bundle = generate(&physical, &NamingConfig::default()).unwrap();
        assert_eq!(bundle.len(), 12);
    }

    #[test]
    fn test_dsl_matches_json() {
        let from_dsl = build(&model_from_dsl(SHOP_DSL).unwrap()).unwrap();
        let from_json = shop();
        assert_eq!(sql::emit(&from_dsl), sql::emit(&from_json));

        let cfg = NamingConfig::default();
        assert_eq!(
            generate(&from_dsl, &cfg).unwrap(),
            generate(&from_json, &cfg).unwrap()
        );
    }

    #[test]
    fn test_ddl_is_idempotent() {
        let physical = shop();
        assert_eq!(sql::emit(&physical), sql::emit(&physical));
        assert_eq!(sql::emit(&shop()), sql::emit(&physical));
    }

    #[test]
    fn test_concurrent_generation_is_deterministic() {
        use std::sync::Arc;
        use std::thread;

        let physical = Arc::new(shop());
        let mut handles = vec![];
        for _ in 0..2 {
            let physical = Arc::clone(&physical);
            handles.push(thread::spawn(move || {
                generate(&physical, &NamingConfig::default()).unwrap()
            }));
        }
        let bundles: Vec<CodeBundle> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(bundles[0], bundles[1]);
    }

    #[test]
    fn test_incremental_additivity() {
        let base_src = "class Usuario { nombre: String }";
        let candidate_src = r#"
            class Usuario { nombre: String }
            class Pedido { total: BigDecimal }
            enum Estado { NUEVO, ENVIADO }
            rel { Usuario 1 -- * Pedido }
        "#;
        let base = build(&model_from_dsl(base_src).unwrap()).unwrap();
        let candidate = build(&model_from_dsl(candidate_src).unwrap()).unwrap();
        let cfg = NamingConfig::default();

        let baseline = generate(&base, &cfg).unwrap();
        let added = regenerate(&base, &candidate, &cfg).unwrap();

        assert!(!added.is_empty());
        assert!(added.paths().all(|p| !baseline.contains(p)));
        assert!(added.contains("src/main/java/com/example/demo/enums/Estado.java"));
        assert!(added.contains("src/main/java/com/example/demo/entity/Pedido.java"));

        let ddl = regenerate_ddl(&base, &candidate, Dialect::PostgreSQL);
        assert!(ddl.starts_with("CREATE TABLE pedido ("));
        assert!(!ddl.contains("CREATE TABLE usuario"));
    }

    #[test]
    fn test_error_aggregation() {
        let json = r#"{
            "elements": [
                {"id": "e1", "className": "Usuario", "attributes": ["foto: Blob"]}
            ],
            "relationships": [
                {"id": "r1", "sourceId": "e1", "targetId": "ghost",
                 "sourceCardinality": "1", "targetCardinality": "*"}
            ]
        }"#;
        let errors = build(&model_from_json(json).unwrap()).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            errors.iter().next(),
            Some(ModelError::UnknownType { token, .. }) if token == "Blob"
        ));
        assert!(matches!(
            errors.iter().nth(1),
            Some(ModelError::DanglingReference { element_id, .. }) if element_id == "ghost"
        ));
    }

    #[test]
    fn test_model_to_sql() {
        let sql = model_to_sql(SHOP_JSON, Some("mysql".into())).unwrap();
        assert!(sql.contains("AUTO_INCREMENT"));
        assert!(model_to_sql(SHOP_JSON, Some("oracle".into())).is_err());
        assert!(model_to_sql("{not json", None).is_err());
    }
}

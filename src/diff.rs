//! Incremental generation for tables introduced since a baseline model.
//!
//! Only additions are tracked: a table whose name already exists in the
//! baseline is never regenerated, even if its columns changed.

use crate::codegen::{self, CodeBundle};
use crate::error::GenerateError;
use crate::ir::{LinkKind, PhysicalModel, Table};
use crate::naming::NamingConfig;
use crate::sql::{self, Dialect};
use tracing::info;

/// Tables of `candidate` whose name is absent from `base`, in candidate order.
pub fn diff(base: &PhysicalModel, candidate: &PhysicalModel) -> Vec<Table> {
    candidate
        .tables
        .values()
        .filter(|t| !base.tables.contains_key(&t.name))
        .cloned()
        .collect()
}

/// Baseline plus the new tables and the relationships anchored in them.
pub fn merge(base: &PhysicalModel, new_tables: &[Table], candidate: &PhysicalModel) -> PhysicalModel {
    let mut merged = base.clone();
    for table in new_tables {
        merged.tables.insert(table.name.clone(), table.clone());
    }

    let is_new = |name: &str| new_tables.iter().any(|t| t.name == name);
    for link in &candidate.relationships {
        let anchored = match link.kind {
            LinkKind::ForeignKey => is_new(&link.owning_table),
            LinkKind::JoinTable => link.join_table_name.as_deref().is_some_and(is_new),
        };
        if anchored {
            merged.relationships.push(link.clone());
        }
    }

    for (name, enum_type) in &candidate.enums {
        if !merged.enums.contains_key(name) {
            merged.enums.insert(name.clone(), enum_type.clone());
        }
    }
    merged
}

fn added_enums<'a>(base: &PhysicalModel, candidate: &'a PhysicalModel) -> Vec<&'a str> {
    candidate
        .enums
        .keys()
        .filter(|name| !base.enums.contains_key(*name))
        .map(String::as_str)
        .collect()
}

/// Sources for the tables and enums `candidate` adds to `base`.
pub fn regenerate(
    base: &PhysicalModel,
    candidate: &PhysicalModel,
    cfg: &NamingConfig,
) -> Result<CodeBundle, GenerateError> {
    let new_tables = diff(base, candidate);
    let merged = merge(base, &new_tables, candidate);
    let names: Vec<&str> = new_tables.iter().map(|t| t.name.as_str()).collect();
    let enums = added_enums(base, candidate);

    let bundle = codegen::generate_scoped(&merged, cfg, &names, &enums)?;
    info!(
        tables = names.len(),
        enums = enums.len(),
        files = bundle.len(),
        "incremental generation"
    );
    Ok(bundle)
}

/// `CREATE TABLE` statements for the tables `candidate` adds to `base`.
pub fn regenerate_ddl(base: &PhysicalModel, candidate: &PhysicalModel, dialect: Dialect) -> String {
    let new_tables = diff(base, candidate);
    let merged = merge(base, &new_tables, candidate);
    let names: Vec<&str> = new_tables.iter().map(|t| t.name.as_str()).collect();
    sql::emit_tables(&merged, &names, dialect)
}

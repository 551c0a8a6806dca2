//! Physical model to a layered Spring Boot source tree.

mod context;
mod controller;
mod dto;
mod entity;
mod enums;
mod java;
mod mapper;
mod repository;
mod scaffold;
mod service;

pub use context::Context;
pub use scaffold::scaffold;

use crate::error::GenerateError;
use crate::ir::{self, PhysicalModel};
use crate::naming::NamingConfig;
use crate::sql::Dialect;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Generated files keyed by relative path, in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CodeBundle(BTreeMap<String, String>);

impl CodeBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, source: impl Into<String>) {
        self.0.insert(path.into(), source.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(p, s)| (p.as_str(), s.as_str()))
    }

    /// Add every file of `other`, replacing equal paths.
    pub fn extend(&mut self, other: CodeBundle) {
        self.0.extend(other.0);
    }
}

impl IntoIterator for CodeBundle {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// One output layer of the generated backend.
pub(crate) trait Layer: Sync {
    fn name(&self) -> &'static str;
    fn render(&self, ctx: &Context) -> Vec<(String, String)>;
}

const LAYERS: &[&dyn Layer] = &[
    &entity::EntityLayer,
    &enums::EnumLayer,
    &dto::DtoLayer,
    &mapper::MapperLayer,
    &repository::RepositoryLayer,
    &service::ServiceLayer,
    &controller::ControllerLayer,
];

#[cfg(not(target_arch = "wasm32"))]
fn render_layers(ctx: &Context) -> Vec<Vec<(String, String)>> {
    std::thread::scope(|s| {
        let handles: Vec<_> = LAYERS
            .iter()
            .map(|layer| s.spawn(move || layer.render(ctx)))
            .collect();
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(files) => files,
                Err(payload) => std::panic::resume_unwind(payload),
            })
            .collect()
    })
}

#[cfg(target_arch = "wasm32")]
fn render_layers(ctx: &Context) -> Vec<Vec<(String, String)>> {
    LAYERS.iter().map(|layer| layer.render(ctx)).collect()
}

fn render(ctx: &Context) -> CodeBundle {
    let mut bundle = CodeBundle::new();
    for (layer, files) in LAYERS.iter().zip(render_layers(ctx)) {
        debug!(layer = layer.name(), files = files.len(), "rendered layer");
        bundle.0.extend(files);
    }
    bundle
}

/// Render entity, DTO, mapper, repository, service and controller sources,
/// plus one file per enum.
pub fn generate(model: &PhysicalModel, cfg: &NamingConfig) -> Result<CodeBundle, GenerateError> {
    ir::validate(model).map_err(GenerateError::InvalidModel)?;
    let bundle = render(&Context::new(model, cfg));
    info!(
        files = bundle.len(),
        package = cfg.base_package(),
        "generated code bundle"
    );
    Ok(bundle)
}

/// Like [`generate`], restricted to the named tables and enums of `model`.
pub(crate) fn generate_scoped(
    model: &PhysicalModel,
    cfg: &NamingConfig,
    tables: &[&str],
    enums: &[&str],
) -> Result<CodeBundle, GenerateError> {
    ir::validate(model).map_err(GenerateError::InvalidModel)?;
    Ok(render(&Context::scoped(model, cfg, tables, enums)))
}

/// Generated layers together with the project scaffold.
pub fn generate_project(
    model: &PhysicalModel,
    cfg: &NamingConfig,
    dialect: Dialect,
) -> Result<CodeBundle, GenerateError> {
    let mut bundle = generate(model, cfg)?;
    bundle.extend(scaffold(model, cfg, dialect));
    Ok(bundle)
}

//! Shared view of the physical model for all layer emitters.
//!
//! Field lists are computed once per run: owned foreign keys first, then the
//! inverse sides they imply on the referenced tables, then many-to-many
//! fields through join tables.

use crate::ir::{Column, EnumType, LinkKind, PhysicalModel, Table};
use crate::naming::{self, NamingConfig};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Id {
        column: String,
        generated: bool,
    },
    Scalar {
        column: String,
        nullable: bool,
        unique: bool,
        enumerated: bool,
    },
    ManyToOne {
        column: String,
        target: String,
        nullable: bool,
    },
    /// Owning side of a one-to-one (the table holding the unique key)
    OneToOne {
        column: String,
        target: String,
        nullable: bool,
    },
    OneToOneInverse {
        target: String,
        mapped_by: String,
    },
    OneToMany {
        target: String,
        mapped_by: String,
    },
    ManyToMany {
        target: String,
        join_table: String,
        join_column: String,
        inverse_column: String,
    },
    ManyToManyInverse {
        target: String,
        mapped_by: String,
    },
    /// Read-only association over one key column of a join table
    JoinReference {
        column: String,
        target: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Java field name
    pub name: String,
    /// Declared Java type (`Long`, `Usuario`, `List<Producto>`)
    pub java_type: String,
    pub kind: FieldKind,
}

impl Field {
    pub fn is_id(&self) -> bool {
        matches!(self.kind, FieldKind::Id { .. })
    }

    /// Foreign key held by this entity's own table.
    pub fn owned_reference(&self) -> Option<(&str, &str)> {
        match &self.kind {
            FieldKind::ManyToOne { column, target, .. }
            | FieldKind::OneToOne { column, target, .. } => Some((column.as_str(), target.as_str())),
            _ => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(
            self.kind,
            FieldKind::OneToMany { .. }
                | FieldKind::ManyToMany { .. }
                | FieldKind::ManyToManyInverse { .. }
        )
    }
}

#[derive(Debug)]
pub struct Entity<'a> {
    pub table: &'a Table,
    pub type_name: String,
    pub parent_type: Option<String>,
    pub fields: Vec<Field>,
}

impl Entity<'_> {
    /// Entities that get DTO, mapper, service and controller files.
    pub fn is_addressable(&self) -> bool {
        !self.table.is_join_table() && !self.table.is_abstract
    }

    pub fn own_id(&self) -> Option<&Field> {
        if self.table.is_join_table() {
            return None;
        }
        self.fields.iter().find(|f| f.is_id())
    }

    pub fn key_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_id())
    }
}

pub struct Context<'a> {
    pub model: &'a PhysicalModel,
    pub cfg: &'a NamingConfig,
    entities: IndexMap<&'a str, Entity<'a>>,
    targets: Vec<&'a str>,
    enums: Vec<&'a EnumType>,
}

impl<'a> Context<'a> {
    /// Context rendering every table and enum of `model`.
    pub fn new(model: &'a PhysicalModel, cfg: &'a NamingConfig) -> Self {
        let tables: Vec<&str> = model.tables.keys().map(String::as_str).collect();
        let enums: Vec<&str> = model.enums.keys().map(String::as_str).collect();
        Self::scoped(model, cfg, &tables, &enums)
    }

    /// Context rendering only the named tables and enums.
    pub fn scoped(
        model: &'a PhysicalModel,
        cfg: &'a NamingConfig,
        tables: &[&str],
        enums: &[&str],
    ) -> Self {
        let targets: Vec<&'a str> = model
            .tables
            .keys()
            .map(String::as_str)
            .filter(|t| tables.contains(t))
            .collect();
        Self {
            model,
            cfg,
            entities: build_entities(model, &targets),
            targets,
            enums: model
                .enums
                .values()
                .filter(|e| enums.contains(&e.name.as_str()))
                .collect(),
        }
    }

    pub fn entity(&self, table: &str) -> Option<&Entity<'a>> {
        self.entities.get(table)
    }

    /// Entities to render, in table order.
    pub fn targets(&self) -> impl Iterator<Item = &Entity<'a>> {
        self.targets.iter().filter_map(|t| self.entities.get(t))
    }

    pub fn addressable(&self) -> impl Iterator<Item = &Entity<'a>> {
        self.targets().filter(|e| e.is_addressable())
    }

    pub fn enums(&self) -> &[&'a EnumType] {
        &self.enums
    }

    pub fn is_enum(&self, java_type: &str) -> bool {
        self.model.enums.contains_key(java_type)
    }

    /// The id field an entity exposes: the root ancestor's key.
    pub fn id_field(&self, table: &str) -> Option<&Field> {
        let root = self
            .model
            .ancestors(table)
            .into_iter()
            .last()
            .map(|t| t.name.as_str())
            .unwrap_or(table);
        self.entities.get(root)?.own_id()
    }

    /// Inheritance chain of `table`, root first.
    pub fn chain(&self, table: &str) -> Vec<&Entity<'a>> {
        let mut chain: Vec<&Entity> = self
            .model
            .ancestors(table)
            .iter()
            .rev()
            .filter_map(|t| self.entities.get(t.name.as_str()))
            .collect();
        chain.extend(self.entities.get(table));
        chain
    }

    /// `src/main/java/<pkg>/<layer>/<Type><suffix>.java`
    pub fn path(&self, layer: &str, type_name: &str, suffix: &str) -> String {
        format!(
            "{}/{}{}.java",
            self.cfg.source_dir(layer),
            type_name,
            suffix
        )
    }

    pub fn import(&self, layer: &str, type_name: &str) -> String {
        format!("{}.{}", self.cfg.package(layer), type_name)
    }
}

/// First free candidate, else the last one with a numeric suffix.
pub(super) fn claim(candidates: &[String], taken: &mut HashSet<String>) -> String {
    let name = match candidates.iter().find(|c| !taken.contains(*c)) {
        Some(free) => free.clone(),
        None => {
            let last = candidates.last().map(String::as_str).unwrap_or("field");
            let mut n = 2;
            loop {
                let candidate = format!("{}{}", last, n);
                if !taken.contains(&candidate) {
                    break candidate;
                }
                n += 1;
            }
        }
    };
    taken.insert(name.clone());
    name
}

/// `usuario_id` -> `usuario`, `usuario_id_2` -> `usuario_2`.
fn relation_stem(column: &str, ref_column: &str) -> String {
    let suffix = format!("_{}", ref_column);
    if let Some(stem) = column.strip_suffix(&suffix) {
        if !stem.is_empty() {
            return stem.to_string();
        }
    }
    if let Some((head, n)) = column.rsplit_once('_') {
        if n.chars().all(|c| c.is_ascii_digit()) {
            if let Some(stem) = head.strip_suffix(&suffix) {
                if !stem.is_empty() {
                    return format!("{}_{}", stem, n);
                }
            }
        }
    }
    format!("{}_ref", column)
}

fn column_field(
    model: &PhysicalModel,
    table: &Table,
    col: &Column,
    names: &mut HashSet<String>,
) -> Vec<Field> {
    let name = |base: String, names: &mut HashSet<String>| claim(&[naming::field_name(&base)], names);

    match (&col.references, col.primary_key) {
        (Some(r), true) if table.is_join_table() => vec![
            Field {
                name: name(col.name.clone(), names),
                java_type: col.java_type.clone(),
                kind: FieldKind::Id {
                    column: col.name.clone(),
                    generated: false,
                },
            },
            Field {
                name: name(relation_stem(&col.name, &r.column), names),
                java_type: naming::type_name(&r.table),
                kind: FieldKind::JoinReference {
                    column: col.name.clone(),
                    target: r.table.clone(),
                },
            },
        ],
        (_, true) => vec![Field {
            name: name(col.name.clone(), names),
            java_type: col.java_type.clone(),
            kind: FieldKind::Id {
                column: col.name.clone(),
                generated: col.generated,
            },
        }],
        (Some(r), false) => {
            let (column, target, nullable) = (col.name.clone(), r.table.clone(), col.nullable);
            vec![Field {
                name: name(relation_stem(&col.name, &r.column), names),
                java_type: naming::type_name(&r.table),
                kind: if col.unique {
                    FieldKind::OneToOne {
                        column,
                        target,
                        nullable,
                    }
                } else {
                    FieldKind::ManyToOne {
                        column,
                        target,
                        nullable,
                    }
                },
            }]
        }
        (None, false) => vec![Field {
            name: name(col.name.clone(), names),
            java_type: col.java_type.clone(),
            kind: FieldKind::Scalar {
                column: col.name.clone(),
                nullable: col.nullable,
                unique: col.unique,
                enumerated: model.enums.contains_key(&col.java_type),
            },
        }],
    }
}

/// `rendered` decides which side of a many-to-many owns the join table: an
/// owner outside it was generated earlier and cannot gain a new field.
fn build_entities<'a>(
    model: &'a PhysicalModel,
    rendered: &[&str],
) -> IndexMap<&'a str, Entity<'a>> {
    let mut entities: IndexMap<&str, Entity> = IndexMap::new();
    let mut taken: HashMap<&str, HashSet<String>> = HashMap::new();
    // (owning table, column) -> field name on the owning entity
    let mut owned: HashMap<(&str, &str), String> = HashMap::new();

    // Ancestors first: a child's field names must not shadow inherited ones.
    let mut order: Vec<&Table> = model.tables.values().collect();
    order.sort_by_key(|t| model.ancestors(&t.name).len());
    let mut columns: HashMap<&str, Vec<Field>> = HashMap::new();
    for table in order {
        let mut names: HashSet<String> = model
            .ancestors(&table.name)
            .iter()
            .filter_map(|a| columns.get(a.name.as_str()))
            .flatten()
            .filter(|f| !f.is_id())
            .map(|f| f.name.clone())
            .collect();
        let mut fields = Vec::new();
        for col in &table.columns {
            for field in column_field(model, table, col, &mut names) {
                if field.owned_reference().is_some() {
                    owned.insert((table.name.as_str(), col.name.as_str()), field.name.clone());
                }
                fields.push(field);
            }
        }
        columns.insert(table.name.as_str(), fields);
        taken.insert(table.name.as_str(), names);
    }

    for table in model.tables.values() {
        entities.insert(
            table.name.as_str(),
            Entity {
                table,
                type_name: naming::type_name(&table.name),
                parent_type: table.parent.as_deref().map(naming::type_name),
                fields: columns.remove(table.name.as_str()).unwrap_or_default(),
            },
        );
    }

    for table in model.tables.values() {
        for col in table.columns.iter().filter(|c| !c.primary_key) {
            let Some(r) = &col.references else {
                continue;
            };
            let Some(mapped_by) = owned.get(&(table.name.as_str(), col.name.as_str())) else {
                continue;
            };
            let (Some(entity), Some(names)) = (
                entities.get_mut(r.table.as_str()),
                taken.get_mut(r.table.as_str()),
            ) else {
                continue;
            };

            let owner = naming::field_name(&table.name);
            let owner_type = naming::type_name(&table.name);
            let by = naming::capitalize(mapped_by);
            let field = if col.unique {
                Field {
                    name: claim(&[owner.clone(), format!("{}By{}", owner, by)], names),
                    java_type: owner_type,
                    kind: FieldKind::OneToOneInverse {
                        target: table.name.clone(),
                        mapped_by: mapped_by.clone(),
                    },
                }
            } else {
                Field {
                    name: claim(
                        &[format!("{}List", owner), format!("{}By{}List", owner, by)],
                        names,
                    ),
                    java_type: format!("List<{}>", owner_type),
                    kind: FieldKind::OneToMany {
                        target: table.name.clone(),
                        mapped_by: mapped_by.clone(),
                    },
                }
            };
            entity.fields.push(field);
        }
    }

    for link in model
        .relationships
        .iter()
        .filter(|l| l.kind == LinkKind::JoinTable)
    {
        let Some(join) = link.join_table_name.as_deref().and_then(|n| model.table(n)) else {
            continue;
        };
        let (mut owner, mut target) = (link.owning_table.as_str(), link.referenced_table.as_str());
        if !rendered.contains(&owner) && rendered.contains(&target) {
            std::mem::swap(&mut owner, &mut target);
        }

        let keys: Vec<&Column> = join.columns.iter().filter(|c| c.primary_key).collect();
        let Some(pos) = keys
            .iter()
            .position(|c| c.references.as_ref().is_some_and(|r| r.table == owner))
        else {
            continue;
        };
        let Some(inverse) = keys
            .iter()
            .enumerate()
            .find(|(i, _)| *i != pos)
            .map(|(_, c)| c.name.clone())
        else {
            continue;
        };

        let mapped_by = {
            let (Some(entity), Some(names)) = (entities.get_mut(owner), taken.get_mut(owner))
            else {
                continue;
            };
            let name = claim(&[format!("{}List", naming::field_name(target))], names);
            entity.fields.push(Field {
                name: name.clone(),
                java_type: format!("List<{}>", naming::type_name(target)),
                kind: FieldKind::ManyToMany {
                    target: target.to_string(),
                    join_table: join.name.clone(),
                    join_column: keys[pos].name.clone(),
                    inverse_column: inverse,
                },
            });
            name
        };

        if let (Some(entity), Some(names)) = (entities.get_mut(target), taken.get_mut(target)) {
            let base = naming::field_name(owner);
            let by = naming::capitalize(&mapped_by);
            entity.fields.push(Field {
                name: claim(
                    &[format!("{}List", base), format!("{}By{}List", base, by)],
                    names,
                ),
                java_type: format!("List<{}>", naming::type_name(owner)),
                kind: FieldKind::ManyToManyInverse {
                    target: owner.to_string(),
                    mapped_by,
                },
            });
        }
    }

    entities
}

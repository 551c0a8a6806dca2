use crate::attribute::MethodSignature;
use crate::error::{ModelError, ValidationErrors};
use indexmap::IndexMap;
use serde::Serialize;

/// The relational schema derived from a logical model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhysicalModel {
    pub tables: IndexMap<String, Table>,
    pub relationships: Vec<Link>,
    pub enums: IndexMap<String, EnumType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    /// `None` for synthesized join tables
    pub source_element_id: Option<String>,
    /// Parent table under the joined inheritance strategy
    pub parent: Option<String>,
    pub is_abstract: bool,
    pub methods: Vec<MethodSignature>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub sql_type: String,
    pub java_type: String,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    /// Identity column filled by the database
    pub generated: bool,
    pub references: Option<ColumnRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkKind {
    ForeignKey,
    JoinTable,
}

/// A resolved relationship between two tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub id: String,
    pub kind: LinkKind,
    pub owning_table: String,
    pub referenced_table: String,
    pub join_table_name: Option<String>,
    /// Foreign-key column on the owning table
    pub column: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumType {
    pub name: String,
    pub constants: Vec<String>,
}

impl Column {
    pub fn is_foreign_key(&self) -> bool {
        self.references.is_some()
    }
}

impl Table {
    pub fn is_join_table(&self) -> bool {
        self.source_element_id.is_none()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// The single key column of a non-join table.
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary_key)
    }
}

impl PhysicalModel {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Walk the parent chain of `table`, nearest ancestor first.
    pub fn ancestors(&self, table: &str) -> Vec<&Table> {
        let mut chain = Vec::new();
        let mut current = self.tables.get(table).and_then(|t| t.parent.as_deref());
        while let Some(name) = current {
            let Some(parent) = self.tables.get(name) else {
                break;
            };
            if chain.iter().any(|t: &&Table| t.name == parent.name) || parent.name == table {
                break;
            }
            chain.push(parent);
            current = parent.parent.as_deref();
        }
        chain
    }

    pub fn has_children(&self, table: &str) -> bool {
        self.tables
            .values()
            .any(|t| t.parent.as_deref() == Some(table))
    }
}

/// Check the structural invariants of a (possibly hand-built) physical model.
pub fn validate(model: &PhysicalModel) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    let mut invalid = |detail: String| errors.push(ModelError::InvalidPhysicalModel { detail });

    for (key, table) in &model.tables {
        if key != &table.name {
            invalid(format!("table `{}` is stored under key `{}`", table.name, key));
        }

        let mut seen: Vec<&str> = Vec::new();
        for col in &table.columns {
            if seen.contains(&col.name.as_str()) {
                invalid(format!("table `{}` repeats column `{}`", table.name, col.name));
            }
            seen.push(&col.name);

            if let Some(r) = &col.references {
                match model.tables.get(&r.table) {
                    None => invalid(format!(
                        "column `{}.{}` references missing table `{}`",
                        table.name, col.name, r.table
                    )),
                    Some(target) if !target.has_column(&r.column) => invalid(format!(
                        "column `{}.{}` references missing column `{}.{}`",
                        table.name, col.name, r.table, r.column
                    )),
                    _ => {}
                }
            }
        }

        let keys: Vec<&Column> = table.columns.iter().filter(|c| c.primary_key).collect();
        if table.is_join_table() {
            if keys.len() != 2 || keys.iter().any(|c| !c.is_foreign_key()) {
                invalid(format!(
                    "join table `{}` must have a composite key of two foreign keys",
                    table.name
                ));
            }
        } else if keys.len() != 1 {
            invalid(format!(
                "table `{}` has {} primary key columns, expected 1",
                table.name,
                keys.len()
            ));
        }

        if let Some(parent) = &table.parent {
            if !model.tables.contains_key(parent) {
                invalid(format!(
                    "table `{}` inherits from missing table `{}`",
                    table.name, parent
                ));
            }
        }
    }

    for link in &model.relationships {
        for name in [&link.owning_table, &link.referenced_table] {
            if !model.tables.contains_key(name) {
                invalid(format!(
                    "relationship `{}` references missing table `{}`",
                    link.id, name
                ));
            }
        }

        match link.kind {
            LinkKind::ForeignKey => {
                let owner = model.tables.get(&link.owning_table);
                match (&link.column, owner) {
                    (None, _) => invalid(format!(
                        "foreign-key relationship `{}` has no column",
                        link.id
                    )),
                    (Some(col), Some(owner)) => match owner.column(col) {
                        Some(c) if c.references.as_ref().map(|r| &r.table)
                            == Some(&link.referenced_table) => {}
                        _ => invalid(format!(
                            "relationship `{}` expects column `{}.{}` referencing `{}`",
                            link.id, link.owning_table, col, link.referenced_table
                        )),
                    },
                    (Some(_), None) => {}
                }
            }
            LinkKind::JoinTable => match &link.join_table_name {
                None => invalid(format!(
                    "join-table relationship `{}` has no join table name",
                    link.id
                )),
                Some(name) => match model.tables.get(name) {
                    Some(t) if t.is_join_table() => {}
                    Some(_) => invalid(format!(
                        "relationship `{}` uses `{}` which is not a join table",
                        link.id, name
                    )),
                    None => invalid(format!(
                        "relationship `{}` references missing join table `{}`",
                        link.id, name
                    )),
                },
            },
        }
    }

    match ValidationErrors::from_vec(errors) {
        Some(errors) => Err(errors),
        None => Ok(()),
    }
}

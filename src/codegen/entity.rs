//! JPA entity classes.

use super::context::{Context, Entity, Field, FieldKind};
use super::java::{compilation_unit, import_type, push_accessors, Imports};
use super::Layer;
use crate::sql::Dialect;

pub struct EntityLayer;

impl Layer for EntityLayer {
    fn name(&self) -> &'static str {
        "entity"
    }

    fn render(&self, ctx: &Context) -> Vec<(String, String)> {
        ctx.targets()
            .map(|e| (ctx.path("entity", &e.type_name, ""), render_entity(ctx, e)))
            .collect()
    }
}

/// Reserved table names need quoting inside `@Table`.
fn table_literal(name: &str) -> String {
    if Dialect::is_reserved(name) {
        format!("\\\"{}\\\"", name)
    } else {
        name.to_string()
    }
}

fn column_attrs(column: &str, nullable: bool, unique: bool) -> String {
    let mut attrs = format!("name = \"{}\"", column);
    if !nullable {
        attrs.push_str(", nullable = false");
    }
    if unique {
        attrs.push_str(", unique = true");
    }
    attrs
}

fn push_annotations(out: &mut String, field: &Field) {
    match &field.kind {
        FieldKind::Id { column, generated } => {
            out.push_str("    @Id\n");
            if *generated {
                out.push_str("    @GeneratedValue(strategy = GenerationType.IDENTITY)\n");
            }
            out.push_str(&format!("    @Column(name = \"{}\")\n", column));
        }
        FieldKind::Scalar {
            column,
            nullable,
            unique,
            enumerated,
        } => {
            if *enumerated {
                out.push_str("    @Enumerated(EnumType.STRING)\n");
            }
            out.push_str(&format!(
                "    @Column({})\n",
                column_attrs(column, *nullable, *unique)
            ));
        }
        FieldKind::ManyToOne {
            column, nullable, ..
        } => {
            let optional = if *nullable { "" } else { ", optional = false" };
            out.push_str(&format!("    @ManyToOne(fetch = FetchType.LAZY{})\n", optional));
            out.push_str(&format!(
                "    @JoinColumn({})\n",
                column_attrs(column, *nullable, false)
            ));
        }
        FieldKind::OneToOne {
            column, nullable, ..
        } => {
            let optional = if *nullable { "" } else { ", optional = false" };
            out.push_str(&format!("    @OneToOne(fetch = FetchType.LAZY{})\n", optional));
            out.push_str(&format!(
                "    @JoinColumn({})\n",
                column_attrs(column, *nullable, true)
            ));
        }
        FieldKind::OneToOneInverse { mapped_by, .. } => {
            out.push_str(&format!("    @OneToOne(mappedBy = \"{}\")\n", mapped_by));
        }
        FieldKind::OneToMany { mapped_by, .. } => {
            out.push_str(&format!("    @OneToMany(mappedBy = \"{}\")\n", mapped_by));
        }
        FieldKind::ManyToMany {
            join_table,
            join_column,
            inverse_column,
            ..
        } => {
            out.push_str("    @ManyToMany\n");
            out.push_str("    @JoinTable(\n");
            out.push_str(&format!("        name = \"{}\",\n", table_literal(join_table)));
            out.push_str(&format!(
                "        joinColumns = @JoinColumn(name = \"{}\"),\n",
                join_column
            ));
            out.push_str(&format!(
                "        inverseJoinColumns = @JoinColumn(name = \"{}\")\n",
                inverse_column
            ));
            out.push_str("    )\n");
        }
        FieldKind::ManyToManyInverse { mapped_by, .. } => {
            out.push_str(&format!("    @ManyToMany(mappedBy = \"{}\")\n", mapped_by));
        }
        FieldKind::JoinReference { column, .. } => {
            out.push_str("    @ManyToOne(fetch = FetchType.LAZY)\n");
            out.push_str(&format!(
                "    @JoinColumn(name = \"{}\", insertable = false, updatable = false)\n",
                column
            ));
        }
    }
}

/// Composite key class for `@IdClass`.
fn push_key_class(out: &mut String, keys: &[&Field], imports: &mut Imports) {
    imports.add("java.io.Serializable");
    imports.add("java.util.Objects");

    out.push_str("\n    public static class Key implements Serializable {\n\n");
    for key in keys {
        out.push_str(&format!("        private {} {};\n", key.java_type, key.name));
    }

    out.push_str("\n        public Key() {\n        }\n");

    let params: Vec<String> = keys
        .iter()
        .map(|k| format!("{} {}", k.java_type, k.name))
        .collect();
    out.push_str(&format!("\n        public Key({}) {{\n", params.join(", ")));
    for key in keys {
        out.push_str(&format!("            this.{} = {};\n", key.name, key.name));
    }
    out.push_str("        }\n");

    let equals: Vec<String> = keys
        .iter()
        .map(|k| format!("Objects.equals({}, other.{})", k.name, k.name))
        .collect();
    out.push_str("\n        @Override\n        public boolean equals(Object o) {\n");
    out.push_str("            if (this == o) {\n                return true;\n            }\n");
    out.push_str("            if (!(o instanceof Key other)) {\n                return false;\n            }\n");
    out.push_str(&format!("            return {};\n        }}\n", equals.join(" && ")));

    let names: Vec<&str> = keys.iter().map(|k| k.name.as_str()).collect();
    out.push_str("\n        @Override\n        public int hashCode() {\n");
    out.push_str(&format!(
        "            return Objects.hash({});\n        }}\n",
        names.join(", ")
    ));
    out.push_str("    }\n");
}

pub(super) fn render_entity(ctx: &Context, entity: &Entity) -> String {
    let table = entity.table;
    let mut imports = Imports::new();
    imports.add("jakarta.persistence.*");

    // Children inherit the key field from the root entity
    let fields: Vec<&Field> = entity
        .fields
        .iter()
        .filter(|f| !(f.is_id() && entity.parent_type.is_some()))
        .collect();

    let mut out = String::new();
    out.push_str("@Entity\n");
    out.push_str(&format!("@Table(name = \"{}\")\n", table_literal(&table.name)));
    if table.is_join_table() {
        out.push_str(&format!("@IdClass({}.Key.class)\n", entity.type_name));
    }
    if ctx.model.has_children(&table.name) {
        out.push_str("@Inheritance(strategy = InheritanceType.JOINED)\n");
    }
    if let (Some(_), Some(key)) = (&entity.parent_type, table.primary_key()) {
        let referenced = key
            .references
            .as_ref()
            .map(|r| r.column.as_str())
            .unwrap_or(&key.name);
        out.push_str(&format!(
            "@PrimaryKeyJoinColumn(name = \"{}\", referencedColumnName = \"{}\")\n",
            key.name, referenced
        ));
    }

    let modifier = if table.is_abstract { "abstract " } else { "" };
    match &entity.parent_type {
        Some(parent) => out.push_str(&format!(
            "public {}class {} extends {} {{\n",
            modifier, entity.type_name, parent
        )),
        None => out.push_str(&format!("public {}class {} {{\n", modifier, entity.type_name)),
    }

    for field in &fields {
        out.push('\n');
        push_annotations(&mut out, field);
        let init = if field.is_collection() {
            imports.add("java.util.ArrayList");
            " = new ArrayList<>()"
        } else {
            ""
        };
        if field.java_type.starts_with("List<") {
            imports.add("java.util.List");
        }
        import_type(ctx, &field.java_type, &mut imports);
        out.push_str(&format!(
            "    private {} {}{};\n",
            field.java_type, field.name, init
        ));
    }

    out.push_str(&format!("\n    public {}() {{\n    }}\n", entity.type_name));

    for field in &fields {
        push_accessors(&mut out, &field.name, &field.java_type);
    }

    if table.is_join_table() {
        let keys: Vec<&Field> = entity.key_fields().collect();
        push_key_class(&mut out, &keys, &mut imports);
    }
    out.push_str("}\n");

    compilation_unit(&ctx.cfg.package("entity"), &imports, &out)
}

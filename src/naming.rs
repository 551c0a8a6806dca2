//! Central naming conventions.
//!
//! Tables use the singular snake_case form of the class name (`OrderLine`
//! becomes `order_line`); Java types are the PascalCase form of the table
//! name and fields the camelCase form of the column name.

use crate::error::ConfigError;
use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};

pub const DEFAULT_BASE_PACKAGE: &str = "com.example.demo";
pub const DEFAULT_PROJECT_NAME: &str = "demo";

pub fn table_name(class_name: &str) -> String {
    class_name.trim().to_snake_case()
}

pub fn column_name(attribute: &str) -> String {
    attribute.trim().to_snake_case()
}

pub fn type_name(table: &str) -> String {
    table.to_upper_camel_case()
}

pub fn field_name(column: &str) -> String {
    column.to_lower_camel_case()
}

pub fn resource_path(table: &str) -> String {
    format!("/api/{}", table.to_kebab_case())
}

/// Upper-case the first letter, for getters and setters.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Suffix `base` with `_2`, `_3`, ... until `taken` no longer matches.
pub fn disambiguate(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", base, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface",
    "long", "native", "new", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "try", "void", "volatile", "while", "true", "false", "null",
];

fn is_java_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$') && !JAVA_KEYWORDS.contains(&s)
}

/// Base package and project name shared by every generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConfig {
    base_package: String,
    project_name: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            base_package: DEFAULT_BASE_PACKAGE.to_string(),
            project_name: DEFAULT_PROJECT_NAME.to_string(),
        }
    }
}

impl NamingConfig {
    pub fn new(base_package: &str, project_name: &str) -> Result<Self, ConfigError> {
        let base_package = base_package.trim();
        if base_package.is_empty() || !base_package.split('.').all(is_java_identifier) {
            return Err(ConfigError::InvalidPackage(base_package.to_string()));
        }

        let project_name = project_name.trim();
        if project_name.is_empty()
            || !project_name
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::InvalidProjectName(project_name.to_string()));
        }

        Ok(Self {
            base_package: base_package.to_string(),
            project_name: project_name.to_string(),
        })
    }

    /// Build from optional overrides, falling back to the defaults.
    pub fn from_options(
        base_package: Option<&str>,
        project_name: Option<&str>,
    ) -> Result<Self, ConfigError> {
        Self::new(
            base_package.unwrap_or(DEFAULT_BASE_PACKAGE),
            project_name.unwrap_or(DEFAULT_PROJECT_NAME),
        )
    }

    pub fn base_package(&self) -> &str {
        &self.base_package
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn package(&self, layer: &str) -> String {
        format!("{}.{}", self.base_package, layer)
    }

    /// Directory of the base package (no trailing slash).
    pub fn source_root(&self) -> String {
        format!("src/main/java/{}", self.base_package.replace('.', "/"))
    }

    /// Directory holding Java sources for `layer` (no trailing slash).
    pub fn source_dir(&self, layer: &str) -> String {
        format!("{}/{}", self.source_root(), layer)
    }

    pub fn application_class(&self) -> String {
        format!("{}Application", self.project_name.to_upper_camel_case())
    }
}

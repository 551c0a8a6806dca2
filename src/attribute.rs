//! Micro-parser for attribute declarations and method signatures.
//!
//! Attributes arrive as free-form `name: Type` strings, optionally prefixed
//! with a UML visibility marker and suffixed with `?` to force nullability.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub type_token: String,
    /// Declared with a trailing `?`
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: String,
    pub type_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<String>,
}

/// Reason a declaration could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclError {
    #[error("missing ':' between name and type")]
    MissingColon,
    #[error("empty name")]
    EmptyName,
    #[error("empty type")]
    EmptyType,
    #[error("invalid name `{0}`")]
    InvalidName(String),
    #[error("invalid type `{0}`")]
    InvalidType(String),
    #[error("missing parameter list")]
    MissingParens,
}

fn strip_visibility(decl: &str) -> &str {
    let trimmed = decl.trim();
    match trimmed.chars().next() {
        Some('+' | '-' | '#' | '~') => trimmed[1..].trim_start(),
        _ => trimmed,
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Type tokens may carry generics and array brackets (`List<Long>`, `byte[]`).
fn is_type_token(s: &str) -> bool {
    let mut depth = 0i32;
    for c in s.chars() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            '[' | ']' | '.' | ',' | ' ' => {}
            c if c.is_alphanumeric() || c == '_' || c == '$' => {}
            _ => return false,
        }
    }
    depth == 0 && s.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
}

fn split_name_type(decl: &str) -> Result<(String, String), DeclError> {
    let (name, typ) = decl.split_once(':').ok_or(DeclError::MissingColon)?;
    let name = name.trim();
    let typ = typ.trim();

    if name.is_empty() {
        return Err(DeclError::EmptyName);
    }
    if !is_identifier(name) {
        return Err(DeclError::InvalidName(name.to_string()));
    }
    if typ.is_empty() {
        return Err(DeclError::EmptyType);
    }
    Ok((name.to_string(), typ.to_string()))
}

/// Parse a `[visibility] name: Type[?]` declaration.
pub fn parse_attribute(decl: &str) -> Result<Attribute, DeclError> {
    let (name, typ) = split_name_type(strip_visibility(decl))?;

    let (typ, optional) = match typ.strip_suffix('?') {
        Some(rest) => (rest.trim_end().to_string(), true),
        None => (typ, false),
    };

    if typ.is_empty() {
        return Err(DeclError::EmptyType);
    }
    if !is_type_token(&typ) {
        return Err(DeclError::InvalidType(typ));
    }

    Ok(Attribute {
        name,
        type_token: typ,
        optional,
    })
}

/// Parse an enum constant, tolerating a trailing `: Type`.
pub fn parse_enum_constant(decl: &str) -> Result<String, DeclError> {
    let raw = strip_visibility(decl);
    let name = raw.split(':').next().unwrap_or(raw).trim();
    if name.is_empty() {
        return Err(DeclError::EmptyName);
    }
    if !is_identifier(name) {
        return Err(DeclError::InvalidName(name.to_string()));
    }
    Ok(name.to_string())
}

/// Split on commas that are not nested inside generic brackets.
pub(crate) fn split_params(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Parse a `[visibility] name(p: T, ...)[: Return]` signature.
pub fn parse_method(sig: &str) -> Result<MethodSignature, DeclError> {
    let sig = strip_visibility(sig);
    let open = sig.find('(').ok_or(DeclError::MissingParens)?;
    let close = sig.rfind(')').ok_or(DeclError::MissingParens)?;
    if close < open {
        return Err(DeclError::MissingParens);
    }

    let name = sig[..open].trim();
    if name.is_empty() {
        return Err(DeclError::EmptyName);
    }
    if !is_identifier(name) {
        return Err(DeclError::InvalidName(name.to_string()));
    }

    let inner = sig[open + 1..close].trim();
    let mut params = Vec::new();
    if !inner.is_empty() {
        for part in split_params(inner) {
            let (pname, ptype) = split_name_type(part)?;
            if !is_type_token(&ptype) {
                return Err(DeclError::InvalidType(ptype));
            }
            params.push(Param {
                name: pname,
                type_token: ptype,
            });
        }
    }

    let rest = sig[close + 1..].trim();
    let return_type = if rest.is_empty() {
        None
    } else {
        let typ = rest.strip_prefix(':').ok_or(DeclError::MissingColon)?.trim();
        if typ.is_empty() {
            return Err(DeclError::EmptyType);
        }
        if !is_type_token(typ) {
            return Err(DeclError::InvalidType(typ.to_string()));
        }
        Some(typ.to_string())
    };

    Ok(MethodSignature {
        name: name.to_string(),
        params,
        return_type,
    })
}

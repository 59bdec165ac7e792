//! Name casing helpers shared by the parser and the renderer.
//!
//! All casing goes through `heck`, which splits acronym runs the way
//! generated identifiers expect: `getHTTPResponseCode` becomes
//! `get_http_response_code`, not `get_h_t_t_p_response_code`.

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};

/// Keywords that can be used as identifiers with the `r#` prefix.
const RAW_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers and get a trailing underscore instead.
const RESERVED_KEYWORDS: &[&str] = &["crate", "self", "Self", "super"];

pub fn to_snake(name: &str) -> String {
    name.to_snake_case()
}

/// lowerCamelCase.
pub fn to_camel(name: &str) -> String {
    name.to_lower_camel_case()
}

/// UpperCamelCase.
pub fn to_pascal(name: &str) -> String {
    name.to_upper_camel_case()
}

/// Name of the generated client type, e.g. `Cine` -> `CineClient`.
///
/// A name that already ends in `Client` is not suffixed twice.
pub fn to_client_name(name: &str) -> String {
    let pascal = to_pascal(name);
    if pascal.ends_with("Client") {
        pascal
    } else {
        format!("{}Client", pascal)
    }
}

/// Module name of the generated schema file. Defaults to `schema`.
pub fn to_schema_name(name: Option<&str>) -> String {
    match name {
        Some(name) if !name.trim().is_empty() => to_snake(name),
        _ => "schema".to_string(),
    }
}

/// Snake-cased identifier for a struct field or method, escaped when it
/// collides with a keyword.
pub fn to_field_ident(name: &str) -> String {
    escape_keyword(to_snake(name))
}

/// Pascal-cased identifier for a type or enum variant, escaped when it
/// collides with a keyword.
pub fn to_type_ident(name: &str) -> String {
    escape_keyword(to_pascal(name))
}

fn escape_keyword(ident: String) -> String {
    if RESERVED_KEYWORDS.contains(&ident.as_str()) {
        format!("{}_", ident)
    } else if RAW_KEYWORDS.contains(&ident.as_str()) {
        format!("r#{}", ident)
    } else if ident.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        format!("_{}", ident)
    } else {
        ident
    }
}

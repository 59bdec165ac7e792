//! Intermediate model produced by the SDL parser and consumed by the renderer.

use std::collections::BTreeSet;

use crate::naming::{to_field_ident, to_snake, to_type_ident};

/// Map a GraphQL built-in scalar to its Rust primitive, if it is one.
pub fn primitive_for(graphql_name: &str) -> Option<&'static str> {
    match graphql_name {
        "String" => Some("String"),
        "Int" => Some("i32"),
        "Float" => Some("f64"),
        "Boolean" => Some("bool"),
        "ID" => Some("String"),
        _ => None,
    }
}

/// A single field (or argument) definition with its wrappers unwrapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    description: Option<String>,
    graphql_type: String,
    type_name: String,
    required: bool,
    list: bool,
    item_required: bool,
    named_type: bool,
}

impl Field {
    /// Create a field whose base GraphQL type is `graphql_type`.
    ///
    /// Built-in scalars are mapped to Rust primitives; every other name is
    /// kept as-is and flagged as a named (custom) type.
    pub fn new(
        name: impl Into<String>,
        graphql_type: impl Into<String>,
        required: bool,
        list: bool,
        item_required: bool,
    ) -> Self {
        let graphql_type = graphql_type.into();
        let (type_name, named_type) = match primitive_for(&graphql_type) {
            Some(primitive) => (primitive.to_string(), false),
            None => (graphql_type.clone(), true),
        };

        Self {
            name: name.into(),
            description: None,
            graphql_type,
            type_name,
            required,
            list,
            item_required,
            named_type,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The base type name as written in the SDL.
    pub fn graphql_type(&self) -> &str {
        &self.graphql_type
    }

    /// The base type name in the target language.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_list(&self) -> bool {
        self.list
    }

    pub fn is_item_required(&self) -> bool {
        self.item_required
    }

    /// True when the base type is not a built-in scalar.
    pub fn is_named_type(&self) -> bool {
        self.named_type
    }

    pub fn snake_name(&self) -> String {
        to_snake(&self.name)
    }

    /// Rust identifier for this field, keyword-escaped.
    pub fn ident(&self) -> String {
        to_field_ident(&self.name)
    }

    /// Rust type of this field with `Option`/`Vec` wrappers applied.
    pub fn rust_type(&self) -> String {
        let base = if self.named_type {
            to_type_ident(&self.type_name)
        } else {
            self.type_name.clone()
        };
        self.wrap(base)
    }

    /// Apply this field's nullability and list wrappers to an arbitrary base.
    pub fn wrap(&self, base: String) -> String {
        let inner = if self.list {
            let item = if self.item_required {
                base
            } else {
                format!("Option<{}>", base)
            };
            format!("Vec<{}>", item)
        } else {
            base
        };

        if self.required {
            inner
        } else {
            format!("Option<{}>", inner)
        }
    }

    /// The full SDL type, e.g. `[Person!]!`, as used in variable declarations.
    pub fn sdl_type(&self) -> String {
        let mut ty = self.graphql_type.clone();
        if self.list {
            if self.item_required {
                ty.push('!');
            }
            ty = format!("[{}]", ty);
        }
        if self.required {
            ty.push('!');
        }
        ty
    }
}

/// An argument of a root operation. Carries the same type information as a field.
pub type Argument = Field;

/// One GraphQL object or interface type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainModel {
    name: String,
    description: Option<String>,
    fields: Vec<Field>,
}

impl DomainModel {
    pub fn new(name: impl Into<String>, description: Option<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            description,
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn snake_name(&self) -> String {
        to_snake(&self.name)
    }

    /// Names of every non-primitive type referenced by a field.
    pub fn dependencies(&self) -> BTreeSet<&str> {
        self.fields
            .iter()
            .filter(|f| f.is_named_type())
            .map(|f| f.type_name())
            .collect()
    }

    pub(crate) fn extend(&mut self, fields: Vec<Field>) {
        self.fields.extend(fields);
    }
}

/// A GraphQL enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumModel {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
        }
    }
}

/// A field on a root operation type, exposed as a client method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOperation {
    pub kind: OperationKind,
    /// The root field; its type is the operation's return type.
    pub field: Field,
    pub arguments: Vec<Argument>,
}

/// Everything parsed from one schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainModelCollection {
    pub(crate) models: Vec<DomainModel>,
    pub(crate) enums: Vec<EnumModel>,
    pub(crate) scalars: Vec<String>,
    pub(crate) operations: Vec<QueryOperation>,
}

impl DomainModelCollection {
    /// Models in declaration order.
    pub fn models(&self) -> &[DomainModel] {
        &self.models
    }

    pub fn enums(&self) -> &[EnumModel] {
        &self.enums
    }

    /// Custom scalar names declared with `scalar X`.
    pub fn scalars(&self) -> &[String] {
        &self.scalars
    }

    pub fn operations(&self) -> &[QueryOperation] {
        &self.operations
    }

    pub fn get(&self, name: &str) -> Option<&DomainModel> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.iter().any(|e| e.name == name)
    }

    pub fn is_scalar(&self, name: &str) -> bool {
        self.scalars.iter().any(|s| s == name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_maps_builtin_scalars() {
        let f = Field::new("age", "Int", true, false, false);
        assert_eq!(f.type_name(), "i32");
        assert!(!f.is_named_type());

        let f = Field::new("id", "ID", true, false, false);
        assert_eq!(f.type_name(), "String");

        let f = Field::new("director", "Person", false, false, false);
        assert_eq!(f.type_name(), "Person");
        assert!(f.is_named_type());
    }

    #[test]
    fn test_rust_type_wrapping() {
        assert_eq!(Field::new("a", "String", true, false, false).rust_type(), "String");
        assert_eq!(
            Field::new("a", "String", false, false, false).rust_type(),
            "Option<String>"
        );
        assert_eq!(
            Field::new("a", "Person", true, true, true).rust_type(),
            "Vec<Person>"
        );
        assert_eq!(
            Field::new("a", "Person", false, true, false).rust_type(),
            "Option<Vec<Option<Person>>>"
        );
    }

    #[test]
    fn test_sdl_type() {
        assert_eq!(Field::new("a", "Person", true, true, true).sdl_type(), "[Person!]!");
        assert_eq!(Field::new("a", "ID", true, false, false).sdl_type(), "ID!");
        assert_eq!(Field::new("a", "Int", false, true, false).sdl_type(), "[Int]");
    }

    #[test]
    fn test_model_dependencies_skip_primitives() {
        let model = DomainModel::new(
            "Movie",
            None,
            vec![
                Field::new("title", "String", true, false, false),
                Field::new("director", "Person", false, false, false),
                Field::new("cast", "Person", false, true, true),
                Field::new("genre", "Genre", false, false, false),
            ],
        );

        let deps: Vec<_> = model.dependencies().into_iter().collect();
        assert_eq!(deps, vec!["Genre", "Person"]);
        assert_eq!(model.snake_name(), "movie");
    }
}

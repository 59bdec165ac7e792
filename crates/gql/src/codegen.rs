//! Rendering of the ordered models into client and schema modules.
//!
//! # Usage
//!
//! ```ignore
//! use sdkgen_gql::{parse_schema, render, RenderOptions};
//!
//! let collection = parse_schema(&sdl)?;
//! let options = RenderOptions::builder().client_name("Cine").build();
//! let sdk = render(&collection, &options)?;
//! sdk.write_to("src/generated")?;
//! ```
//!
//! Both modules are plain Rust source. The schema module holds one serde
//! struct per model, declared in dependency order; the client module holds a
//! `reqwest`-based client with one async method per root operation.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use bon::Builder;
use minijinja::Environment;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{GenError, GenResult};
use crate::model::{
    DomainModel, DomainModelCollection, EnumModel, Field, OperationKind, QueryOperation,
};
use crate::naming::{
    to_client_name, to_field_ident, to_pascal, to_schema_name, to_snake, to_type_ident,
};

const CLIENT_TEMPLATE: &str = include_str!("../templates/client.rs.jinja");
const SCHEMA_TEMPLATE: &str = include_str!("../templates/schema.rs.jinja");

/// Rust type used for names that are neither models, enums nor scalars.
const OPAQUE_TYPE: &str = "serde_json::Value";

/// Options controlling the generated module names.
#[derive(Debug, Clone, Builder)]
pub struct RenderOptions {
    /// Base name of the client, e.g. `Cine` for `CineClient`.
    #[builder(into)]
    pub client_name: String,
    /// Name of the schema module. Defaults to `schema`.
    #[builder(into)]
    pub schema_name: Option<String>,
    /// Endpoint baked into `Client::default_endpoint()`.
    #[builder(into)]
    pub endpoint: Option<String>,
}

/// The two rendered artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSdk {
    pub client_file: String,
    pub client: String,
    pub schema_file: String,
    pub schema: String,
}

impl GeneratedSdk {
    /// Write both modules into `dir`, creating it if needed.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> GenResult<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(2);
        let files = [
            (&self.client_file, &self.client),
            (&self.schema_file, &self.schema),
        ];
        for (file, contents) in files {
            let path = dir.join(file);
            fs::write(&path, contents)?;
            info!("Wrote {}", path.display());
            written.push(path);
        }

        Ok(written)
    }
}

#[derive(Serialize)]
struct SchemaContext {
    schema_name: String,
    scalars: Vec<String>,
    enums: Vec<EnumContext>,
    models: Vec<ModelContext>,
}

#[derive(Serialize)]
struct EnumContext {
    ident: String,
    doc: Vec<String>,
    variants: Vec<VariantContext>,
}

#[derive(Serialize)]
struct VariantContext {
    ident: String,
    value: String,
    renamed: bool,
}

#[derive(Serialize)]
struct ModelContext {
    ident: String,
    graphql_name: String,
    doc: Vec<String>,
    fields: Vec<FieldContext>,
}

#[derive(Serialize)]
struct FieldContext {
    ident: String,
    name: String,
    rust_type: String,
    doc: Vec<String>,
    renamed: bool,
    optional: bool,
}

#[derive(Serialize)]
struct ClientContext {
    client_name: String,
    schema_module: String,
    endpoint: Option<String>,
    operations: Vec<OperationContext>,
}

#[derive(Serialize)]
struct OperationContext {
    method: String,
    field_name: String,
    const_name: String,
    doc: Vec<String>,
    document: String,
    arguments: Vec<FieldContext>,
    return_type: String,
}

/// Render the client and schema modules for an already parsed collection.
///
/// Fails if the models contain a dependency cycle or a template fails.
pub fn render(
    collection: &DomainModelCollection,
    options: &RenderOptions,
) -> GenResult<GeneratedSdk> {
    let ordered = collection.topological_order()?;

    let client_name = to_client_name(&options.client_name);
    let schema_name = to_schema_name(options.schema_name.as_deref());

    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_template("client.rs", CLIENT_TEMPLATE)?;
    env.add_template("schema.rs", SCHEMA_TEMPLATE)?;

    let schema_ctx = SchemaContext {
        schema_name: schema_name.clone(),
        scalars: collection.scalars().iter().map(|s| to_type_ident(s)).collect(),
        enums: collection.enums().iter().map(enum_context).collect(),
        models: ordered
            .iter()
            .map(|model| model_context(model, collection))
            .collect(),
    };

    let client_ctx = ClientContext {
        client_name: client_name.clone(),
        schema_module: schema_name.clone(),
        endpoint: options.endpoint.clone(),
        operations: operation_contexts(collection)?,
    };

    debug!(
        models = schema_ctx.models.len(),
        operations = client_ctx.operations.len(),
        "Rendering templates"
    );

    let schema = tidy(&env.get_template("schema.rs")?.render(&schema_ctx)?);
    let client = tidy(&env.get_template("client.rs")?.render(&client_ctx)?);

    Ok(GeneratedSdk {
        client_file: format!("{}.rs", to_snake(&client_name)),
        client,
        schema_file: format!("{}.rs", schema_name),
        schema,
    })
}

fn enum_context(e: &EnumModel) -> EnumContext {
    EnumContext {
        ident: to_type_ident(&e.name),
        doc: doc_lines(e.description.as_deref()),
        variants: e
            .values
            .iter()
            .map(|value| {
                let ident = to_type_ident(value);
                VariantContext {
                    renamed: ident != *value,
                    ident,
                    value: value.clone(),
                }
            })
            .collect(),
    }
}

fn model_context(model: &DomainModel, collection: &DomainModelCollection) -> ModelContext {
    ModelContext {
        ident: to_type_ident(model.name()),
        graphql_name: model.name().to_string(),
        doc: doc_lines(model.description()),
        fields: model
            .fields()
            .iter()
            .map(|f| field_context(f, collection))
            .collect(),
    }
}

fn field_context(field: &Field, collection: &DomainModelCollection) -> FieldContext {
    let ident = field.ident();
    FieldContext {
        renamed: ident.trim_start_matches("r#") != field.name(),
        ident,
        name: field.name().to_string(),
        rust_type: resolve_type(field, collection),
        doc: doc_lines(field.description()),
        optional: !field.is_required(),
    }
}

/// Description text split into doc-comment lines.
fn doc_lines(description: Option<&str>) -> Vec<String> {
    description
        .map(|d| d.trim().lines().map(|l| l.trim_end().to_string()).collect())
        .unwrap_or_default()
}

/// Rust type for a field, falling back to JSON for types the schema module
/// does not declare (unions, input objects).
fn resolve_type(field: &Field, collection: &DomainModelCollection) -> String {
    let name = field.type_name();
    if !field.is_named_type()
        || collection.get(name).is_some()
        || collection.is_enum(name)
        || collection.is_scalar(name)
    {
        field.rust_type()
    } else {
        field.wrap(OPAQUE_TYPE.to_string())
    }
}

/// Contexts for every root operation, with unique method names.
///
/// Query methods keep the plain field name. A mutation whose name is already
/// taken by a query gets a `_mutation` suffix.
fn operation_contexts(collection: &DomainModelCollection) -> GenResult<Vec<OperationContext>> {
    let operations = collection.operations();
    let mut methods = vec![String::new(); operations.len()];
    let mut taken = HashSet::new();

    // Queries claim their names first, wherever they are declared.
    for kind in [OperationKind::Query, OperationKind::Mutation] {
        for (i, op) in operations.iter().enumerate().filter(|(_, op)| op.kind == kind) {
            let name = op.field.name();
            let mut method = to_field_ident(name);
            if kind == OperationKind::Mutation && taken.contains(&method) {
                method = to_field_ident(&format!("{}_mutation", to_snake(name)));
            }
            if !taken.insert(method.clone()) {
                return Err(GenError::MethodCollision(method));
            }
            methods[i] = method;
        }
    }

    Ok(operations
        .iter()
        .zip(methods)
        .map(|(op, method)| operation_context(op, method, collection))
        .collect())
}

fn operation_context(
    op: &QueryOperation,
    method: String,
    collection: &DomainModelCollection,
) -> OperationContext {
    let field = &op.field;

    OperationContext {
        const_name: format!(
            "{}_{}",
            to_snake(field.name()).to_uppercase(),
            op.kind.keyword().to_uppercase()
        ),
        method,
        field_name: field.name().to_string(),
        doc: doc_lines(field.description()),
        document: operation_document(op, collection),
        arguments: op
            .arguments
            .iter()
            .map(|a| field_context(a, collection))
            .collect(),
        return_type: resolve_type(field, collection),
    }
}

/// The GraphQL document sent for one operation, followed by the fragments
/// it spreads.
///
/// `query People($limit: Int) { people(limit: $limit) { ...PersonFields } } fragment PersonFields on Person { name }`
fn operation_document(op: &QueryOperation, collection: &DomainModelCollection) -> String {
    let field = &op.field;
    let mut doc = format!("{} {}", op.kind.keyword(), to_pascal(field.name()));

    if !op.arguments.is_empty() {
        let vars: Vec<String> = op
            .arguments
            .iter()
            .map(|a| format!("${}: {}", a.name(), a.sdl_type()))
            .collect();
        doc.push_str(&format!("({})", vars.join(", ")));
    }

    doc.push_str(" { ");
    doc.push_str(field.name());
    if !op.arguments.is_empty() {
        let args: Vec<String> = op
            .arguments
            .iter()
            .map(|a| format!("{}: ${}", a.name(), a.name()))
            .collect();
        doc.push_str(&format!("({})", args.join(", ")));
    }
    if let Some(selection) = selection_for(field, collection) {
        doc.push(' ');
        doc.push_str(&selection);
    }
    doc.push_str(" }");

    for model in fragment_models(field, collection) {
        doc.push(' ');
        doc.push_str(&fragment_definition(model, collection));
    }
    doc
}

fn fragment_name(model: &DomainModel) -> String {
    format!("{}Fields", model.name())
}

/// Selection set for a field of a composite type, `None` for leaf types.
///
/// Models are selected through their named fragment, so a model shared by
/// several parents is spelled out once per document.
fn selection_for(field: &Field, collection: &DomainModelCollection) -> Option<String> {
    if !field.is_named_type() {
        return None;
    }
    let name = field.type_name();
    if collection.is_enum(name) || collection.is_scalar(name) {
        return None;
    }

    match collection.get(name) {
        Some(model) => Some(format!("{{ ...{} }}", fragment_name(model))),
        None => Some("{ __typename }".to_string()),
    }
}

/// `fragment MovieFields on Movie { title director { ...PersonFields } }`
fn fragment_definition(model: &DomainModel, collection: &DomainModelCollection) -> String {
    let parts: Vec<String> = model
        .fields()
        .iter()
        .map(|f| match selection_for(f, collection) {
            Some(nested) => format!("{} {}", f.name(), nested),
            None => f.name().to_string(),
        })
        .collect();

    format!(
        "fragment {} on {} {{ {} }}",
        fragment_name(model),
        model.name(),
        parts.join(" ")
    )
}

/// Models reachable from `field`, each once, in first-visit order.
///
/// Terminates because rendering only proceeds once the model graph is known
/// to be acyclic.
fn fragment_models<'c>(
    field: &Field,
    collection: &'c DomainModelCollection,
) -> Vec<&'c DomainModel> {
    let mut seen = HashSet::new();
    let mut models = Vec::new();
    let mut stack: Vec<&'c DomainModel> = collection.get(field.type_name()).into_iter().collect();

    while let Some(model) = stack.pop() {
        if !seen.insert(model.name()) {
            continue;
        }
        models.push(model);
        let nested: Vec<_> = model
            .fields()
            .iter()
            .filter(|f| f.is_named_type())
            .filter_map(|f| collection.get(f.type_name()))
            .collect();
        stack.extend(nested.into_iter().rev());
    }

    models
}

/// Normalize rendered text: strip trailing whitespace from every line,
/// collapse blank-line runs, and end with exactly one newline.
pub fn tidy(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_blank = false;

    for line in text.lines() {
        let line = line.trim_end();
        let blank = line.is_empty();
        if blank && (previous_blank || out.is_empty()) {
            continue;
        }
        out.push_str(line);
        out.push('\n');
        previous_blank = blank;
    }

    while out.ends_with("\n\n") {
        out.pop();
    }
    if out.is_empty() {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_schema;
    use pretty_assertions::assert_eq;

    const CINEMA: &str = r#"
        "A film."
        type Movie {
            title: String!
            releaseYear: Int
            type: String
            director: Person
            genre: Genre!
        }

        type Person {
            name: String!
        }

        enum Genre { DRAMA SCI_FI }

        type Query {
            movies(limit: Int): [Movie!]!
            person(name: String!): Person
        }
    "#;

    fn options() -> RenderOptions {
        RenderOptions::builder().client_name("Cine").build()
    }

    #[test]
    fn test_tidy() {
        assert_eq!(tidy("a  \n   \n\n\nb\t\n\n"), "a\n\nb\n");
        assert_eq!(tidy("\n\nx"), "x\n");
        assert_eq!(tidy(""), "\n");
    }

    #[test]
    fn test_file_names() {
        let sdk = render(&parse_schema(CINEMA).unwrap(), &options()).unwrap();
        assert_eq!(sdk.client_file, "cine_client.rs");
        assert_eq!(sdk.schema_file, "schema.rs");

        let named = RenderOptions::builder()
            .client_name("Cine")
            .schema_name("CineSchema")
            .build();
        let sdk = render(&parse_schema(CINEMA).unwrap(), &named).unwrap();
        assert_eq!(sdk.schema_file, "cine_schema.rs");
        assert!(sdk.client.contains("use super::cine_schema::*;"));
    }

    #[test]
    fn test_schema_declares_dependencies_first() {
        let sdk = render(&parse_schema(CINEMA).unwrap(), &options()).unwrap();

        let person = sdk.schema.find("pub struct Person").unwrap();
        let movie = sdk.schema.find("pub struct Movie").unwrap();
        assert!(person < movie, "Person must precede Movie:\n{}", sdk.schema);
    }

    #[test]
    fn test_schema_fields() {
        let sdk = render(&parse_schema(CINEMA).unwrap(), &options()).unwrap();

        assert!(sdk.schema.contains("pub title: String,"));
        assert!(sdk.schema.contains("#[serde(rename = \"releaseYear\", default)]"));
        assert!(sdk.schema.contains("pub release_year: Option<i32>,"));
        assert!(sdk.schema.contains("pub r#type: Option<String>,"));
        assert!(sdk.schema.contains("pub director: Option<Person>,"));
        assert!(sdk.schema.contains("pub genre: Genre,"));
        assert!(sdk.schema.contains("/// A film."));
    }

    #[test]
    fn test_schema_enums() {
        let sdk = render(&parse_schema(CINEMA).unwrap(), &options()).unwrap();

        assert!(sdk.schema.contains("pub enum Genre"));
        assert!(sdk.schema.contains("#[serde(rename = \"SCI_FI\")]"));
        assert!(sdk.schema.contains("SciFi,"));
    }

    #[test]
    fn test_client_operations() {
        let sdk = render(&parse_schema(CINEMA).unwrap(), &options()).unwrap();

        assert!(sdk.client.contains("pub struct CineClient"));
        assert!(sdk.client.contains(
            "pub async fn movies(&self, limit: Option<i32>) -> Result<Vec<Movie>, ClientError>"
        ));
        assert!(sdk.client.contains(
            "pub async fn person(&self, name: String) -> Result<Option<Person>, ClientError>"
        ));
    }

    #[test]
    fn test_operation_document_selects_nested_models() {
        let collection = parse_schema(CINEMA).unwrap();
        let movies = &collection.operations()[0];

        assert_eq!(
            operation_document(movies, &collection),
            "query Movies($limit: Int) { movies(limit: $limit) { ...MovieFields } } \
             fragment MovieFields on Movie { title releaseYear type director { ...PersonFields } genre } \
             fragment PersonFields on Person { name }"
        );
    }

    #[test]
    fn test_scalar_operation_has_no_selection() {
        let collection = parse_schema("type Query { count: Int! }").unwrap();

        assert_eq!(
            operation_document(&collection.operations()[0], &collection),
            "query Count { count }"
        );
    }

    #[test]
    fn test_shared_models_keep_documents_linear() {
        // Each level references the previous one twice: inlining would
        // double the selection per level.
        let levels = 30;
        let mut sdl = String::from("type T0 { leaf: Int }\n");
        for i in 1..levels {
            sdl.push_str(&format!("type T{i} {{ a: T{p} b: T{p} }}\n", i = i, p = i - 1));
        }
        sdl.push_str(&format!("type Query {{ top: T{} }}\n", levels - 1));

        let collection = parse_schema(&sdl).unwrap();
        let document = operation_document(&collection.operations()[0], &collection);

        assert!(document.len() < 100 * levels, "document grew to {} bytes", document.len());
        assert_eq!(document.matches("fragment ").count(), levels);
        assert!(document.contains("fragment T5Fields on T5 { a { ...T4Fields } b { ...T4Fields } }"));

        let sdk = render(&collection, &options()).unwrap();
        assert!(sdk.client.len() < 10_000);
    }

    #[test]
    fn test_fragments_only_for_reachable_models() {
        let collection = parse_schema(CINEMA).unwrap();
        let person = &collection.operations()[1];

        let document = operation_document(person, &collection);
        assert!(document.contains("fragment PersonFields on Person"));
        assert!(!document.contains("MovieFields"));
    }

    #[test]
    fn test_mutation_method_suffixed_on_collision() {
        let sdl = r#"
            type Mutation { person(name: String!): Int }
            type Query { person: Int }
        "#;
        let sdk = render(&parse_schema(sdl).unwrap(), &options()).unwrap();

        assert_eq!(sdk.client.matches("pub async fn person(").count(), 1);
        assert!(sdk
            .client
            .contains("pub async fn person(&self) -> Result<Option<i32>, ClientError>"));
        assert!(sdk.client.contains(
            "pub async fn person_mutation(&self, name: String) -> Result<Option<i32>, ClientError>"
        ));
        assert!(sdk.client.contains("const PERSON_QUERY: &str"));
        assert!(sdk.client.contains("const PERSON_MUTATION: &str"));
    }

    #[test]
    fn test_unresolvable_method_collision_fails() {
        let sdl = r#"
            type Query { person: Int personMutation: Int }
            type Mutation { person: Int }
        "#;
        let err = render(&parse_schema(sdl).unwrap(), &options()).unwrap_err();
        assert!(matches!(err, GenError::MethodCollision(ref m) if m == "person_mutation"));
    }

    #[test]
    fn test_output_is_tidy() {
        let sdk = render(&parse_schema(CINEMA).unwrap(), &options()).unwrap();

        for text in [&sdk.client, &sdk.schema] {
            assert!(text.ends_with('\n') && !text.ends_with("\n\n"));
            assert!(text.lines().all(|l| l == l.trim_end()));
        }
    }

    #[test]
    fn test_render_fails_on_cycle() {
        let collection = parse_schema("type A { b: B } type B { a: A }").unwrap();
        assert!(matches!(
            render(&collection, &options()),
            Err(GenError::Cycle { .. })
        ));
    }

    #[test]
    fn test_write_to_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let sdk = render(&parse_schema(CINEMA).unwrap(), &options()).unwrap();

        let written = sdk.write_to(dir.path().join("generated")).unwrap();
        assert_eq!(written.len(), 2);
        for path in written {
            assert!(path.exists());
        }
    }
}

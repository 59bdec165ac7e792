use pretty_assertions::assert_eq;
use sdkgen_gql::naming::{to_client_name, to_schema_name, to_snake};
use sdkgen_gql::{generate, parse_schema, GenError, RenderOptions};

const MOVIES: &str = r#"
    type Person {
        name: String!
    }

    type Movie {
        title: String!
        director: Person
    }
"#;

#[test]
fn test_person_is_ordered_before_movie() {
    let collection = parse_schema(MOVIES).unwrap();
    assert_eq!(collection.len(), 2);

    let order: Vec<_> = collection
        .topological_order()
        .unwrap()
        .into_iter()
        .map(|m| m.name())
        .collect();
    assert_eq!(order, vec!["Person", "Movie"]);
}

#[test]
fn test_naming_examples() {
    assert_eq!(to_snake("getHTTPResponseCode"), "get_http_response_code");
    assert_eq!(to_client_name("Cine"), "CineClient");
    assert_eq!(to_schema_name(None), "schema");
}

#[test]
fn test_generate_end_to_end() {
    let sdl = format!(
        "{}\n{}",
        MOVIES,
        r#"
        type Query {
            "All movies, newest first."
            movies(first: Int): [Movie!]!
        }
        "#
    );
    let options = RenderOptions::builder()
        .client_name("Cine")
        .endpoint("https://cine.example.com/graphql")
        .build();

    let sdk = generate(&sdl, &options).unwrap();

    assert_eq!(sdk.client_file, "cine_client.rs");
    assert_eq!(sdk.schema_file, "schema.rs");

    assert!(sdk.schema.contains("pub struct Person {"));
    assert!(sdk.schema.contains("pub const TYPE_NAME: &'static str = \"Movie\";"));

    assert!(sdk.client.contains("use super::schema::*;"));
    assert!(sdk.client.contains("Self::new(\"https://cine.example.com/graphql\")"));
    assert!(sdk.client.contains("/// All movies, newest first."));
    assert!(sdk.client.contains(
        "const MOVIES_QUERY: &str = r#\"query Movies($first: Int) { movies(first: $first) { ...MovieFields } } \
         fragment MovieFields on Movie { title director { ...PersonFields } } \
         fragment PersonFields on Person { name }\"#;"
    ));
    assert!(sdk.client.contains("let variables = json!({ \"first\": first });"));
}

#[test]
fn test_generation_is_deterministic() {
    let options = RenderOptions::builder().client_name("Cine").build();
    let first = generate(MOVIES, &options).unwrap();
    let second = generate(MOVIES, &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_cycle_aborts_generation() {
    let sdl = r#"
        type Person { favourite: Movie }
        type Movie { director: Person }
    "#;
    let options = RenderOptions::builder().client_name("Cine").build();

    let err = generate(sdl, &options).unwrap_err();
    assert!(matches!(err, GenError::Cycle { .. }));
    assert_eq!(
        err.to_string(),
        "Dependency cycle between models: Person -> Movie"
    );
}

#[test]
fn test_malformed_schema_aborts_generation() {
    let options = RenderOptions::builder().client_name("Cine").build();
    assert!(matches!(
        generate("type {", &options),
        Err(GenError::Parse(_))
    ));
}

#[test]
fn test_shared_submodels_do_not_blow_up_client() {
    let mut sdl = String::from("type Level0 { id: ID! }\n");
    for i in 1..30 {
        sdl.push_str(&format!("type Level{} {{ left: Level{p} right: Level{p} }}\n", i, p = i - 1));
    }
    sdl.push_str("type Query { root: Level29 }\n");
    let options = RenderOptions::builder().client_name("Deep").build();

    let sdk = generate(&sdl, &options).unwrap();

    assert!(sdk.client.len() < 10_000, "client is {} bytes", sdk.client.len());
    assert_eq!(sdk.client.matches("fragment Level").count(), 30);
}

#[test]
fn test_query_and_mutation_with_same_name() {
    let sdl = r#"
        type Query { person: Int }
        type Mutation { person: Int }
    "#;
    let options = RenderOptions::builder().client_name("Cine").build();

    let sdk = generate(sdl, &options).unwrap();
    assert!(sdk.client.contains("pub async fn person(&self)"));
    assert!(sdk.client.contains("pub async fn person_mutation(&self)"));
}

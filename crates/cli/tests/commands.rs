//! Runs the `sdkgen` binary against schemas in a temp directory

use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const SDL: &str = r#"
type Person {
  name: String!
}

type Movie {
  title: String!
  director: Person
}

type Query {
  movies(limit: Int): [Movie!]!
}
"#;

fn sdkgen(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sdkgen"))
        .args(args)
        .current_dir(dir)
        .env("SDKGEN_CONFIG_DIR", dir.join("user-config"))
        .env_remove("SDKGEN_SCHEMA")
        .env_remove("SDKGEN_CLIENT_NAME")
        .env_remove("SDKGEN_OUT_DIR")
        .output()
        .expect("failed to run sdkgen")
}

#[test]
fn order_prints_dependencies_first() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("cine.graphql"), SDL).unwrap();

    let output = sdkgen(
        dir.path(),
        &["order", "cine.graphql", "--format", "compact", "--color", "never"],
    );

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Person\nMovie\n");
}

#[test]
fn order_reports_cycles() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("cycle.graphql"),
        "type Person { favorite: Movie }\ntype Movie { director: Person }\n",
    )
    .unwrap();

    let output = sdkgen(dir.path(), &["order", "cycle.graphql"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Dependency cycle between models"), "{stderr}");
}

#[test]
fn generate_uses_project_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("cine.graphql"), SDL).unwrap();
    fs::write(
        dir.path().join("sdkgen.toml"),
        "schema = \"cine.graphql\"\nout_dir = \"src/generated\"\n",
    )
    .unwrap();

    let output = sdkgen(dir.path(), &["generate", "--color", "never"]);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let out_dir = dir.path().join("src").join("generated");
    let schema = fs::read_to_string(out_dir.join("schema.rs")).unwrap();
    assert!(schema.contains("pub struct Person"));
    assert!(schema.find("pub struct Person") < schema.find("pub struct Movie"));

    let client = fs::read_to_string(out_dir.join("cine_client.rs")).unwrap();
    assert!(client.contains("pub struct CineClient"));
}

#[test]
fn generate_without_schema_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = sdkgen(dir.path(), &["generate"]);
    assert!(!output.status.success());
}

//! Project configuration (`sdkgen.toml`)

use anyhow::{Context, Result};
use sdkgen_gql::RenderOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when `--config` is not given
pub const PROJECT_FILE: &str = "sdkgen.toml";

const DEFAULT_OUT_DIR: &str = "generated";

/// Values read from `sdkgen.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub schema: Option<PathBuf>,
    pub client_name: Option<String>,
    pub schema_name: Option<String>,
    pub out_dir: Option<PathBuf>,
    pub endpoint: Option<String>,
}

impl ProjectConfig {
    /// Load from an explicit path. Relative paths inside the file are
    /// resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read project config: {:?}", path))?;
        let mut config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse project config: {:?}", path))?;

        if let Some(base) = path.parent() {
            config.schema = config.schema.map(|p| base.join(p));
            config.out_dir = config.out_dir.map(|p| base.join(p));
        }
        Ok(config)
    }

    /// Load `explicit` if given, otherwise `sdkgen.toml` in `dir` if present
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = dir.join(PROJECT_FILE);
        if candidate.is_file() {
            tracing::debug!("Using project config {:?}", candidate);
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}

/// Command line values for `generate`; set fields win over the file
#[derive(Debug, Clone, Default)]
pub struct GenerateOverrides {
    pub schema: Option<PathBuf>,
    pub client_name: Option<String>,
    pub schema_name: Option<String>,
    pub out_dir: Option<PathBuf>,
    pub endpoint: Option<String>,
}

/// Fully resolved inputs for one `generate` run
#[derive(Debug, Clone)]
pub struct GenerateSettings {
    pub schema: PathBuf,
    pub out_dir: PathBuf,
    pub options: RenderOptions,
}

impl GenerateSettings {
    pub fn resolve(file: ProjectConfig, cli: GenerateOverrides) -> Result<Self> {
        let schema = cli
            .schema
            .or(file.schema)
            .context("No schema given. Pass a schema path or set `schema` in sdkgen.toml")?;

        let client_name = match cli.client_name.or(file.client_name) {
            Some(name) => name,
            None => schema
                .file_stem()
                .and_then(|s| s.to_str())
                .map(sdkgen_gql::naming::to_pascal)
                .filter(|s| !s.is_empty())
                .with_context(|| format!("Cannot derive a client name from {:?}", schema))?,
        };

        let options = RenderOptions::builder()
            .client_name(client_name)
            .maybe_schema_name(cli.schema_name.or(file.schema_name))
            .maybe_endpoint(cli.endpoint.or(file.endpoint))
            .build();

        Ok(Self {
            schema,
            out_dir: cli
                .out_dir
                .or(file.out_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR)),
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_overrides_file() {
        let file = ProjectConfig {
            schema: Some(PathBuf::from("api/schema.graphql")),
            client_name: Some("Cine".to_string()),
            schema_name: Some("models".to_string()),
            out_dir: Some(PathBuf::from("src/gen")),
            endpoint: None,
        };
        let cli = GenerateOverrides {
            client_name: Some("Studio".to_string()),
            endpoint: Some("https://api.example.com/graphql".to_string()),
            ..Default::default()
        };

        let settings = GenerateSettings::resolve(file, cli).unwrap();
        assert_eq!(settings.schema, PathBuf::from("api/schema.graphql"));
        assert_eq!(settings.out_dir, PathBuf::from("src/gen"));
        assert_eq!(settings.options.client_name, "Studio");
        assert_eq!(settings.options.schema_name.as_deref(), Some("models"));
        assert_eq!(
            settings.options.endpoint.as_deref(),
            Some("https://api.example.com/graphql")
        );
    }

    #[test]
    fn test_client_name_from_schema_file() {
        let cli = GenerateOverrides {
            schema: Some(PathBuf::from("movie_db.graphql")),
            ..Default::default()
        };
        let settings = GenerateSettings::resolve(ProjectConfig::default(), cli).unwrap();
        assert_eq!(settings.options.client_name, "MovieDb");
        assert_eq!(settings.out_dir, PathBuf::from("generated"));
    }

    #[test]
    fn test_schema_is_required() {
        let err = GenerateSettings::resolve(ProjectConfig::default(), Default::default())
            .unwrap_err();
        assert!(err.to_string().contains("No schema given"));
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(PROJECT_FILE),
            "schema = \"schema.graphql\"\nclient_name = \"Cine\"\nout_dir = \"gen\"\n",
        )
        .unwrap();

        let config = ProjectConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.schema, Some(dir.path().join("schema.graphql")));
        assert_eq!(config.out_dir, Some(dir.path().join("gen")));
        assert_eq!(config.client_name.as_deref(), Some("Cine"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            ProjectConfig::discover(None, dir.path()).unwrap(),
            ProjectConfig::default()
        );
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "shema = \"typo.graphql\"\n").unwrap();
        assert!(ProjectConfig::load(&path).is_err());
    }
}

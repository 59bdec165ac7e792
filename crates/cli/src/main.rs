mod auth;
mod formatter;
mod project;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use formatter::{ColorMode, OutputFormat};
use project::{GenerateOverrides, GenerateSettings, ProjectConfig};
use sdkgen_auth::{LoginConfig, LoginFlow, DEFAULT_CALLBACK_ADDR};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sdkgen")]
#[command(about = "Generate typed Rust client SDKs from GraphQL schemas", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a schema and write the client and schema modules
    Generate {
        /// GraphQL SDL file (falls back to `schema` in sdkgen.toml)
        #[arg(env = "SDKGEN_SCHEMA")]
        schema: Option<PathBuf>,

        /// Base name of the generated client, e.g. "Cine" for CineClient
        #[arg(long, env = "SDKGEN_CLIENT_NAME")]
        client_name: Option<String>,

        /// Name of the generated schema module (default: "schema")
        #[arg(long, env = "SDKGEN_SCHEMA_NAME")]
        schema_name: Option<String>,

        /// Directory the modules are written to (default: "generated")
        #[arg(long, env = "SDKGEN_OUT_DIR")]
        out_dir: Option<PathBuf>,

        /// Default endpoint baked into the generated client
        #[arg(long, env = "SDKGEN_ENDPOINT")]
        endpoint: Option<String>,

        /// Project config file (default: ./sdkgen.toml if present)
        #[arg(long, env = "SDKGEN_CONFIG")]
        config: Option<PathBuf>,

        /// Color output: auto (default), always, or never
        #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
        color: ColorMode,
    },

    /// Print the models of a schema in dependency order
    Order {
        /// GraphQL SDL file
        schema: PathBuf,

        /// Output format: json, compact, or pretty (default)
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,

        /// Color output: auto (default), always, or never
        #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
        color: ColorMode,
    },

    /// Sign in through the browser and store the tokens for a profile
    Login {
        /// Profile name (default: "default")
        #[arg(long, default_value = "default")]
        profile: String,

        /// OAuth client id (required for a new profile)
        #[arg(long, env = "SDKGEN_CLIENT_ID")]
        client_id: Option<String>,

        /// Issuer URL used for OpenID discovery
        #[arg(long, env = "SDKGEN_AUTHORITY")]
        authority: Option<String>,

        /// Authorization endpoint (use together with --token-url to skip discovery)
        #[arg(long)]
        authorize_url: Option<String>,

        /// Token endpoint
        #[arg(long)]
        token_url: Option<String>,

        /// Scope to request (repeatable)
        #[arg(long = "scope")]
        scopes: Vec<String>,

        /// Address of the local callback listener
        #[arg(long, default_value = DEFAULT_CALLBACK_ADDR)]
        callback_addr: String,

        /// Seconds to wait for the browser redirect
        #[arg(long, default_value_t = 300)]
        timeout_secs: u64,
    },

    /// Print the stored access token of a profile
    Token {
        /// Profile name (default: active profile)
        #[arg(long)]
        profile: Option<String>,
    },

    /// Remove a profile and its stored tokens
    Logout {
        /// Profile name (default: active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, keeping stdout clean for data
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            schema,
            client_name,
            schema_name,
            out_dir,
            endpoint,
            config,
            color,
        } => {
            let overrides = GenerateOverrides {
                schema,
                client_name,
                schema_name,
                out_dir,
                endpoint,
            };
            run_generate(config.as_deref(), overrides, color)
        }
        Commands::Order {
            schema,
            format,
            color,
        } => run_order(&schema, format, color),
        Commands::Login {
            profile,
            client_id,
            authority,
            authorize_url,
            token_url,
            scopes,
            callback_addr,
            timeout_secs,
        } => {
            let requested = auth::Profile {
                client_id: client_id.unwrap_or_default(),
                authority,
                authorization_endpoint: authorize_url,
                token_endpoint: token_url,
                scopes,
            };
            run_login(
                &profile,
                requested,
                callback_addr,
                Duration::from_secs(timeout_secs),
            )
            .await
        }
        Commands::Token { profile } => run_token(profile.as_deref()),
        Commands::Logout { profile } => run_logout(profile.as_deref()),
    }
}

fn read_schema(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read schema {:?}", path))
}

fn run_generate(
    config: Option<&Path>,
    overrides: GenerateOverrides,
    color: ColorMode,
) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let file = ProjectConfig::discover(config, &cwd)?;
    let settings = GenerateSettings::resolve(file, overrides)?;
    debug!("Generating with {:?}", settings);

    let sdl = read_schema(&settings.schema)?;
    let sdk = sdkgen_gql::generate(&sdl, &settings.options)
        .with_context(|| format!("Failed to generate SDK from {:?}", settings.schema))?;
    let written = sdk
        .write_to(&settings.out_dir)
        .with_context(|| format!("Failed to write SDK to {:?}", settings.out_dir))?;

    println!(
        "{}",
        formatter::format_written(&written, color.should_colorize())
    );
    Ok(())
}

fn run_order(schema: &Path, format: OutputFormat, color: ColorMode) -> Result<()> {
    let sdl = read_schema(schema)?;
    let collection = sdkgen_gql::parse_schema(&sdl)
        .with_context(|| format!("Failed to parse schema {:?}", schema))?;
    let ordered = collection
        .topological_order()
        .with_context(|| format!("Cannot order the models of {:?}", schema))?;

    println!(
        "{}",
        formatter::format_order(&ordered, &collection, format, color.should_colorize())
    );
    Ok(())
}

/// Fill in whatever the command line left out from the stored profile
fn merge_profile(requested: auth::Profile, stored: Option<&auth::Profile>) -> auth::Profile {
    let Some(stored) = stored else {
        return requested;
    };

    let endpoints_given = requested.authority.is_some()
        || requested.authorization_endpoint.is_some()
        || requested.token_endpoint.is_some();

    auth::Profile {
        client_id: if requested.client_id.is_empty() {
            stored.client_id.clone()
        } else {
            requested.client_id
        },
        authority: if endpoints_given {
            requested.authority
        } else {
            stored.authority.clone()
        },
        authorization_endpoint: if endpoints_given {
            requested.authorization_endpoint
        } else {
            stored.authorization_endpoint.clone()
        },
        token_endpoint: if endpoints_given {
            requested.token_endpoint
        } else {
            stored.token_endpoint.clone()
        },
        scopes: if requested.scopes.is_empty() {
            stored.scopes.clone()
        } else {
            requested.scopes
        },
    }
}

async fn run_login(
    profile_name: &str,
    requested: auth::Profile,
    callback_addr: String,
    timeout: Duration,
) -> Result<()> {
    let config = auth::load_config()?;
    let profile = merge_profile(requested, config.get_profile(profile_name));
    if profile.client_id.is_empty() {
        anyhow::bail!(
            "Profile '{}' has no client id. Pass --client-id to create it",
            profile_name
        );
    }

    let service = profile.keyring_service();
    if !auth::keyring::is_keyring_available(&service, &profile.keyring_check_username(profile_name))
    {
        anyhow::bail!("The system keyring is not available; tokens could not be stored");
    }

    let mut login = LoginConfig::new(profile.endpoints()?, profile.client_id.clone());
    login.scopes = profile.scopes.clone();
    login.callback_addr = callback_addr;
    login.timeout = timeout;

    eprintln!("Logging in to profile: {}", profile_name);
    let tokens = LoginFlow::new(login)?
        .run(|url| {
            eprintln!();
            eprintln!("Open this URL in your browser to continue:");
            eprintln!("  {}", url);
            eprintln!();
        })
        .await
        .context("Login failed")?;

    auth::save_login(profile_name, &profile, &tokens)?;
    info!("Stored tokens for profile '{}'", profile_name);

    println!("✓ Logged in to profile '{}'", profile_name);
    println!("  Config: {}", auth::config_file_path()?.display());
    Ok(())
}

fn run_token(profile: Option<&str>) -> Result<()> {
    let tokens = auth::load_tokens(profile)?;
    println!("{}", tokens.access_token);
    Ok(())
}

fn run_logout(profile: Option<&str>) -> Result<()> {
    let config = auth::load_config()?;
    let (name, _) = auth::resolve_profile(&config, profile)?;

    auth::delete_profile(&name)?;
    println!("✓ Logged out of profile '{}'", name);
    Ok(())
}

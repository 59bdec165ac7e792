use clap::ValueEnum;
use colored::*;
use sdkgen_gql::{DomainModel, DomainModelCollection};
use serde_json::{json, Value};
use std::path::PathBuf;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    Json,
    Compact,
    #[default]
    Pretty,
}

/// Color mode options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_colorize(&self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => {
                // Check if stdout is a TTY and colors are supported
                atty::is(atty::Stream::Stdout)
                    && supports_color::on(supports_color::Stream::Stdout).is_some()
            }
        }
    }
}

/// Model dependencies that are themselves models, in name order
fn model_dependencies<'a>(
    model: &'a DomainModel,
    collection: &DomainModelCollection,
) -> Vec<&'a str> {
    model
        .dependencies()
        .into_iter()
        .filter(|name| *name != model.name() && collection.get(name).is_some())
        .collect()
}

/// Format models in dependency order
pub fn format_order(
    ordered: &[&DomainModel],
    collection: &DomainModelCollection,
    format: OutputFormat,
    colorize: bool,
) -> String {
    match format {
        OutputFormat::Json => {
            let models: Vec<Value> = ordered
                .iter()
                .map(|model| {
                    json!({
                        "name": model.name(),
                        "fields": model.fields().len(),
                        "dependencies": model_dependencies(model, collection),
                    })
                })
                .collect();
            Value::Array(models).to_string()
        }
        OutputFormat::Compact => ordered
            .iter()
            .map(|model| model.name())
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Pretty => {
            if ordered.is_empty() {
                return "No models".to_string();
            }

            let width = ordered.len().to_string().len();
            ordered
                .iter()
                .enumerate()
                .map(|(i, model)| format_model_line(i + 1, width, model, collection, colorize))
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

fn format_model_line(
    position: usize,
    width: usize,
    model: &DomainModel,
    collection: &DomainModelCollection,
    colorize: bool,
) -> String {
    let deps = model_dependencies(model, collection);
    let fields = match model.fields().len() {
        1 => "1 field".to_string(),
        n => format!("{} fields", n),
    };

    if colorize {
        let mut line = format!(
            "{:>width$}. {} {}",
            position,
            model.name().bold(),
            format!("({})", fields).dimmed(),
        );
        if !deps.is_empty() {
            line.push_str(&format!(" {} {}", "<-".bright_black(), deps.join(", ").cyan()));
        }
        line
    } else {
        let mut line = format!("{:>width$}. {} ({})", position, model.name(), fields);
        if !deps.is_empty() {
            line.push_str(&format!(" <- {}", deps.join(", ")));
        }
        line
    }
}

/// Format the list of files written by `generate`
pub fn format_written(paths: &[PathBuf], colorize: bool) -> String {
    paths
        .iter()
        .map(|path| {
            if colorize {
                format!("{} {}", "+".green().bold(), path.display())
            } else {
                format!("+ {}", path.display())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

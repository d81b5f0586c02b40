//! Rendering and writing of pipeline results

use std::fmt;
use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use filtergen_expand::{ConcreteBenchmarkConfig, PipelineOutput};

/// Serialization format of the written result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML
    Yaml,
}

/// What the `expand` command writes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum EmitKind {
    /// `{name, configs}` with one record per benchmark run
    #[default]
    Configs,
    /// Expanded definition in list form
    Definition,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        })
    }
}

#[derive(Serialize)]
struct ConfigListing<'a> {
    name: &'a str,
    configs: &'a [ConcreteBenchmarkConfig],
}

fn serialize<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let mut rendered =
                serde_json::to_string_pretty(value).context("failed to serialize JSON")?;
            rendered.push('\n');
            Ok(rendered)
        }
        OutputFormat::Yaml => serde_yaml::to_string(value).context("failed to serialize YAML"),
    }
}

/// Render a pipeline result
pub(crate) fn render(
    output: &PipelineOutput,
    emit: EmitKind,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match emit {
        EmitKind::Configs => serialize(
            &ConfigListing {
                name: &output.definition.name,
                configs: &output.configs,
            },
            format,
        ),
        EmitKind::Definition => serialize(&output.definition, format),
    }
}

/// Write to `path`, creating parent directories, or to stdout
pub(crate) fn write_output(path: Option<&Path>, content: &str) -> anyhow::Result<()> {
    let Some(path) = path else {
        print!("{content}");
        return Ok(());
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

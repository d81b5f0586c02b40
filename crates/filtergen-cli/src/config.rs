//! Configuration loading from filtergen.toml
//!
//! Settings can be kept in a `filtergen.toml` next to the benchmark
//! definitions. The file is discovered by walking up from the current
//! directory; command line flags override it.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use filtergen_expand::UnknownStrategyPolicy;

use crate::output::{EmitKind, OutputFormat};

/// Name of the configuration file
pub(crate) const CONFIG_FILE_NAME: &str = "filtergen.toml";

/// filtergen configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct GeneratorConfig {
    /// Schema selection
    #[serde(default)]
    pub(crate) schema: SchemaConfig,
    /// Pipeline behaviour
    #[serde(default)]
    pub(crate) pipeline: PipelineConfig,
    /// Output defaults
    #[serde(default)]
    pub(crate) output: OutputConfig,
}

/// Schema selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct SchemaConfig {
    /// Schema file; the bundled schema is used when absent
    #[serde(default)]
    pub(crate) path: Option<PathBuf>,
}

/// Pipeline behaviour
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct PipelineConfig {
    /// What to do with an unrecognised `preprocess` name
    #[serde(default)]
    pub(crate) unknown_strategy: UnknownStrategyPolicy,
}

/// Output defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct OutputConfig {
    /// Serialization format
    #[serde(default)]
    pub(crate) format: OutputFormat,
    /// What to write
    #[serde(default)]
    pub(crate) emit: EmitKind,
}

impl GeneratorConfig {
    /// Load configuration from a TOML file
    ///
    /// A relative schema path is resolved against the file's directory.
    pub(crate) fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;

        if let (Some(schema), Some(dir)) = (config.schema.path.as_mut(), path.parent()) {
            if schema.is_relative() {
                *schema = dir.join(&*schema);
            }
        }

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Find the nearest `filtergen.toml` at or above `start`
    pub(crate) fn locate(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Discover and load configuration by walking up from the current directory
    pub(crate) fn discover() -> anyhow::Result<Option<Self>> {
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        Self::locate(&cwd).map(Self::load).transpose()
    }

    /// Explicit file if given, otherwise discovered file, otherwise defaults
    pub(crate) fn resolve(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Ok(Self::discover()?.unwrap_or_default()),
        }
    }

    /// Generate a default configuration as TOML string
    pub(crate) fn default_toml() -> String {
        r#"# filtergen configuration

[schema]
# Definition schema (uncomment to replace the bundled schema)
# path = "schema/benchmark.schema.json"

[pipeline]
# Unknown preprocess names: "reject" fails, "passthrough" leaves entries unexpanded
unknown_strategy = "reject"

[output]
# Serialization format: json or yaml
format = "json"
# What to write: "configs" (flat list) or "definition" (expanded definition)
emit = "configs"
"#
        .to_string()
    }
}

//! Pipeline driver
//!
//! Orders the stages for one definition: validate, inherit defaults,
//! normalize, expand with the selected strategy, flatten. Any fatal error
//! stops the run before output is produced.

use filtergen_definition::{
    inherit_defaults, normalize, BenchmarkDefinition, DefinitionDocument, DefinitionResult,
    DefinitionSchema,
};

use crate::error::{ExpansionWarning, PipelineError};
use crate::flatten::{flatten, ConcreteBenchmarkConfig};
use crate::strategy::{PreprocessStrategy, UnknownStrategyPolicy};

/// Result of a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Strategy that was applied
    pub strategy: PreprocessStrategy,

    /// Definition with expanded entries and no `preprocess`
    pub definition: BenchmarkDefinition,

    /// Flattened configurations in generation order
    pub configs: Vec<ConcreteBenchmarkConfig>,

    /// Non-fatal diagnostics from every stage
    pub warnings: Vec<ExpansionWarning>,
}

/// Expansion pipeline bound to a schema
#[derive(Debug)]
pub struct Pipeline {
    schema: DefinitionSchema,
    policy: UnknownStrategyPolicy,
}

impl Pipeline {
    /// Create pipeline validating against `schema`
    #[must_use]
    pub fn new(schema: DefinitionSchema) -> Self {
        Self {
            schema,
            policy: UnknownStrategyPolicy::default(),
        }
    }

    /// Create pipeline with the bundled schema
    ///
    /// # Errors
    /// Returns an error if the bundled schema fails to compile
    pub fn with_bundled_schema() -> DefinitionResult<Self> {
        Ok(Self::new(DefinitionSchema::bundled()?))
    }

    /// Set the unknown-strategy policy
    #[must_use]
    pub fn with_policy(mut self, policy: UnknownStrategyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Schema in use
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &DefinitionSchema {
        &self.schema
    }

    /// Policy in use
    #[inline]
    #[must_use]
    pub fn policy(&self) -> UnknownStrategyPolicy {
        self.policy
    }

    /// Validate, merge and normalize without expanding
    ///
    /// # Errors
    /// Returns `SchemaViolation` if the document or a merged entry is malformed
    pub fn prepare(&self, document: DefinitionDocument) -> DefinitionResult<BenchmarkDefinition> {
        let validated = self.schema.validate(document)?;
        let merged = inherit_defaults(&validated)?;
        tracing::debug!("{}: merged {} entries", merged.name, merged.benchmarks.len());
        Ok(normalize(&merged))
    }

    /// Run every stage
    ///
    /// # Errors
    /// Returns the first fatal error; no partial output is produced
    pub fn run(&self, document: DefinitionDocument) -> Result<PipelineOutput, PipelineError> {
        let definition = self.prepare(document)?;

        let (strategy, passthrough) = self.policy.resolve(definition.preprocess.as_deref())?;
        let mut warnings = Vec::new();
        if let Some(warning) = passthrough {
            tracing::warn!("{}", warning);
            warnings.push(warning);
        }
        tracing::debug!("{}: strategy {}", definition.name, strategy);

        let mut entries = Vec::new();
        for entry in &definition.benchmarks {
            let expansion = strategy.expand(entry)?;
            entries.extend(expansion.entries);
            warnings.extend(expansion.warnings);
        }

        let expanded = BenchmarkDefinition {
            preprocess: None,
            ..definition.with_benchmarks(entries)
        };

        let flattened = flatten(&expanded);
        warnings.extend(flattened.warnings);

        tracing::info!(
            "{}: {} entries -> {} expanded -> {} configurations ({} warning(s))",
            expanded.name,
            definition.benchmarks.len(),
            expanded.benchmarks.len(),
            flattened.configs.len(),
            warnings.len()
        );

        Ok(PipelineOutput {
            strategy,
            definition: expanded,
            configs: flattened.configs,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExpandError;
    use filtergen_definition::DefinitionError;
    use serde_json::json;

    fn pipeline() -> Pipeline {
        Pipeline::with_bundled_schema().unwrap()
    }

    fn document(preprocess: Option<&str>) -> DefinitionDocument {
        let mut value = json!({
            "name": "pipeline",
            "parameter": {"k": [4], "s": [8, 16, 4, 1, 10], "n_elements": [1000]},
            "benchmarks": [{"filter": {"type": "Cuckoo", "variant": "Standard4"}}]
        });
        if let Some(name) = preprocess {
            value["preprocess"] = json!(name);
        }
        DefinitionDocument::new(value)
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn pipeline_is_shareable() {
        assert_send_sync::<Pipeline>();
        assert_send_sync::<PipelineOutput>();
    }

    #[test]
    fn run_bits_sweep() {
        let output = pipeline().run(document(Some("preprocess_s"))).unwrap();

        assert_eq!(output.strategy, PreprocessStrategy::Bits);
        assert_eq!(output.definition.preprocess, None);
        let scales: Vec<u64> = output.configs.iter().map(|c| c.parameter.s).collect();
        assert_eq!(scales, vec![2, 3, 4]);
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn run_without_preprocess_uses_literals() {
        let output = pipeline().run(document(None)).unwrap();

        assert_eq!(output.strategy, PreprocessStrategy::Identity);
        assert_eq!(output.configs.len(), 5);
    }

    #[test]
    fn run_rejects_unknown_strategy() {
        let err = pipeline().run(document(Some("preprocess_k"))).unwrap_err();
        assert!(matches!(err, PipelineError::Expand(ExpandError::UnknownStrategy(_))));
    }

    #[test]
    fn run_passthrough_unknown_strategy() {
        let output = pipeline()
            .with_policy(UnknownStrategyPolicy::Passthrough)
            .run(document(Some("preprocess_k")))
            .unwrap();

        assert_eq!(output.strategy, PreprocessStrategy::Identity);
        assert!(matches!(
            output.warnings[..],
            [ExpansionWarning::UnknownStrategyPassthrough { .. }]
        ));
    }

    #[test]
    fn run_stops_on_schema_violation() {
        let err = pipeline()
            .run(DefinitionDocument::new(json!({"name": "bad", "benchmarks": []})))
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Definition(DefinitionError::SchemaViolation { .. })
        ));
    }
}

//! Sweep expander trait and core types
//!
//! Provides the [`SweepExpander`] trait implemented by every expansion
//! strategy, and [`Expansion`], the list of derived entries it produces.

use std::fmt;

use filtergen_definition::BenchmarkEntry;

use crate::error::{ExpandError, ExpansionWarning};

/// Expansion strategy for one benchmark entry
///
/// Implementations must be deterministic and must not mutate the input:
/// the same entry always yields the same entries in the same order. The
/// output of one expander is a valid input for the next.
pub trait SweepExpander: Send + Sync + fmt::Debug {
    /// Expand one normalized entry into zero or more derived entries
    ///
    /// # Errors
    /// Returns `ExpandError` when the entry cannot be expanded by this strategy
    fn expand(&self, entry: &BenchmarkEntry) -> Result<Expansion, ExpandError>;

    /// Strategy name (for logging)
    fn name(&self) -> &'static str;
}

/// Derived entries plus the diagnostics collected while producing them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    /// Derived entries in generation order
    pub entries: Vec<BenchmarkEntry>,

    /// Non-fatal diagnostics
    pub warnings: Vec<ExpansionWarning>,
}

impl Expansion {
    /// Create empty expansion
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expansion holding a single entry
    #[inline]
    #[must_use]
    pub fn single(entry: BenchmarkEntry) -> Self {
        Self {
            entries: vec![entry],
            warnings: Vec::new(),
        }
    }

    /// Append derived entry
    #[inline]
    pub fn push(&mut self, entry: BenchmarkEntry) {
        self.entries.push(entry);
    }

    /// Record a warning (also emitted to the log)
    pub fn warn(&mut self, warning: ExpansionWarning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Append another expansion, keeping order
    pub fn extend(&mut self, other: Expansion) {
        self.entries.extend(other.entries);
        self.warnings.extend(other.warnings);
    }

    /// Number of derived entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry was derived
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pass-through strategy used when no `preprocess` is set
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl SweepExpander for Identity {
    fn expand(&self, entry: &BenchmarkEntry) -> Result<Expansion, ExpandError> {
        Ok(Expansion::single(entry.clone()))
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

/// Run `first`, then feed each of its entries through `then`
///
/// Every entry of the first stage gets its own independent second-stage
/// expansion; nothing is collapsed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential<A, B> {
    first: A,
    then: B,
}

impl<A, B> Sequential<A, B>
where
    A: SweepExpander,
    B: SweepExpander,
{
    /// Compose two expanders
    #[inline]
    #[must_use]
    pub fn new(first: A, then: B) -> Self {
        Self { first, then }
    }
}

impl<A, B> SweepExpander for Sequential<A, B>
where
    A: SweepExpander,
    B: SweepExpander,
{
    fn expand(&self, entry: &BenchmarkEntry) -> Result<Expansion, ExpandError> {
        let staged = self.first.expand(entry)?;

        let mut expansion = Expansion {
            entries: Vec::with_capacity(staged.entries.len()),
            warnings: staged.warnings,
        };
        for intermediate in &staged.entries {
            expansion.extend(self.then.expand(intermediate)?);
        }

        Ok(expansion)
    }

    fn name(&self) -> &'static str {
        "sequential"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filtergen_definition::{ElementCount, FilterSpec, ParameterBlock, ValueMap};

    fn entry(k: Vec<u64>) -> BenchmarkEntry {
        BenchmarkEntry {
            filter: FilterSpec::new("Bloom", "Naive32"),
            optimization: ValueMap::new(),
            parameter: ParameterBlock {
                k,
                s: vec![100],
                n_elements: vec![ElementCount::Build(10)],
                extra: ValueMap::new(),
            },
            extra: ValueMap::new(),
        }
    }

    /// Splits an entry into one entry per k
    #[derive(Debug)]
    struct SplitK;

    impl SweepExpander for SplitK {
        fn expand(&self, entry: &BenchmarkEntry) -> Result<Expansion, ExpandError> {
            let mut expansion = Expansion::new();
            for &k in &entry.parameter.k {
                expansion.push(entry.with_parameter(entry.parameter.with_k(k)));
            }
            Ok(expansion)
        }

        fn name(&self) -> &'static str {
            "split_k"
        }
    }

    #[test]
    fn identity_passes_through() {
        let input = entry(vec![4, 8]);
        let expansion = Identity.expand(&input).unwrap();

        assert_eq!(expansion.entries, vec![input]);
        assert!(expansion.warnings.is_empty());
    }

    #[test]
    fn sequential_feeds_each_entry() {
        let chained = Sequential::new(SplitK, Identity);
        let expansion = chained.expand(&entry(vec![4, 8, 16])).unwrap();

        let ks: Vec<_> = expansion.entries.iter().map(|e| e.parameter.k.clone()).collect();
        assert_eq!(ks, vec![vec![4], vec![8], vec![16]]);
    }

    #[test]
    fn expansion_extend_keeps_order() {
        let mut a = Expansion::single(entry(vec![1]));
        let mut b = Expansion::single(entry(vec![2]));
        b.warn(ExpansionWarning::UnknownStrategyPassthrough {
            name: "x".to_string(),
        });

        a.extend(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.entries[1].parameter.k, vec![2]);
        assert_eq!(a.warnings.len(), 1);
    }

    #[test]
    fn expansion_empty() {
        let expansion = Expansion::new();
        assert!(expansion.is_empty());
        assert_eq!(expansion.len(), 0);
    }
}

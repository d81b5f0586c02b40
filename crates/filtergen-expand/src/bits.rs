//! Bits-budget sweep
//!
//! Turns a `[min_bits, max_bits, step_bits, min_s, max_s]` descriptor in `s`
//! into concrete scale values, one derived entry per fingerprint size.

use filtergen_definition::{BenchmarkEntry, FilterSpec};

use crate::error::{ExpandError, ExpansionWarning};
use crate::expander::{Expansion, SweepExpander};

/// Number of values in a budget descriptor
pub const BUDGET_DESCRIPTOR_LEN: usize = 5;

/// Parsed `s` budget descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetDescriptor {
    /// First bit budget
    pub min_bits: u64,
    /// Last bit budget (inclusive)
    pub max_bits: u64,
    /// Budget stride; 0 sweeps only `min_bits`
    pub step_bits: u64,
    /// Smallest accepted scale
    pub min_s: u64,
    /// Largest accepted scale
    pub max_s: u64,
}

impl BudgetDescriptor {
    /// Parse from the raw `s` list
    ///
    /// # Errors
    /// Returns a reason string if the list does not hold exactly five values
    pub fn parse(values: &[u64]) -> Result<Self, String> {
        match *values {
            [min_bits, max_bits, step_bits, min_s, max_s] => Ok(Self {
                min_bits,
                max_bits,
                step_bits,
                min_s,
                max_s,
            }),
            _ => Err(format!(
                "expected [min_bits, max_bits, step_bits, min_s, max_s], got {} value(s)",
                values.len()
            )),
        }
    }

    /// Raw list form, as stored in `s`
    #[must_use]
    pub fn to_vec(&self) -> Vec<u64> {
        vec![self.min_bits, self.max_bits, self.step_bits, self.min_s, self.max_s]
    }

    /// Copy with a different lower scale bound
    #[inline]
    #[must_use]
    pub fn with_min_s(self, min_s: u64) -> Self {
        Self { min_s, ..self }
    }

    /// Bit budgets visited, in ascending order
    pub fn bits(&self) -> impl Iterator<Item = u64> {
        let step = self.step_bits;
        let max = self.max_bits;
        let limit = if step == 0 { 1 } else { usize::MAX };

        std::iter::successors(Some(self.min_bits), move |bits| bits.checked_add(step))
            .take_while(move |bits| *bits <= max)
            .take(limit)
    }

    /// Distinct scales `floor(bits / k)` within `[min_s, max_s]`, in discovery order
    ///
    /// `k` must be non-zero.
    #[must_use]
    pub fn scales_for(&self, k: u64) -> Vec<u64> {
        let mut scales: Vec<u64> = Vec::new();
        for bits in self.bits() {
            let s = bits / k;
            if (self.min_s..=self.max_s).contains(&s) && !scales.contains(&s) {
                scales.push(s);
            }
        }
        scales
    }
}

/// Linear sweep over the bit budget (`preprocess_s`)
///
/// For every `k` a fresh entry fixed to that `k` carries the scales derived
/// from the descriptor. A `k` without any feasible scale is dropped with an
/// [`ExpansionWarning::EmptyExpansion`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BitsSweep;

impl BitsSweep {
    /// Create new bits sweep
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn check_k(filter: &FilterSpec, k: u64) -> Result<(), ExpandError> {
    if k == 0 {
        return Err(ExpandError::invalid_descriptor(
            filter,
            "k",
            "fingerprint size must be positive",
        ));
    }
    Ok(())
}

impl SweepExpander for BitsSweep {
    fn expand(&self, entry: &BenchmarkEntry) -> Result<Expansion, ExpandError> {
        let filter = &entry.filter;
        let descriptor = BudgetDescriptor::parse(&entry.parameter.s)
            .map_err(|reason| ExpandError::invalid_descriptor(filter, "s", reason))?;

        let mut expansion = Expansion::new();
        for &k in &entry.parameter.k {
            check_k(filter, k)?;

            let scales = descriptor.scales_for(k);
            if scales.is_empty() {
                expansion.warn(ExpansionWarning::EmptyExpansion {
                    filter: filter.clone(),
                    k,
                });
                continue;
            }

            tracing::debug!("{}: k={} -> {} scale(s)", filter, k, scales.len());
            expansion.push(entry.with_parameter(entry.parameter.with_k(k).with_scales(scales)));
        }

        Ok(expansion)
    }

    fn name(&self) -> &'static str {
        "preprocess_s"
    }
}

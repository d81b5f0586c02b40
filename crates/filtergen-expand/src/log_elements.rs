//! Log-geometric element-count sweep
//!
//! `n_elements` holds five `{build, lookup, shared}` objects read slot-wise
//! as `[base, min_exp, max_exp, step_percent, floor]`. Build and lookup
//! advance in lockstep, so the sweep yields one point per exponent step
//! rather than a cross product.

use serde_json::Number;

use filtergen_definition::{BenchmarkEntry, ElementCount, ElementPoint, FilterSpec};

use crate::error::ExpandError;
use crate::expander::{Expansion, SweepExpander};

/// Number of slots in an element descriptor
pub const ELEMENT_DESCRIPTOR_LEN: usize = 5;

/// Largest number of exponent steps one axis may take
pub const MAX_AXIS_STEPS: usize = 1 << 20;

const EXPONENT_EPSILON: f64 = 1e-9;

/// One axis (`build` or `lookup`) of an element descriptor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSweep {
    /// Base raised to the exponent
    pub base: f64,
    /// First exponent
    pub min_exp: f64,
    /// Last exponent (inclusive)
    pub max_exp: f64,
    /// Exponent stride (already divided by 100)
    pub step: f64,
    /// Lower bound applied to every value
    pub floor: f64,
}

impl AxisSweep {
    /// Index of the last exponent this axis visits
    #[must_use]
    pub fn last_index(&self) -> usize {
        if self.step <= 0.0 || self.min_exp >= self.max_exp {
            return 0;
        }
        let span = (self.max_exp - self.min_exp) / self.step;
        (span - EXPONENT_EPSILON).ceil().max(0.0) as usize
    }

    /// Exponent at step `index`, held at the final exponent once exhausted
    #[must_use]
    pub fn exponent(&self, index: usize) -> f64 {
        let last = self.last_index();
        match index.min(last) {
            0 => self.min_exp,
            i if i == last => self.max_exp,
            i => self.min_exp + i as f64 * self.step,
        }
    }

    /// `max(base^exponent, floor)` at step `index`, halves rounded to even
    #[must_use]
    pub fn value(&self, index: usize) -> f64 {
        self.base
            .powf(self.exponent(index))
            .max(self.floor)
            .round_ties_even()
    }
}

/// Parsed `n_elements` descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDescriptor {
    /// Build axis
    pub build: AxisSweep,
    /// Lookup axis
    pub lookup: AxisSweep,
    /// Shared fraction copied onto every point
    pub shared: Number,
}

impl ElementDescriptor {
    /// Parse the five descriptor slots
    ///
    /// # Errors
    /// Returns a reason string on a wrong slot count, a negative base or floor,
    /// or a step too small for the exponent range
    pub fn parse(n_elements: &[ElementCount]) -> Result<Self, String> {
        if n_elements.len() != ELEMENT_DESCRIPTOR_LEN {
            return Err(format!(
                "expected [base, min_exp, max_exp, step_percent, floor], got {} value(s)",
                n_elements.len()
            ));
        }

        let slots: Vec<ElementPoint> = n_elements.iter().map(ElementCount::to_point).collect();
        let axis = |read: fn(&ElementPoint) -> f64, label: &str| -> Result<AxisSweep, String> {
            let sweep = AxisSweep {
                base: read(&slots[0]),
                min_exp: read(&slots[1]),
                max_exp: read(&slots[2]),
                step: read(&slots[3]) / 100.0,
                floor: read(&slots[4]),
            };

            let numbers = [sweep.base, sweep.min_exp, sweep.max_exp, sweep.step, sweep.floor];
            if numbers.iter().any(|n| !n.is_finite()) {
                return Err(format!("{label}: non-finite value"));
            }
            if sweep.base < 0.0 || sweep.floor < 0.0 {
                return Err(format!("{label}: base and floor must not be negative"));
            }
            if sweep.step > 0.0 && sweep.min_exp < sweep.max_exp {
                let steps = (sweep.max_exp - sweep.min_exp) / sweep.step;
                if !steps.is_finite() || steps > MAX_AXIS_STEPS as f64 {
                    return Err(format!(
                        "{label}: step of {} over [{}, {}] exceeds {MAX_AXIS_STEPS} points",
                        sweep.step, sweep.min_exp, sweep.max_exp
                    ));
                }
            }
            Ok(sweep)
        };

        Ok(Self {
            build: axis(ElementPoint::build_f64, "build")?,
            lookup: axis(ElementPoint::lookup_f64, "lookup")?,
            shared: slots[0].shared.clone(),
        })
    }

    /// Number of points the sweep produces, never zero
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.build
            .last_index()
            .max(self.lookup.last_index())
            .saturating_add(1)
    }

    /// `(build, lookup)` pairs in sweep order
    #[must_use]
    pub fn schedule(&self) -> Vec<(f64, f64)> {
        (0..self.point_count())
            .map(|i| (self.build.value(i), self.lookup.value(i)))
            .collect()
    }

    /// Concrete element points
    ///
    /// # Errors
    /// Returns a reason string if a value does not fit an element count
    pub fn points(&self) -> Result<Vec<ElementPoint>, String> {
        self.schedule()
            .into_iter()
            .map(|(build, lookup)| {
                Ok(ElementPoint::new(
                    to_count(build, "build")?,
                    to_count(lookup, "lookup")?,
                    self.shared.clone(),
                ))
            })
            .collect()
    }
}

fn to_count(value: f64, label: &str) -> Result<u64, String> {
    if !value.is_finite() || value < 0.0 || value >= u64::MAX as f64 {
        return Err(format!("{label} value {value} out of range"));
    }
    Ok(value as u64)
}

/// Log-geometric element-count sweep (`preprocess_n_elements_log`)
#[derive(Debug, Clone, Copy, Default)]
pub struct LogElementSweep;

impl LogElementSweep {
    /// Create new element sweep
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn invalid(filter: &FilterSpec, reason: String) -> ExpandError {
        ExpandError::invalid_descriptor(filter, "n_elements", reason)
    }
}

impl SweepExpander for LogElementSweep {
    fn expand(&self, entry: &BenchmarkEntry) -> Result<Expansion, ExpandError> {
        let descriptor = ElementDescriptor::parse(&entry.parameter.n_elements)
            .map_err(|reason| Self::invalid(&entry.filter, reason))?;
        let points = descriptor
            .points()
            .map_err(|reason| Self::invalid(&entry.filter, reason))?;

        tracing::debug!("{}: {} element point(s)", entry.filter, points.len());

        let n_elements = points.into_iter().map(ElementCount::from).collect();
        Ok(Expansion::single(
            entry.with_parameter(entry.parameter.with_elements(n_elements)),
        ))
    }

    fn name(&self) -> &'static str {
        "preprocess_n_elements_log"
    }
}

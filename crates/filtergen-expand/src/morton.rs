//! Feasibility-constrained bits sweep for Morton tables
//!
//! A compressed cuckoo table `Morton{fpb}_{compression}_{ota}` needs a
//! minimum number of bits per key that depends on its block geometry and the
//! fingerprint size. Scales below that floor describe encodings that cannot
//! exist, so the sweep never generates them.

use once_cell::sync::Lazy;
use regex::Regex;

use filtergen_definition::{BenchmarkEntry, FilterSpec};

use crate::bits::{check_k, BitsSweep, BudgetDescriptor, BUDGET_DESCRIPTOR_LEN};
use crate::error::ExpandError;
use crate::expander::{Expansion, SweepExpander};

/// Filter family the Morton variants belong to
pub const CUCKOO_FILTER_TYPE: &str = "Cuckoo";

static MORTON_VARIANT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Morton(\d+)_(\d+)_(\d+)$").expect("static pattern"));

/// Block geometry parsed from a Morton variant identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MortonGeometry {
    /// Fingerprints stored per block
    pub fingerprints_per_block: u64,
    /// Compression rate of the block store
    pub compression_rate: u64,
    /// Overflow tracking array rate
    pub ota_rate: u64,
}

impl MortonGeometry {
    /// Parse the geometry of a Cuckoo/Morton filter
    ///
    /// # Errors
    /// Returns `InvalidVariantFormat` when the filter is not a Cuckoo filter,
    /// the variant is not `Morton{fpb}_{compression}_{ota}`, `fpb` or
    /// `compression` is zero, or the block overhead does not fit a `u64`.
    pub fn parse(filter: &FilterSpec) -> Result<Self, ExpandError> {
        if filter.kind != CUCKOO_FILTER_TYPE {
            return Err(ExpandError::invalid_variant(
                filter,
                format!("expected filter type '{CUCKOO_FILTER_TYPE}'"),
            ));
        }

        let captures = MORTON_VARIANT.captures(&filter.variant).ok_or_else(|| {
            ExpandError::invalid_variant(
                filter,
                "expected 'Morton{fingerprints_per_block}_{compression_rate}_{ota_rate}'",
            )
        })?;

        let field = |index: usize, label: &str| -> Result<u64, ExpandError> {
            captures[index]
                .parse::<u64>()
                .map_err(|e| ExpandError::invalid_variant(filter, format!("{label}: {e}")))
        };

        let geometry = Self {
            fingerprints_per_block: field(1, "fingerprints_per_block")?,
            compression_rate: field(2, "compression_rate")?,
            ota_rate: field(3, "ota_rate")?,
        };

        if geometry.fingerprints_per_block == 0 || geometry.compression_rate == 0 {
            return Err(ExpandError::invalid_variant(
                filter,
                "fingerprints_per_block and compression_rate must be positive",
            ));
        }
        if geometry.overhead_bits().is_none() {
            return Err(ExpandError::invalid_variant(
                filter,
                "ota_rate: block overhead overflows",
            ));
        }

        Ok(geometry)
    }

    /// Bits needed to count fingerprints in one block: `ceil(log2(fpb + 1))`
    #[inline]
    #[must_use]
    pub fn counter_bits(&self) -> u64 {
        u64::from(u64::BITS - self.fingerprints_per_block.leading_zeros())
    }

    /// `counter_bits * 100 + ota_rate`, `None` on overflow
    #[inline]
    #[must_use]
    pub fn overhead_bits(&self) -> Option<u64> {
        self.counter_bits()
            .checked_mul(100)
            .and_then(|bits| bits.checked_add(self.ota_rate))
    }

    /// Smallest feasible scale factor for fingerprint size `k`
    ///
    /// `1 + (counter_bits * 100 + ota_rate) / (fpb * compression_rate * k)`
    #[must_use]
    pub fn min_scale(&self, k: u64) -> f64 {
        let overhead = self.counter_bits() as f64 * 100.0 + self.ota_rate as f64;
        let payload =
            self.fingerprints_per_block as f64 * self.compression_rate as f64 * k as f64;
        1.0 + overhead / payload
    }

    /// [`min_scale`](Self::min_scale) in hundredths, the unit of `s`
    #[inline]
    #[must_use]
    pub fn min_scale_hundredths(&self, k: u64) -> u64 {
        (self.min_scale(k) * 100.0).round() as u64
    }
}

/// Bits sweep with a per-k feasibility floor (`preprocess_s_morton`)
///
/// `s` may be `[min_bits, max_bits, step_bits, max_s]`, in which case the
/// floor is inserted as `min_s`, or a full five-value descriptor whose
/// `min_s` is replaced by the floor.
#[derive(Debug, Clone, Copy, Default)]
pub struct MortonBitsSweep;

impl MortonBitsSweep {
    /// Create new Morton sweep
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn descriptor(entry: &BenchmarkEntry) -> Result<BudgetDescriptor, ExpandError> {
        let s = &entry.parameter.s;
        let full = match s.len() {
            4 => vec![s[0], s[1], s[2], 0, s[3]],
            BUDGET_DESCRIPTOR_LEN => s.clone(),
            n => {
                return Err(ExpandError::invalid_descriptor(
                    &entry.filter,
                    "s",
                    format!("expected [min_bits, max_bits, step_bits, (min_s,) max_s], got {n} value(s)"),
                ))
            }
        };

        BudgetDescriptor::parse(&full)
            .map_err(|reason| ExpandError::invalid_descriptor(&entry.filter, "s", reason))
    }
}

impl SweepExpander for MortonBitsSweep {
    fn expand(&self, entry: &BenchmarkEntry) -> Result<Expansion, ExpandError> {
        let geometry = MortonGeometry::parse(&entry.filter)?;
        let descriptor = Self::descriptor(entry)?;

        let mut expansion = Expansion::new();
        for &k in &entry.parameter.k {
            check_k(&entry.filter, k)?;

            let floor = geometry.min_scale_hundredths(k);
            tracing::debug!("{}: k={} feasibility floor s>={}", entry.filter, k, floor);

            let bounded = descriptor.with_min_s(floor);
            let fixed = entry.with_parameter(entry.parameter.with_k(k).with_scales(bounded.to_vec()));
            expansion.extend(BitsSweep.expand(&fixed)?);
        }

        Ok(expansion)
    }

    fn name(&self) -> &'static str {
        "preprocess_s_morton"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExpansionWarning;
    use filtergen_definition::{ElementCount, ParameterBlock, ValueMap};

    fn entry(kind: &str, variant: &str, k: Vec<u64>, s: Vec<u64>) -> BenchmarkEntry {
        BenchmarkEntry {
            filter: FilterSpec::new(kind, variant),
            optimization: ValueMap::new(),
            parameter: ParameterBlock {
                k,
                s,
                n_elements: vec![ElementCount::Build(1000)],
                extra: ValueMap::new(),
            },
            extra: ValueMap::new(),
        }
    }

    #[test]
    fn geometry_parse() {
        let geometry = MortonGeometry::parse(&FilterSpec::new("Cuckoo", "Morton3_4_2")).unwrap();
        assert_eq!(
            geometry,
            MortonGeometry {
                fingerprints_per_block: 3,
                compression_rate: 4,
                ota_rate: 2,
            }
        );
    }

    #[test]
    fn geometry_rejects_other_family() {
        let err = MortonGeometry::parse(&FilterSpec::new("Bloom", "Morton3_4_2")).unwrap_err();
        assert!(matches!(err, ExpandError::InvalidVariantFormat { .. }));
    }

    #[test]
    fn geometry_rejects_other_variant() {
        for variant in ["Standard4", "MortonOpt", "Morton3_4", "Morton3_4_x", "xMorton3_4_2"] {
            let err = MortonGeometry::parse(&FilterSpec::new("Cuckoo", variant)).unwrap_err();
            assert!(
                matches!(err, ExpandError::InvalidVariantFormat { .. }),
                "{variant} accepted"
            );
        }
    }

    #[test]
    fn geometry_rejects_zero_block() {
        let err = MortonGeometry::parse(&FilterSpec::new("Cuckoo", "Morton0_4_2")).unwrap_err();
        assert!(matches!(err, ExpandError::InvalidVariantFormat { .. }));
    }

    #[test]
    fn geometry_rejects_overflowing_ota_rate() {
        let filter = FilterSpec::new("Cuckoo", "Morton3_4_18446744073709551615");
        let err = MortonGeometry::parse(&filter).unwrap_err();
        assert!(matches!(err, ExpandError::InvalidVariantFormat { .. }));

        let largest = format!("Morton3_4_{}", u64::MAX - 200);
        let geometry = MortonGeometry::parse(&FilterSpec::new("Cuckoo", &largest)).unwrap();
        assert_eq!(geometry.overhead_bits(), Some(u64::MAX));
        assert!(geometry.min_scale_hundredths(10) > 0);
    }

    #[test]
    fn counter_bits_is_ceil_log2() {
        let bits = |fpb| {
            MortonGeometry {
                fingerprints_per_block: fpb,
                compression_rate: 1,
                ota_rate: 0,
            }
            .counter_bits()
        };
        assert_eq!(bits(1), 1);
        assert_eq!(bits(3), 2);
        assert_eq!(bits(4), 3);
        assert_eq!(bits(7), 3);
        assert_eq!(bits(46), 6);
    }

    #[test]
    fn min_scale_reference_example() {
        let geometry = MortonGeometry::parse(&FilterSpec::new("Cuckoo", "Morton3_4_2")).unwrap();
        assert!((geometry.min_scale(10) - 2.683_333).abs() < 1e-5);
        assert_eq!(geometry.min_scale_hundredths(10), 268);
    }

    #[test]
    fn sweep_inserts_floor_into_short_descriptor() {
        // k=10: floor 268, bits 2000..=4000 step 500 -> s = 200, 250, 300, 350, 400
        let expansion = MortonBitsSweep
            .expand(&entry("Cuckoo", "Morton3_4_2", vec![10], vec![2000, 4000, 500, 350]))
            .unwrap();

        assert_eq!(expansion.len(), 1);
        assert_eq!(expansion.entries[0].parameter.s, vec![300, 350]);
    }

    #[test]
    fn sweep_overrides_lower_bound_of_full_descriptor() {
        let expansion = MortonBitsSweep
            .expand(&entry("Cuckoo", "Morton3_4_2", vec![10], vec![2000, 4000, 500, 0, 400]))
            .unwrap();

        assert_eq!(expansion.entries[0].parameter.s, vec![300, 350, 400]);
    }

    #[test]
    fn sweep_floor_depends_on_k() {
        // k=8: 1 + 202/96 -> 310; k=16: 1 + 202/192 -> 205
        let expansion = MortonBitsSweep
            .expand(&entry("Cuckoo", "Morton3_4_2", vec![8, 16], vec![1600, 6400, 800, 500]))
            .unwrap();

        assert_eq!(expansion.entries[0].parameter.k, vec![8]);
        assert_eq!(expansion.entries[0].parameter.s, vec![400, 500]);
        assert_eq!(expansion.entries[1].parameter.k, vec![16]);
        assert_eq!(expansion.entries[1].parameter.s, vec![250, 300, 350, 400]);
    }

    #[test]
    fn sweep_drops_infeasible_k() {
        let expansion = MortonBitsSweep
            .expand(&entry("Cuckoo", "Morton3_4_2", vec![10], vec![1000, 2000, 500, 400]))
            .unwrap();

        assert!(expansion.is_empty());
        assert!(matches!(
            expansion.warnings[..],
            [ExpansionWarning::EmptyExpansion { k: 10, .. }]
        ));
    }

    #[test]
    fn sweep_rejects_bad_descriptor_length() {
        let err = MortonBitsSweep
            .expand(&entry("Cuckoo", "Morton3_4_2", vec![10], vec![1000, 2000]))
            .unwrap_err();
        assert!(matches!(err, ExpandError::InvalidDescriptor { key: "s", .. }));
    }

    #[test]
    fn sweep_rejects_non_morton_entry() {
        let err = MortonBitsSweep
            .expand(&entry("Cuckoo", "Standard4", vec![10], vec![1000, 2000, 500, 400]))
            .unwrap_err();
        assert!(matches!(err, ExpandError::InvalidVariantFormat { .. }));
    }
}

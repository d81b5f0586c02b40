//! Strategy selection from the definition's `preprocess` name

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use filtergen_definition::BenchmarkEntry;

use crate::bits::BitsSweep;
use crate::error::{ExpandError, ExpansionWarning};
use crate::expander::{Expansion, Identity, Sequential, SweepExpander};
use crate::log_elements::LogElementSweep;
use crate::morton::MortonBitsSweep;

/// Recognised expansion strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreprocessStrategy {
    /// No expansion
    Identity,
    /// `preprocess_s`
    Bits,
    /// `preprocess_s_morton`
    MortonBits,
    /// `preprocess_n_elements_log`
    LogElements,
    /// `preprocess_s_and_n_elements_log`
    BitsThenLogElements,
}

impl PreprocessStrategy {
    /// Every strategy, in listing order
    pub const ALL: [Self; 5] = [
        Self::Identity,
        Self::Bits,
        Self::MortonBits,
        Self::LogElements,
        Self::BitsThenLogElements,
    ];

    /// Name as written in `preprocess`
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Bits => "preprocess_s",
            Self::MortonBits => "preprocess_s_morton",
            Self::LogElements => "preprocess_n_elements_log",
            Self::BitsThenLogElements => "preprocess_s_and_n_elements_log",
        }
    }

    /// One-line description for listings
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Identity => "entries are used as written (also selected when preprocess is absent)",
            Self::Bits => "sweep a bit budget, one entry per k with s = floor(bits / k)",
            Self::MortonBits => "bit budget sweep bounded below by the Morton feasibility floor",
            Self::LogElements => "log-geometric sweep of build and lookup element counts",
            Self::BitsThenLogElements => "preprocess_s, then preprocess_n_elements_log on each result",
        }
    }

    /// Strategy for an optional `preprocess` value
    ///
    /// # Errors
    /// Returns `UnknownStrategy` for unrecognised names
    pub fn from_name(name: Option<&str>) -> Result<Self, ExpandError> {
        name.map_or(Ok(Self::Identity), str::parse)
    }

    /// Expand one entry with this strategy
    ///
    /// # Errors
    /// Propagates the selected expander's error
    pub fn expand(self, entry: &BenchmarkEntry) -> Result<Expansion, ExpandError> {
        match self {
            Self::Identity => Identity.expand(entry),
            Self::Bits => BitsSweep.expand(entry),
            Self::MortonBits => MortonBitsSweep.expand(entry),
            Self::LogElements => LogElementSweep.expand(entry),
            Self::BitsThenLogElements => Sequential::new(BitsSweep, LogElementSweep).expand(entry),
        }
    }
}

impl FromStr for PreprocessStrategy {
    type Err = ExpandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::Identity),
            _ => Self::ALL
                .into_iter()
                .find(|strategy| strategy.name() == s)
                .ok_or_else(|| ExpandError::UnknownStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for PreprocessStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What to do with a `preprocess` name no strategy answers to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownStrategyPolicy {
    /// Fail with `UnknownStrategy`
    #[default]
    Reject,
    /// Use entries unexpanded and warn
    Passthrough,
}

impl UnknownStrategyPolicy {
    /// Resolve a `preprocess` value under this policy
    ///
    /// # Errors
    /// Returns `UnknownStrategy` under [`Reject`](Self::Reject)
    pub fn resolve(
        self,
        name: Option<&str>,
    ) -> Result<(PreprocessStrategy, Option<ExpansionWarning>), ExpandError> {
        match (PreprocessStrategy::from_name(name), self) {
            (Ok(strategy), _) => Ok((strategy, None)),
            (Err(ExpandError::UnknownStrategy(name)), Self::Passthrough) => Ok((
                PreprocessStrategy::Identity,
                Some(ExpansionWarning::UnknownStrategyPassthrough { name }),
            )),
            (Err(e), _) => Err(e),
        }
    }
}

impl FromStr for UnknownStrategyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reject" => Ok(Self::Reject),
            "passthrough" => Ok(Self::Passthrough),
            other => Err(format!("unknown policy '{other}' (expected reject or passthrough)")),
        }
    }
}

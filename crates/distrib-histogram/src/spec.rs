//! Configuration types for bin distributions
//!
//! Specs are plain serde data so they can be loaded from JSON. Numeric
//! parameters of a [`NumberBinSpec`] are kept as [`RawValue`]s; they are
//! coerced into the distribution's element type (as configuration input)
//! when a [`BinLayout`](crate::BinLayout) is built from them.

use crate::bins::BinLayout;
use distrib_core::{ElementStrategy, Error, FloatStrategy, IntegerStrategy, RawValue, Result, ValueType};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// What each bin reports as its headline value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinValue {
    /// Occurrence weight of the bin
    #[default]
    Count,
    /// Occurrence weight divided by the weight of all binned values
    Proportion,
}

impl BinValue {
    /// Headline value of a bin holding `weight` out of `binned_weight`
    pub fn evaluate(self, weight: u64, binned_weight: u64) -> f64 {
        match self {
            Self::Count => weight as f64,
            Self::Proportion => {
                if binned_weight == 0 {
                    0.0
                } else {
                    weight as f64 / binned_weight as f64
                }
            }
        }
    }
}

/// Shape of the values being distributed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ValueSpec {
    /// Logical element type; must match the distribution's strategy
    #[serde(default)]
    pub value_type: ValueType,
    /// Headline value reported per bin
    #[serde(default)]
    pub bin_value: BinValue,
}

impl ValueSpec {
    /// Create a value spec
    pub fn new(value_type: ValueType, bin_value: BinValue) -> Self {
        Self {
            value_type,
            bin_value,
        }
    }

    /// Integer values, bins report counts
    pub fn integer() -> Self {
        Self::new(ValueType::Integer, BinValue::Count)
    }

    /// Float values, bins report counts
    pub fn number() -> Self {
        Self::new(ValueType::Number, BinValue::Count)
    }

    /// Same value type, bins report proportions
    pub fn with_proportions(mut self) -> Self {
        self.bin_value = BinValue::Proportion;
        self
    }
}

/// Bin boundaries for numeric binning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NumberBinSpec {
    /// Equal-width bins covering `[range_min, range_max]`
    ///
    /// The last bin ends at `range_max` and may be narrower than the rest.
    FixedWidth {
        range_min: RawValue,
        range_max: RawValue,
        bin_width: RawValue,
    },
    /// Explicit, strictly increasing edges; `n + 1` edges give `n` bins
    Boundaries { edges: Vec<RawValue> },
}

impl NumberBinSpec {
    /// Fixed-width spec
    pub fn fixed_width(
        range_min: impl Into<RawValue>,
        range_max: impl Into<RawValue>,
        bin_width: impl Into<RawValue>,
    ) -> Self {
        Self::FixedWidth {
            range_min: range_min.into(),
            range_max: range_max.into(),
            bin_width: bin_width.into(),
        }
    }

    /// Explicit-edges spec
    pub fn boundaries<I>(edges: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<RawValue>,
    {
        Self::Boundaries {
            edges: edges.into_iter().map(Into::into).collect(),
        }
    }
}

/// A complete distribution configuration, loadable from JSON
///
/// ```rust
/// use distrib_histogram::{BinValue, DistributionConfig};
///
/// let config = DistributionConfig::from_json_str(r#"{
///     "value_spec": { "value_type": "integer", "bin_value": "proportion" },
///     "bin_spec": { "kind": "fixed_width", "range_min": 0, "range_max": 100, "bin_width": "10" }
/// }"#).unwrap();
/// assert_eq!(config.value_spec.bin_value, BinValue::Proportion);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionConfig {
    #[serde(default)]
    pub value_spec: ValueSpec,
    pub bin_spec: NumberBinSpec,
}

impl DistributionConfig {
    /// Create a configuration without validating it
    pub fn new(value_spec: ValueSpec, bin_spec: NumberBinSpec) -> Self {
        Self {
            value_spec,
            bin_spec,
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON configuration from a reader
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the bin spec against the declared value type
    pub fn validate(&self) -> Result<()> {
        match self.value_spec.value_type {
            ValueType::Integer => self.layout(&IntegerStrategy).map(|_| ()),
            ValueType::Number => self.layout(&FloatStrategy).map(|_| ()),
        }
    }

    /// Build the bin layout in `strategy`'s element type
    pub fn layout<S: ElementStrategy>(&self, strategy: &S) -> Result<BinLayout<S::Element>> {
        if self.value_spec.value_type != strategy.value_type() {
            return Err(Error::Configuration(format!(
                "value type {:?} does not match {:?} layout",
                self.value_spec.value_type,
                strategy.value_type()
            )));
        }
        BinLayout::new(&self.bin_spec, strategy)
    }

    /// Serialize to pretty JSON
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Error::from)
    }
}

//! Summary types produced by a finished distribution

use crate::bins::BinRange;
use crate::spec::BinValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable summary statistics for one collector
///
/// Built only by the collectors in [`crate::collector`]. The optional fields
/// are `None` when no value was accepted, never zero or NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramStats {
    subset_entity_count: u64,
    missing_cases: u64,
    num_distinct_values: u64,
    total_weight: u64,
    subset_min: Option<f64>,
    subset_max: Option<f64>,
    subset_sum: Option<f64>,
    subset_mean: Option<f64>,
}

impl HistogramStats {
    pub(crate) fn new(
        subset_entity_count: u64,
        missing_cases: u64,
        num_distinct_values: u64,
        total_weight: u64,
    ) -> Self {
        Self {
            subset_entity_count,
            missing_cases,
            num_distinct_values,
            total_weight,
            subset_min: None,
            subset_max: None,
            subset_sum: None,
            subset_mean: None,
        }
    }

    pub(crate) fn set_subset_sum(&mut self, sum: f64) {
        self.subset_sum = Some(sum);
    }

    pub(crate) fn set_subset_mean(&mut self, mean: f64) {
        self.subset_mean = Some(mean);
    }

    pub(crate) fn set_subset_range(&mut self, min: f64, max: f64) {
        self.subset_min = Some(min);
        self.subset_max = Some(max);
    }

    /// Size of the population under analysis
    pub fn subset_entity_count(&self) -> u64 {
        self.subset_entity_count
    }

    /// Records with no usable value
    pub fn missing_cases(&self) -> u64 {
        self.missing_cases
    }

    /// Number of (value, count) pairs accepted
    pub fn num_distinct_values(&self) -> u64 {
        self.num_distinct_values
    }

    /// Sum of occurrence counts
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Smallest accepted value
    pub fn subset_min(&self) -> Option<f64> {
        self.subset_min
    }

    /// Largest accepted value
    pub fn subset_max(&self) -> Option<f64> {
        self.subset_max
    }

    /// Sum of `value * count` over accepted values
    pub fn subset_sum(&self) -> Option<f64> {
        self.subset_sum
    }

    /// Sum of `value * count` divided by the distinct-value count
    pub fn subset_mean(&self) -> Option<f64> {
        self.subset_mean
    }

    /// Whether any value contributed
    pub fn is_data_present(&self) -> bool {
        self.num_distinct_values > 0
    }
}

impl fmt::Display for HistogramStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={}, distinct={}, weight={}, missing={}",
            self.subset_entity_count, self.num_distinct_values, self.total_weight, self.missing_cases
        )?;
        if let Some(mean) = self.subset_mean {
            write!(f, ", mean={mean:.3}")?;
        }
        Ok(())
    }
}

/// One bin of a finished histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinSummary {
    range: BinRange,
    label: String,
    value: f64,
    stats: HistogramStats,
}

impl BinSummary {
    pub(crate) fn new(range: BinRange, label: String, value: f64, stats: HistogramStats) -> Self {
        Self {
            label,
            range,
            value,
            stats,
        }
    }

    /// Range covered by the bin
    pub fn range(&self) -> BinRange {
        self.range
    }

    /// Display label, e.g. `[0, 5)`
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Headline value (count or proportion)
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Statistics of the values in the bin
    pub fn stats(&self) -> &HistogramStats {
        &self.stats
    }
}

impl fmt::Display for BinSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: value={}, {}", self.label, self.value, self.stats)
    }
}

/// A finished binned distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinnedHistogram {
    stats: HistogramStats,
    bins: Vec<BinSummary>,
    out_of_range_count: u64,
    bin_value: BinValue,
}

impl BinnedHistogram {
    pub(crate) fn new(
        stats: HistogramStats,
        bins: Vec<BinSummary>,
        out_of_range_count: u64,
        bin_value: BinValue,
    ) -> Self {
        Self {
            stats,
            bins,
            out_of_range_count,
            bin_value,
        }
    }

    /// Statistics over every coerced value, binned or not
    pub fn stats(&self) -> &HistogramStats {
        &self.stats
    }

    /// Get the bins
    pub fn bins(&self) -> &[BinSummary] {
        &self.bins
    }

    /// Get the number of bins
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// Check if the histogram has no bins
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Records whose value fell outside every bin
    pub fn out_of_range_count(&self) -> u64 {
        self.out_of_range_count
    }

    /// What the bin values represent
    pub fn bin_value(&self) -> BinValue {
        self.bin_value
    }

    /// Find which bin contains a given value
    ///
    /// Searches the reported `f64` ranges. Integer distributions with edges
    /// beyond 2^53 place values exactly while consuming; this lookup can
    /// only resolve to the rounded edges.
    pub fn find_bin(&self, value: f64) -> Option<usize> {
        self.bins.iter().position(|bin| bin.range.contains(value))
    }

    /// Get bin values as a vector
    pub fn values(&self) -> Vec<f64> {
        self.bins.iter().map(|bin| bin.value).collect()
    }

    /// Get bin labels as a vector
    pub fn labels(&self) -> Vec<&str> {
        self.bins.iter().map(|bin| bin.label.as_str()).collect()
    }

    /// Serialize to JSON
    pub fn to_json_string(&self) -> distrib_core::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for BinnedHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Histogram({} bins, {})", self.len(), self.stats)?;
        for bin in &self.bins {
            writeln!(f, "  {bin}")?;
        }
        if self.out_of_range_count > 0 {
            writeln!(f, "  out of range: {}", self.out_of_range_count)?;
        }
        Ok(())
    }
}

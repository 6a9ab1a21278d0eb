//! Per-bin statistics accumulators
//!
//! [`CountCollector`] tracks how many (value, count) pairs were accepted and
//! their total occurrence weight. [`StatsCollector`] wraps it and adds what
//! depends on the element type: the running `value * count` sum (through
//! the [`ElementStrategy`]), min and max.
//!
//! The subset mean is `sum / num_distinct_values`. The denominator is the
//! number of accepted pairs, not the occurrence weight: two pairs `(2, 3)`
//! and `(5, 1)` give a sum of 11 and a mean of 5.5.

use crate::types::HistogramStats;
use distrib_core::{ElementStrategy, NumericElement};

/// Value-agnostic accumulator of pair and weight counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountCollector {
    num_distinct_values: u64,
    total_weight: u64,
}

impl CountCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one value occurring `count` times
    pub fn accept(&mut self, count: u64) {
        self.num_distinct_values += 1;
        self.total_weight = self.total_weight.saturating_add(count);
    }

    /// Whether `accept` has been called
    pub fn is_data_present(&self) -> bool {
        self.num_distinct_values > 0
    }

    /// Number of accepted pairs
    pub fn num_distinct_values(&self) -> u64 {
        self.num_distinct_values
    }

    /// Sum of accepted counts
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Add another collector's counts to this one
    pub fn merge(&mut self, other: &Self) {
        self.num_distinct_values += other.num_distinct_values;
        self.total_weight = self.total_weight.saturating_add(other.total_weight);
    }

    /// Freeze into summary statistics without derived fields
    pub fn to_histogram_stats(&self, subset_entity_count: u64, missing_cases: u64) -> HistogramStats {
        HistogramStats::new(
            subset_entity_count,
            missing_cases,
            self.num_distinct_values,
            self.total_weight,
        )
    }
}

/// Accumulator with a typed running sum, min and max
#[derive(Debug, Clone)]
pub struct StatsCollector<S: ElementStrategy> {
    counts: CountCollector,
    sum: S::Sum,
    min: Option<S::Element>,
    max: Option<S::Element>,
    strategy: S,
}

impl<S: ElementStrategy> StatsCollector<S> {
    /// Create an empty collector for `strategy`'s element type
    pub fn new(strategy: S) -> Self {
        Self {
            counts: CountCollector::new(),
            sum: strategy.zero(),
            min: None,
            max: None,
            strategy,
        }
    }

    /// Record `value` occurring `count` times
    pub fn accept(&mut self, value: S::Element, count: u64) {
        self.counts.accept(count);
        self.sum = self.strategy.weighted_add(self.sum, value, count);
        if self.min.map_or(true, |min| value < min) {
            self.min = Some(value);
        }
        if self.max.map_or(true, |max| value > max) {
            self.max = Some(value);
        }
    }

    /// Whether `accept` has been called
    pub fn is_data_present(&self) -> bool {
        self.counts.is_data_present()
    }

    /// Pair and weight counts
    pub fn counts(&self) -> &CountCollector {
        &self.counts
    }

    /// Running `value * count` sum
    pub fn sum(&self) -> S::Sum {
        self.sum
    }

    /// Smallest accepted value
    pub fn min(&self) -> Option<S::Element> {
        self.min
    }

    /// Largest accepted value
    pub fn max(&self) -> Option<S::Element> {
        self.max
    }

    /// Add another collector's state to this one
    ///
    /// Counts, min and max merge exactly. Integer sums merge exactly until
    /// they saturate, so collectors filled from disjoint parts of a stream
    /// combine to the state of one collector fed the whole stream. Float
    /// sums depend on the order of addition and agree only up to rounding.
    pub fn merge(&mut self, other: &Self) {
        self.counts.merge(&other.counts);
        self.sum = self.strategy.combine(self.sum, other.sum);
        if let Some(min) = other.min {
            if self.min.map_or(true, |m| min < m) {
                self.min = Some(min);
            }
        }
        if let Some(max) = other.max {
            if self.max.map_or(true, |m| max > m) {
                self.max = Some(max);
            }
        }
    }

    /// Freeze into summary statistics
    ///
    /// Does not modify the collector; repeated calls give identical results.
    pub fn to_histogram_stats(&self, subset_entity_count: u64, missing_cases: u64) -> HistogramStats {
        let mut stats = self.counts.to_histogram_stats(subset_entity_count, missing_cases);
        if !self.is_data_present() {
            return stats;
        }
        let sum = self.strategy.sum_to_f64(self.sum);
        stats.set_subset_sum(sum);
        stats.set_subset_mean(sum / stats.num_distinct_values() as f64);
        if let (Some(min), Some(max)) = (self.min, self.max) {
            stats.set_subset_range(NumericElement::as_f64(min), NumericElement::as_f64(max));
        }
        stats
    }
}

impl<S: ElementStrategy + Default> Default for StatsCollector<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

//! The bin distribution engine
//!
//! A [`BinDistribution`] drains one record stream into per-bin collectors and
//! an overall collector, then freezes them into a [`BinnedHistogram`]. It is
//! single-use:
//!
//! ```text
//! Consuming --consume()--> Drained --finalize()--> Finalized
//! ```
//!
//! A stream failure during `consume()` also moves the engine to
//! `Finalized`. Calls in any other order fail with [`Error::State`].
//!
//! Records whose value cannot be coerced from the backing store are dropped
//! and counted as missing cases. Coerced values outside every bin still
//! count toward the overall statistics and are tallied as out of range.

use crate::bins::BinLayout;
use crate::collector::StatsCollector;
use crate::provider::{DistributionStreamProvider, StreamRecord};
use crate::spec::{DistributionConfig, NumberBinSpec, ValueSpec};
use crate::types::{BinSummary, BinnedHistogram};
use distrib_core::{ElementStrategy, Error, FloatStrategy, IntegerStrategy, Result};
use tracing::{debug, instrument, trace};

/// Lifecycle of a [`BinDistribution`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionState {
    /// Constructed, stream not yet read
    Consuming,
    /// Stream fully read, summary not yet built
    Drained,
    /// Summary built, or the stream failed
    Finalized,
}

/// Distribution over 64-bit integer values
pub type IntegerBinDistribution<P> = BinDistribution<P, IntegerStrategy>;

/// Distribution over 64-bit float values
pub type FloatBinDistribution<P> = BinDistribution<P, FloatStrategy>;

/// Running totals while a stream is drained
#[derive(Debug, Clone)]
struct Accumulator<S: ElementStrategy> {
    bins: Vec<StatsCollector<S>>,
    overall: StatsCollector<S>,
    records: u64,
    missing_cases: u64,
    out_of_range: u64,
}

impl<S: ElementStrategy> Accumulator<S> {
    fn new(num_bins: usize, strategy: &S) -> Self {
        Self {
            bins: vec![StatsCollector::new(strategy.clone()); num_bins],
            overall: StatsCollector::new(strategy.clone()),
            records: 0,
            missing_cases: 0,
            out_of_range: 0,
        }
    }

    fn ingest(
        &mut self,
        layout: &BinLayout<S::Element>,
        strategy: &S,
        column: &str,
        record: StreamRecord,
    ) -> Result<()> {
        self.records += 1;

        let value = match strategy.coerce(column, &record.value, record.source) {
            Ok(value) => value,
            Err(e) if e.is_recoverable_data_error() => {
                trace!(value = %record.value, error = %e, "dropping record");
                self.missing_cases += 1;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        match layout.locate(value) {
            Some(index) => self.bins[index].accept(value, record.count),
            None => {
                trace!(?value, "value outside bin range");
                self.out_of_range += 1;
            }
        }
        self.overall.accept(value, record.count);
        Ok(())
    }
}

/// Streams (value, count) records into numeric bins
#[derive(Debug)]
pub struct BinDistribution<P, S: ElementStrategy = IntegerStrategy> {
    provider: P,
    value_spec: ValueSpec,
    layout: BinLayout<S::Element>,
    strategy: S,
    acc: Accumulator<S>,
    state: DistributionState,
}

impl<P, S> BinDistribution<P, S>
where
    P: DistributionStreamProvider,
    S: ElementStrategy + Default,
{
    /// Create a distribution, validating both specs
    pub fn new(provider: P, value_spec: ValueSpec, bin_spec: &NumberBinSpec) -> Result<Self> {
        Self::with_strategy(provider, value_spec, bin_spec, S::default())
    }

    /// Create a distribution from a loaded configuration
    pub fn from_config(provider: P, config: &DistributionConfig) -> Result<Self> {
        Self::new(provider, config.value_spec, &config.bin_spec)
    }
}

impl<P, S> BinDistribution<P, S>
where
    P: DistributionStreamProvider,
    S: ElementStrategy,
{
    /// Create a distribution with an explicit strategy instance
    pub fn with_strategy(
        provider: P,
        value_spec: ValueSpec,
        bin_spec: &NumberBinSpec,
        strategy: S,
    ) -> Result<Self> {
        if value_spec.value_type != strategy.value_type() {
            return Err(Error::Configuration(format!(
                "value type {:?} does not match {:?} distribution",
                value_spec.value_type,
                strategy.value_type()
            )));
        }
        let layout = BinLayout::new(bin_spec, &strategy)?;
        let acc = Accumulator::new(layout.len(), &strategy);

        Ok(Self {
            provider,
            value_spec,
            layout,
            strategy,
            acc,
            state: DistributionState::Consuming,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> DistributionState {
        self.state
    }

    /// The validated bin layout
    pub fn layout(&self) -> &BinLayout<S::Element> {
        &self.layout
    }

    /// The value spec supplied at construction
    pub fn value_spec(&self) -> &ValueSpec {
        &self.value_spec
    }

    /// Records with an uncoercible value so far
    pub fn missing_cases(&self) -> u64 {
        self.acc.missing_cases
    }

    /// Read the whole stream into the collectors
    #[instrument(skip_all, fields(column = %self.provider.column_name()))]
    pub fn consume(&mut self) -> Result<()> {
        if self.state != DistributionState::Consuming {
            return Err(Error::out_of_order("consume", self.state));
        }
        // Stays finalized if the stream fails part way
        self.state = DistributionState::Finalized;

        let column = self.provider.column_name().to_string();
        debug!(bins = self.layout.len(), "consuming stream");

        let acc = &mut self.acc;
        for record in self.provider.records()? {
            acc.ingest(&self.layout, &self.strategy, &column, record?)?;
        }

        debug!(
            records = acc.records,
            missing = acc.missing_cases,
            out_of_range = acc.out_of_range,
            "stream drained"
        );
        self.state = DistributionState::Drained;
        Ok(())
    }

    /// Freeze every collector into the final histogram
    #[instrument(skip_all)]
    pub fn finalize(&mut self) -> Result<BinnedHistogram> {
        if self.state != DistributionState::Drained {
            return Err(Error::out_of_order("finalize", self.state));
        }
        self.state = DistributionState::Finalized;

        let subset_entity_count = self.provider.subset_entity_count()?;
        let missing_cases = self.acc.missing_cases;
        let bin_value = self.value_spec.bin_value;

        let binned_weight = self
            .acc
            .bins
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.counts().total_weight()));

        let bins = self
            .layout
            .ranges()
            .zip(self.layout.labels())
            .zip(&self.acc.bins)
            .map(|((range, label), collector)| {
                let stats = collector.to_histogram_stats(subset_entity_count, missing_cases);
                let value = bin_value.evaluate(stats.total_weight(), binned_weight);
                BinSummary::new(range, label, value, stats)
            })
            .collect();

        let stats = self
            .acc
            .overall
            .to_histogram_stats(subset_entity_count, missing_cases);

        debug!(
            subset_entity_count,
            distinct = stats.num_distinct_values(),
            "histogram finalized"
        );
        Ok(BinnedHistogram::new(stats, bins, self.acc.out_of_range, bin_value))
    }

    /// Consume the stream and build the histogram in one step
    pub fn into_histogram(mut self) -> Result<BinnedHistogram> {
        self.consume()?;
        self.finalize()
    }
}

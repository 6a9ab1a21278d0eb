//! Streaming binned distributions with per-bin summary statistics
//!
//! This crate turns a stream of `(value, occurrence count)` records into a
//! histogram. Each record is coerced into the distribution's element type,
//! placed into a numeric bin, and folded into that bin's statistics and into
//! statistics over the whole subset. Records whose value cannot be read
//! are counted as missing cases rather than aborting the computation.
//!
//! # Key Features
//!
//! - **Fixed-width or explicit bins**: [`NumberBinSpec`] validated up front
//! - **Typed accumulation**: integer and float distributions share one engine
//!   through [`ElementStrategy`](distrib_core::ElementStrategy)
//! - **Missing-case accounting**: bad records are tallied, not fatal
//! - **JSON configuration and streams**: [`DistributionConfig`],
//!   [`JsonLinesStreamProvider`]
//!
//! # Examples
//!
//! ```rust
//! use distrib_histogram::{IntegerBinDistribution, NumberBinSpec, ValueSpec, VecStreamProvider};
//! use distrib_core::RawValue;
//!
//! let provider = VecStreamProvider::from_pairs(
//!     "age",
//!     10,
//!     vec![(RawValue::from(1), 3), (RawValue::from(7), 2), (RawValue::from("x"), 1)],
//! );
//! let bins = NumberBinSpec::fixed_width(0, 10, 5);
//!
//! let histogram = IntegerBinDistribution::new(provider, ValueSpec::integer(), &bins)
//!     .unwrap()
//!     .into_histogram()
//!     .unwrap();
//!
//! assert_eq!(histogram.labels(), vec!["[0, 5)", "[5, 10]"]);
//! assert_eq!(histogram.stats().missing_cases(), 1);
//! assert_eq!(histogram.stats().subset_mean(), Some(8.5));
//! ```

pub mod bins;
pub mod collector;
pub mod distribution;
pub mod provider;
pub mod spec;
pub mod types;

// Re-export main types
pub use bins::{BinLayout, BinRange, MAX_BINS};
pub use collector::{CountCollector, StatsCollector};
pub use distribution::{BinDistribution, DistributionState, FloatBinDistribution, IntegerBinDistribution};
pub use provider::{
    DistributionStreamProvider, JsonLinesStreamProvider, RecordStream, StreamRecord, VecStreamProvider,
};
pub use spec::{BinValue, DistributionConfig, NumberBinSpec, ValueSpec};
pub use types::{BinSummary, BinnedHistogram, HistogramStats};

pub use distrib_core::{Result, ValueType};

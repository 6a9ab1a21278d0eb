//! Binned numeric distributions
//!
//! Umbrella crate re-exporting the workspace crates:
//!
//! - [`distrib_core`]: errors, raw values, element strategies
//! - [`distrib_histogram`]: bin specs, collectors and the distribution engine
//!
//! # Example
//!
//! ```rust
//! use distrib_stats::prelude::*;
//!
//! let provider = VecStreamProvider::from_pairs("score", 6, [(2, 3), (5, 1)]);
//! let bins = NumberBinSpec::boundaries([0, 10]);
//! let histogram = IntegerBinDistribution::new(provider, ValueSpec::integer(), &bins)
//!     .unwrap()
//!     .into_histogram()
//!     .unwrap();
//!
//! // Mean divides by the number of distinct values, not the weight
//! assert_eq!(histogram.stats().subset_mean(), Some(5.5));
//! ```

pub use distrib_core;
pub use distrib_histogram;

/// Prelude module for convenient imports
pub mod prelude {
    pub use distrib_core::{
        ElementStrategy, Error, FloatStrategy, IntegerStrategy, RawValue, Result, ValueSource,
        ValueType,
    };
    pub use distrib_histogram::{
        BinDistribution, BinValue, BinnedHistogram, DistributionConfig, DistributionStreamProvider,
        FloatBinDistribution, HistogramStats, IntegerBinDistribution, NumberBinSpec, StreamRecord,
        ValueSpec, VecStreamProvider,
    };
}

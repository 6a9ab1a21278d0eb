//! Shared helpers for distribution integration tests

#![allow(dead_code)]

use distrib_core::{Error, RawValue, Result};
use distrib_histogram::{DistributionStreamProvider, RecordStream, StreamRecord, VecStreamProvider};

/// Install a test subscriber so `RUST_LOG=trace` shows engine logs
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Provider over `(value, count)` pairs with the given subset size
pub fn pairs<V: Into<RawValue>>(subset: u64, pairs: Vec<(V, u64)>) -> VecStreamProvider {
    VecStreamProvider::from_pairs("value_col", subset, pairs)
}

/// Provider whose stream or subset count can be made to fail
pub struct FailingProvider {
    records: Vec<StreamRecord>,
    fail_stream: bool,
    fail_subset_count: bool,
}

impl FailingProvider {
    /// Yields `records`, then an I/O error
    pub fn stream_fails_after(records: Vec<StreamRecord>) -> Self {
        Self {
            records,
            fail_stream: true,
            fail_subset_count: false,
        }
    }

    /// Yields `records` normally but cannot report the subset size
    pub fn subset_count_fails(records: Vec<StreamRecord>) -> Self {
        Self {
            records,
            fail_stream: false,
            fail_subset_count: true,
        }
    }
}

impl DistributionStreamProvider for FailingProvider {
    fn column_name(&self) -> &str {
        "value_col"
    }

    fn subset_entity_count(&self) -> Result<u64> {
        if self.fail_subset_count {
            Err(anyhow::anyhow!("count query timed out").into())
        } else {
            Ok(100)
        }
    }

    fn records(&mut self) -> Result<RecordStream<'_>> {
        let failure: Option<Result<StreamRecord>> = self.fail_stream.then(|| {
            Err(Error::from(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            )))
        });
        let records = std::mem::take(&mut self.records)
            .into_iter()
            .map(Ok)
            .chain(failure);
        Ok(Box::new(records))
    }
}

//! Sources of (value, count) records
//!
//! A [`DistributionStreamProvider`] yields a finite, single-pass sequence of
//! [`StreamRecord`]s and knows the size of the subset the records describe.
//! Per-record failures are `Err` items of the stream and abort the whole
//! computation; values that merely fail coercion are not errors here.

use distrib_core::{Error, RawValue, Result, ValueSource};
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// One distinct value and how often it occurs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamRecord {
    /// Untyped value
    pub value: RawValue,
    /// Occurrence count
    pub count: u64,
    /// Where the value came from
    #[serde(default)]
    pub source: ValueSource,
}

impl StreamRecord {
    /// Create a record sourced from the backing store
    pub fn new(value: impl Into<RawValue>, count: u64) -> Self {
        Self {
            value: value.into(),
            count,
            source: ValueSource::Db,
        }
    }

    /// Mark the record with a different source
    pub fn with_source(mut self, source: ValueSource) -> Self {
        self.source = source;
        self
    }
}

/// Boxed record stream borrowed from a provider
pub type RecordStream<'a> = Box<dyn Iterator<Item = Result<StreamRecord>> + 'a>;

/// Supplier of the records a distribution bins
pub trait DistributionStreamProvider {
    /// Name of the column the values come from, used in error messages
    fn column_name(&self) -> &str;

    /// Number of entities in the subset under analysis
    fn subset_entity_count(&self) -> Result<u64>;

    /// Open the record stream
    ///
    /// Providers may refuse to open the stream more than once.
    fn records(&mut self) -> Result<RecordStream<'_>>;
}

/// In-memory provider
#[derive(Debug, Clone)]
pub struct VecStreamProvider {
    column: String,
    subset_entity_count: u64,
    records: Vec<StreamRecord>,
}

impl VecStreamProvider {
    /// Create a provider over `records`
    pub fn new(column: impl Into<String>, subset_entity_count: u64, records: Vec<StreamRecord>) -> Self {
        Self {
            column: column.into(),
            subset_entity_count,
            records,
        }
    }

    /// Create a provider from `(value, count)` pairs sourced from the store
    pub fn from_pairs<V, I>(column: impl Into<String>, subset_entity_count: u64, pairs: I) -> Self
    where
        V: Into<RawValue>,
        I: IntoIterator<Item = (V, u64)>,
    {
        let records = pairs
            .into_iter()
            .map(|(value, count)| StreamRecord::new(value, count))
            .collect();
        Self::new(column, subset_entity_count, records)
    }

    /// Records not yet handed out
    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

impl DistributionStreamProvider for VecStreamProvider {
    fn column_name(&self) -> &str {
        &self.column
    }

    fn subset_entity_count(&self) -> Result<u64> {
        Ok(self.subset_entity_count)
    }

    fn records(&mut self) -> Result<RecordStream<'_>> {
        Ok(Box::new(std::mem::take(&mut self.records).into_iter().map(Ok)))
    }
}

/// Provider reading one JSON record per line
///
/// Each non-blank line is an object `{"value": <any>, "count": <u64>}` with
/// an optional `"source"`. Read errors and malformed lines fail the stream.
#[derive(Debug)]
pub struct JsonLinesStreamProvider<R> {
    column: String,
    subset_entity_count: u64,
    reader: Option<R>,
}

impl<R: BufRead> JsonLinesStreamProvider<R> {
    /// Create a provider over `reader`
    pub fn new(column: impl Into<String>, subset_entity_count: u64, reader: R) -> Self {
        Self {
            column: column.into(),
            subset_entity_count,
            reader: Some(reader),
        }
    }
}

impl<R: BufRead> DistributionStreamProvider for JsonLinesStreamProvider<R> {
    fn column_name(&self) -> &str {
        &self.column
    }

    fn subset_entity_count(&self) -> Result<u64> {
        Ok(self.subset_entity_count)
    }

    fn records(&mut self) -> Result<RecordStream<'_>> {
        let reader = self
            .reader
            .take()
            .ok_or_else(|| Error::Stream(format!("stream for {} already consumed", self.column)))?;

        let records = reader.lines().enumerate().filter_map(|(i, line)| match line {
            Err(e) => Some(Err(Error::from(e))),
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(
                serde_json::from_str::<StreamRecord>(&line)
                    .map_err(|e| Error::Stream(format!("line {}: {e}", i + 1))),
            ),
        });
        Ok(Box::new(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_vec_provider_is_single_pass() {
        let mut provider = VecStreamProvider::from_pairs("age", 5, [(1, 3), (7, 2)]);
        assert_eq!(provider.column_name(), "age");
        assert_eq!(provider.subset_entity_count().unwrap(), 5);

        let records: Vec<_> = provider.records().unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(records, vec![StreamRecord::new(1, 3), StreamRecord::new(7, 2)]);
        assert_eq!(provider.remaining(), 0);
        assert_eq!(provider.records().unwrap().count(), 0);
    }

    #[test]
    fn test_json_lines_provider() {
        let input = "{\"value\": 1, \"count\": 3}\n\n{\"value\": \"x\", \"count\": 1, \"source\": \"derived\"}\n";
        let mut provider = JsonLinesStreamProvider::new("age", 4, Cursor::new(input));

        let records: Vec<_> = provider.records().unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], StreamRecord::new(1, 3));
        assert_eq!(records[1].value, RawValue::Text("x".to_string()));
        assert_eq!(records[1].source, ValueSource::Derived);

        assert!(matches!(provider.records(), Err(Error::Stream(_))));
    }

    #[test]
    fn test_json_lines_malformed_line_fails_stream() {
        let input = "{\"value\": 1, \"count\": 3}\nnot json\n";
        let mut provider = JsonLinesStreamProvider::new("age", 4, Cursor::new(input));

        let results: Vec<_> = provider.records().unwrap().collect();
        assert!(results[0].is_ok());
        match &results[1] {
            Err(Error::Stream(msg)) => assert!(msg.starts_with("line 2:")),
            other => panic!("expected stream error, got {other:?}"),
        }
    }
}

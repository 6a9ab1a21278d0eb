//! Validated bin layouts and bin lookup
//!
//! A [`BinLayout`] is a strictly increasing list of edges in the
//! distribution's element type. Bins are half-open `[start, end)` except the
//! last one, which also includes its right edge. A value equal to an
//! interior edge therefore belongs to the bin that starts at that edge.
//!
//! Integer layouts compare `i64` edges directly, so placement is exact even
//! where neighbouring integers share an `f64` representation.

use crate::spec::NumberBinSpec;
use distrib_core::{ElementStrategy, Error, NumericElement, RawValue, Result, ValueSource};
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Upper limit on the number of bins a spec may produce
pub const MAX_BINS: usize = 100_000;

/// A contiguous numeric range
///
/// Edges are reported as `f64`. Integer edges beyond 2^53 are rounded here;
/// the bin label produced by [`BinLayout::label`] keeps them exact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinRange {
    /// Left edge (inclusive)
    pub start: f64,
    /// Right edge (exclusive unless `closed`)
    pub end: f64,
    /// Whether the right edge is included (last bin only)
    pub closed: bool,
}

impl BinRange {
    /// Create a half-open range
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            closed: false,
        }
    }

    /// Get the width of the bin
    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    /// Get the center point of the bin
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    /// Check if a value falls within this bin
    pub fn contains(&self, value: f64) -> bool {
        value >= self.start && (value < self.end || (self.closed && value == self.end))
    }

    /// Display label, e.g. `[0, 5)`
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BinRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_interval(f, self.start, self.end, self.closed)
    }
}

fn write_interval<T: fmt::Display>(
    f: &mut impl fmt::Write,
    start: T,
    end: T,
    closed: bool,
) -> fmt::Result {
    let close = if closed { ']' } else { ')' };
    write!(f, "[{start}, {end}{close}")
}

/// Validated, immutable bin edges
#[derive(Debug, Clone, PartialEq)]
pub struct BinLayout<T = f64> {
    edges: Vec<T>,
}

impl<T: NumericElement> BinLayout<T> {
    /// Build a layout from a spec, coercing its parameters with `strategy`
    ///
    /// Spec parameters are configuration input, so coercion failures are
    /// reported as invalid arguments naming the parameter.
    pub fn new<S>(spec: &NumberBinSpec, strategy: &S) -> Result<Self>
    where
        S: ElementStrategy<Element = T>,
    {
        let layout = match spec {
            NumberBinSpec::FixedWidth {
                range_min,
                range_max,
                bin_width,
            } => {
                let min = strategy.coerce("range_min", range_min, ValueSource::Config)?;
                let max = strategy.coerce("range_max", range_max, ValueSource::Config)?;
                let width = strategy.coerce("bin_width", bin_width, ValueSource::Config)?;
                Self::fixed_width(min, max, width)?
            }
            NumberBinSpec::Boundaries { edges } => {
                let edges = edges
                    .iter()
                    .enumerate()
                    .map(|(i, raw)| config_edge(strategy, i, raw))
                    .collect::<Result<Vec<_>>>()?;
                Self::from_edges(edges)?
            }
        };
        debug!(
            bins = layout.len(),
            min = %layout.min(),
            max = %layout.max(),
            "built bin layout"
        );
        Ok(layout)
    }

    /// Equal-width bins over `[min, max]`, the last one ending at `max`
    pub fn fixed_width(min: T, max: T, width: T) -> Result<Self> {
        for (name, value) in [("range_min", min), ("range_max", max), ("bin_width", width)] {
            if !value.is_finite() {
                return Err(Error::non_finite(name));
            }
        }
        if width <= <T as Zero>::zero() {
            return Err(Error::invalid_spec("bin_width", format!("must be positive, got {width}")));
        }
        if max <= min {
            return Err(Error::invalid_spec(
                "range_max",
                format!("must be greater than range_min ({max} <= {min})"),
            ));
        }

        let num_bins = min
            .steps_to(max, width)
            .filter(|&n| n <= MAX_BINS)
            .ok_or_else(|| {
                Error::invalid_spec("bin_width", format!("produces more than {MAX_BINS} bins"))
            })?;

        let mut edges: Vec<T> = Vec::with_capacity(num_bins + 1);
        for i in 0..num_bins {
            let Some(edge) = min.offset(width, i) else {
                break;
            };
            if edge >= max {
                break;
            }
            // Float rounding far from zero can repeat an edge
            if edges.last().map_or(false, |&last| edge <= last) {
                continue;
            }
            edges.push(edge);
        }
        // Ensure last bin ends at max
        edges.push(max);

        Ok(Self { edges })
    }

    /// Bins from explicit edges
    pub fn from_edges(edges: Vec<T>) -> Result<Self> {
        if edges.len() < 2 {
            return Err(Error::invalid_spec(
                "edges",
                format!("need at least 2 edges, got {}", edges.len()),
            ));
        }
        if edges.len() - 1 > MAX_BINS {
            return Err(Error::invalid_spec("edges", format!("more than {MAX_BINS} bins")));
        }
        if edges.iter().any(|e| !e.is_finite()) {
            return Err(Error::non_finite("edges"));
        }
        if let Some(i) = edges.windows(2).position(|w| w[0] >= w[1]) {
            return Err(Error::invalid_spec(
                "edges",
                format!(
                    "must be strictly increasing ({} >= {} at index {})",
                    edges[i],
                    edges[i + 1],
                    i + 1
                ),
            ));
        }
        Ok(Self { edges })
    }

    /// Get the number of bins
    pub fn len(&self) -> usize {
        self.edges.len() - 1
    }

    /// Always false: a valid layout has at least one bin
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Get bin edges (including rightmost edge)
    pub fn edges(&self) -> &[T] {
        &self.edges
    }

    /// Left edge of the first bin
    pub fn min(&self) -> T {
        self.edges[0]
    }

    /// Right edge of the last bin
    pub fn max(&self) -> T {
        self.edges[self.edges.len() - 1]
    }

    /// Range of bin `index`
    pub fn range(&self, index: usize) -> Option<BinRange> {
        if index >= self.len() {
            return None;
        }
        Some(BinRange {
            start: self.edges[index].as_f64(),
            end: self.edges[index + 1].as_f64(),
            closed: index == self.len() - 1,
        })
    }

    /// All bin ranges in order
    pub fn ranges(&self) -> impl Iterator<Item = BinRange> + '_ {
        (0..self.len()).filter_map(move |i| self.range(i))
    }

    /// Label of bin `index` printed from the exact edges, e.g. `[0, 5)`
    pub fn label(&self, index: usize) -> Option<String> {
        if index >= self.len() {
            return None;
        }
        let mut label = String::new();
        write_interval(
            &mut label,
            self.edges[index],
            self.edges[index + 1],
            index == self.len() - 1,
        )
        .ok()?;
        Some(label)
    }

    /// All bin labels in order
    pub fn labels(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.len()).filter_map(move |i| self.label(i))
    }

    /// Find which bin contains a given value
    ///
    /// Returns `None` for values outside `[min, max]` and for NaN.
    pub fn locate(&self, value: T) -> Option<usize> {
        if !(value >= self.min() && value <= self.max()) {
            return None;
        }
        // Last bin includes right boundary
        if value == self.max() {
            return Some(self.len() - 1);
        }
        // First edge strictly greater than value closes the bin
        Some(self.edges.partition_point(|&e| e <= value) - 1)
    }
}

fn config_edge<S: ElementStrategy>(strategy: &S, index: usize, raw: &RawValue) -> Result<S::Element> {
    strategy.coerce(&format!("edges[{index}]"), raw, ValueSource::Config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use distrib_core::{FloatStrategy, IntegerStrategy};
    use proptest::prelude::*;

    #[test]
    fn test_bin_range() {
        let range = BinRange::new(0.0, 5.0);
        assert_eq!(range.center(), 2.5);
        assert_eq!(range.width(), 5.0);
        assert!(range.contains(0.0));
        assert!(range.contains(4.999));
        assert!(!range.contains(5.0)); // Right edge is exclusive
        assert_eq!(range.label(), "[0, 5)");

        let last = BinRange { closed: true, ..range };
        assert!(last.contains(5.0));
        assert_eq!(last.label(), "[0, 5]");
    }

    #[test]
    fn test_fixed_width_layout() {
        let layout = BinLayout::fixed_width(0.0, 10.0, 5.0).unwrap();
        assert_eq!(layout.edges(), &[0.0, 5.0, 10.0]);
        assert_eq!(layout.len(), 2);

        // Last bin is narrower when the width does not divide the range
        let layout = BinLayout::fixed_width(0.0, 10.0, 4.0).unwrap();
        assert_eq!(layout.edges(), &[0.0, 4.0, 8.0, 10.0]);
        assert_eq!(layout.range(2).unwrap().width(), 2.0);
    }

    #[test]
    fn test_fixed_width_float_steps_stay_increasing() {
        let layout = BinLayout::fixed_width(0.0, 0.3, 0.1).unwrap();
        assert!(layout.edges().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(layout.max(), 0.3);
    }

    #[test]
    fn test_invalid_layouts() {
        assert!(matches!(BinLayout::fixed_width(0.0, 10.0, 0.0), Err(Error::Configuration(_))));
        assert!(matches!(BinLayout::fixed_width(0.0, 10.0, -1.0), Err(Error::Configuration(_))));
        assert!(matches!(BinLayout::fixed_width(10.0, 10.0, 1.0), Err(Error::Configuration(_))));
        assert!(matches!(BinLayout::fixed_width(0.0, f64::NAN, 1.0), Err(Error::Configuration(_))));
        assert!(matches!(BinLayout::fixed_width(0.0, 1e12, 1.0), Err(Error::Configuration(_))));
        assert!(matches!(BinLayout::from_edges(vec![1.0]), Err(Error::Configuration(_))));
        assert!(matches!(BinLayout::from_edges(vec![0.0, 5.0, 5.0]), Err(Error::Configuration(_))));
        assert!(matches!(BinLayout::from_edges(vec![0.0, 5.0, 3.0]), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_spec_coercion_uses_config_errors() {
        let spec = NumberBinSpec::fixed_width(0, "ten", 5);
        let err = BinLayout::new(&spec, &IntegerStrategy).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { ref field, .. } if field == "range_max"));

        let spec = NumberBinSpec::boundaries([RawValue::from(0), RawValue::from("x")]);
        let err = BinLayout::new(&spec, &FloatStrategy).unwrap_err();
        assert_eq!(err.to_string(), "edges[1] must be a number value.");
    }

    #[test]
    fn test_integer_spec_truncates_numeric_parameters() {
        // Numeric config values are converted, not rejected
        let spec = NumberBinSpec::fixed_width(0, 10, 2.5);
        let layout = BinLayout::new(&spec, &IntegerStrategy).unwrap();
        assert_eq!(layout.edges(), &[0, 2, 4, 6, 8, 10]);
        assert_eq!(layout.label(4).as_deref(), Some("[8, 10]"));
    }

    #[test]
    fn test_fixed_width_skips_edges_lost_to_rounding() {
        // Doubles near 1e16 are 2 apart, so unit steps repeat edges
        let layout = BinLayout::fixed_width(1e16, 1e16 + 4.0, 1.0).unwrap();
        assert!(layout.edges().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(layout.min(), 1e16);
        assert_eq!(layout.max(), 1e16 + 4.0);
        assert!(layout.ranges().all(|r| r.width() > 0.0));
        assert!(layout.labels().all(|label| label != "[10000000000000000, 10000000000000000)"));
    }

    #[test]
    fn test_integer_edges_beyond_f64_precision() {
        const TWO_53: i64 = 1 << 53;

        let layout = BinLayout::from_edges(vec![0, TWO_53 + 1, TWO_53 + 3]).unwrap();
        assert_eq!(layout.locate(TWO_53), Some(0));
        assert_eq!(layout.locate(TWO_53 + 1), Some(1));
        assert_eq!(layout.locate(TWO_53 + 3), Some(1));
        assert_eq!(layout.locate(TWO_53 + 4), None);

        // Equal as f64, distinct as i64
        let spec = NumberBinSpec::boundaries([0, TWO_53, TWO_53 + 1]);
        let layout = BinLayout::new(&spec, &IntegerStrategy).unwrap();
        assert_eq!(layout.len(), 2);
        assert_eq!(layout.locate(TWO_53), Some(1));
        assert_eq!(layout.label(1).as_deref(), Some("[9007199254740992, 9007199254740993]"));
    }

    #[test]
    fn test_integer_fixed_width_at_extremes() {
        let layout = BinLayout::fixed_width(i64::MAX - 10, i64::MAX, 4).unwrap();
        assert_eq!(layout.edges(), &[i64::MAX - 10, i64::MAX - 6, i64::MAX - 2, i64::MAX]);
        assert_eq!(layout.locate(i64::MAX), Some(2));

        assert!(matches!(BinLayout::fixed_width(i64::MIN, i64::MAX, 1), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_locate_boundaries() {
        let layout = BinLayout::from_edges(vec![0.0, 5.0, 10.0]).unwrap();

        assert_eq!(layout.locate(-1.0), None);
        assert_eq!(layout.locate(0.0), Some(0));
        assert_eq!(layout.locate(4.0), Some(0));
        // Interior edge belongs to the bin that starts there
        assert_eq!(layout.locate(5.0), Some(1));
        assert_eq!(layout.locate(6.0), Some(1));
        // Right edge of the last bin is included
        assert_eq!(layout.locate(10.0), Some(1));
        assert_eq!(layout.locate(11.0), None);
        assert_eq!(layout.locate(f64::NAN), None);
    }

    proptest! {
        #[test]
        fn prop_locate_agrees_with_linear_scan(
            edges in prop::collection::btree_set(-1000i32..1000, 2..20),
            value in -1100.0f64..1100.0,
        ) {
            let edges: Vec<f64> = edges.into_iter().map(f64::from).collect();
            let layout = BinLayout::from_edges(edges).unwrap();
            let linear = layout.ranges().position(|r| r.contains(value));
            prop_assert_eq!(layout.locate(value), linear);
        }

        #[test]
        fn prop_integer_locate_agrees_with_exact_scan(
            edges in prop::collection::btree_set(any::<i64>(), 2..20),
            offset in -3i64..=3,
            pick in any::<prop::sample::Index>(),
        ) {
            let edges: Vec<i64> = edges.into_iter().collect();
            let value = pick.get(&edges).saturating_add(offset);
            let layout = BinLayout::from_edges(edges.clone()).unwrap();

            let last = edges.len() - 2;
            let linear = (0..=last).position(|i| {
                edges[i] <= value && (value < edges[i + 1] || (i == last && value == edges[i + 1]))
            });
            prop_assert_eq!(layout.locate(value), linear);
        }

        #[test]
        fn prop_fixed_width_edges_strictly_increase(
            min in -1e17f64..1e17,
            span in 1.0f64..1e3,
            width in 0.5f64..10.0,
        ) {
            prop_assume!(min + span > min);
            let layout = BinLayout::fixed_width(min, min + span, width).unwrap();
            prop_assert!(layout.edges().windows(2).all(|w| w[0] < w[1]));
            prop_assert_eq!(layout.max(), min + span);
        }
    }
}

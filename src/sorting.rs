//! Deterministic row ordering for finalized report tables.
//!
//! One comparator serves single-account and merged multi-account tables:
//! time bucket ascending in calendar order, then the report's volume metric
//! descending, then the full dimension tuple ascending. Buckets arrive as
//! ISO start-date strings for every granularity except year, which is a
//! plain integer and compares numerically.

use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::canonical::Scalar;
use crate::dates::parse_supported_date;
use crate::reports::{ReportKind, ToggleSet};

/// Column positions the comparator reads from each row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortSpec {
    /// Leading dimension columns; column 0 is the time bucket.
    pub dimension_count: usize,
    /// Index of the volume metric column.
    pub volume_index: usize,
}

impl SortSpec {
    /// Positions for `kind` under `toggles`, matching the aggregated layout.
    pub fn for_report(kind: ReportKind, toggles: &ToggleSet) -> Self {
        let dimension_count = kind.selected_dimensions(toggles).len();
        let volume = kind.volume_metric();
        let volume_index = kind
            .metric_columns()
            .iter()
            .position(|column| column.id == volume)
            .map_or(dimension_count, |offset| dimension_count + offset);
        SortSpec {
            dimension_count,
            volume_index,
        }
    }
}

/// Sort `rows` in place: bucket ascending, volume descending, dimensions
/// ascending.
pub fn sort_rows(rows: &mut [Vec<Scalar>], spec: SortSpec) {
    rows.sort_by(|a, b| compare_rows(a, b, spec));
}

fn compare_rows(a: &[Scalar], b: &[Scalar], spec: SortSpec) -> Ordering {
    bucket_ordering(a.first(), b.first())
        .then_with(|| volume_of(b, spec).cmp(&volume_of(a, spec)))
        .then_with(|| dimension_tuple(a, spec).cmp(dimension_tuple(b, spec)))
}

/// Calendar order for time bucket cells.
///
/// Integer buckets (years) compare numerically. Text buckets compare by
/// parsed start date when both sides parse, else lexicographically, which
/// keeps `UNDEFINED` buckets grouped after dated ones.
fn bucket_ordering(a: Option<&Scalar>, b: Option<&Scalar>) -> Ordering {
    match (a, b) {
        (Some(Scalar::Int(x)), Some(Scalar::Int(y))) => x.cmp(y),
        (Some(Scalar::Text(x)), Some(Scalar::Text(y))) => {
            match (parse_supported_date(x), parse_supported_date(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(x), Some(y)) => x.cmp(y),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
    }
}

fn volume_of(row: &[Scalar], spec: SortSpec) -> Decimal {
    row.get(spec.volume_index)
        .and_then(Scalar::as_decimal)
        .unwrap_or(Decimal::ZERO)
}

fn dimension_tuple(row: &[Scalar], spec: SortSpec) -> &[Scalar] {
    let end = spec.dimension_count.min(row.len());
    &row[..end]
}

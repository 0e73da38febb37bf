#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Account directory loading, lookup, and id normalization.
pub mod accounts;
/// Grouping fold and metric finalization.
pub mod aggregate;
/// Per-account audit listings: labels, campaign groups, assignments.
pub mod audit;
/// Canonical records and the per-report normalizers.
pub mod canonical;
/// Command-line entry point and interactive resolution.
pub mod cli;
/// Centralized constants used across normalization, money, and output.
pub mod constants;
/// Reporting windows, date presets, and time segmentation.
pub mod dates;
/// Coded-field decoding for enum-valued source columns.
pub mod enums;
/// Fixed-point conversion and quantization helpers.
pub mod money;
/// CSV export and aligned text rendering.
pub mod output;
/// Report orchestration: single-account runs and multi-account fan-out.
pub mod pipeline;
/// Interactive prompt session and menus.
pub mod prompt;
/// Query catalog: the GAQL text issued per report kind.
pub mod query;
/// Raw field-path records as delivered by a source.
pub mod record;
/// Report catalog: kinds, scopes, toggles, and layout tables.
pub mod reports;
/// Deterministic row ordering.
pub mod sorting;
/// Record source trait and the in-memory store.
pub mod source;
/// Shared type aliases.
pub mod types;

mod errors;

pub use accounts::{Account, AccountScope};
pub use canonical::{CanonicalRecord, DimensionId, MetricId, Scalar};
pub use dates::{DateRange, TimeSegment};
pub use errors::ReportError;
pub use output::OutputMode;
pub use pipeline::{run_report, run_report_all, AccountRunStats, ReportRequest, ReportTable};
pub use reports::{ReportKind, ReportScope, Toggle, ToggleSet};
pub use source::{InMemorySource, RecordQuery, RecordSource};

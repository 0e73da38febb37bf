use std::io;

use thiserror::Error;

use crate::types::CustomerId;

/// Error type for report construction, argument resolution, and delivery failures.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("record source unavailable for account '{customer_id}': {reason}")]
    SourceUnavailable {
        customer_id: CustomerId,
        reason: String,
    },
    #[error("record is missing dimension '{dimension}' required by the '{report}' report")]
    MissingDimension {
        report: &'static str,
        dimension: &'static str,
    },
    #[error("record is missing metric '{metric}' required by the '{report}' report")]
    MissingMetric {
        report: &'static str,
        metric: &'static str,
    },
    #[error("unsupported date '{input}': expected YYYY-MM-DD or YYYYMMDD")]
    InvalidDate { input: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("configuration error: {0}")]
    Configuration(String),
}

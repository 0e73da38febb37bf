//! Record source interface and the in-memory implementation.
//!
//! Ownership model:
//! - `RecordSource` is the pipeline-facing seam that produces raw rows; the
//!   engine itself performs no I/O.
//! - Sources own the rows they return; the pipeline borrows them during
//!   normalization and drops them once canonical records exist.
//! - `RecordQuery` carries both the rendered query text (for transports that
//!   execute it verbatim) and the resource name (for stores that route by
//!   table, like [`InMemorySource`]).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use crate::accounts::normalize_customer_id;
use crate::errors::ReportError;
use crate::record::RawRecord;
use crate::types::{CustomerId, ResourceRef};

/// One query as handed to a source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordQuery {
    /// Resource the query reads from (the `FROM` clause).
    pub resource: ResourceRef,
    /// Full rendered query text.
    pub text: String,
}

/// Pipeline-facing source of raw rows.
///
/// Implementations must be shareable across the fan-out threads. For a fixed
/// backing dataset, `fetch` output should be deterministic.
pub trait RecordSource: Send + Sync {
    /// Fetch the rows `query` selects within `customer_id`'s account.
    fn fetch(&self, customer_id: &str, query: &RecordQuery) -> Result<Vec<RawRecord>, ReportError>;
}

/// In-memory record source for tests and demos.
///
/// Rows are stored per `(customer id, resource)` pair and returned verbatim;
/// the query text is not interpreted.
#[derive(Debug, Default)]
pub struct InMemorySource {
    rows: IndexMap<(CustomerId, ResourceRef), Vec<RawRecord>>,
}

impl InMemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one row under `(customer_id, resource)`.
    pub fn insert(
        &mut self,
        customer_id: impl Into<CustomerId>,
        resource: impl Into<ResourceRef>,
        record: RawRecord,
    ) {
        self.rows
            .entry((customer_id.into(), resource.into()))
            .or_default()
            .push(record);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(
        mut self,
        customer_id: impl Into<CustomerId>,
        resource: impl Into<ResourceRef>,
        record: RawRecord,
    ) -> Self {
        self.insert(customer_id, resource, record);
        self
    }

    /// Load a source from a JSON snapshot file.
    ///
    /// The snapshot maps customer ids to resources to rows; customer ids are
    /// normalized to digits on load so they match the account directory:
    ///
    /// ```json
    /// {
    ///     "1234567890": {
    ///         "campaign": [
    ///             { "campaign.name": "Search: Brand", "metrics.cost_micros": 12345000 }
    ///         ]
    ///     }
    /// }
    /// ```
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let file = File::open(path)?;
        let snapshot: IndexMap<String, IndexMap<String, Vec<RawRecord>>> =
            serde_json::from_reader(BufReader::new(file)).map_err(|error| {
                ReportError::Configuration(format!(
                    "record snapshot {}: {error}",
                    path.display()
                ))
            })?;
        let mut source = InMemorySource::new();
        for (customer_id, resources) in snapshot {
            let customer_id = normalize_customer_id(&customer_id);
            for (resource, records) in resources {
                for record in records {
                    source.insert(customer_id.clone(), resource.clone(), record);
                }
            }
        }
        debug!(path = %path.display(), entries = source.rows.len(), "loaded record snapshot");
        Ok(source)
    }
}

impl RecordSource for InMemorySource {
    fn fetch(&self, customer_id: &str, query: &RecordQuery) -> Result<Vec<RawRecord>, ReportError> {
        let key = (customer_id.to_string(), query.resource.clone());
        let rows = self.rows.get(&key).cloned().unwrap_or_default();
        debug!(
            customer_id,
            resource = %query.resource,
            rows = rows.len(),
            "fetched in-memory rows"
        );
        Ok(rows)
    }
}

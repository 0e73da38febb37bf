//! Report execution: the single-account pipeline and multi-account fan-out.
//!
//! Ownership model:
//! - [`run_report`] owns the whole single-account flow: query construction,
//!   fetch, normalization, aggregation, and sorting.
//! - [`run_report_all`] runs that pipeline once per account on scoped
//!   threads. Each account's bucket map stays private to its thread; only
//!   finalized rows cross back for the merge sort, so one account can never
//!   contaminate another's accumulators.

use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::accounts::Account;
use crate::aggregate::aggregate;
use crate::canonical::{normalize, CanonicalRecord, Scalar};
use crate::dates::{DateRange, TimeSegment};
use crate::errors::ReportError;
use crate::query;
use crate::reports::{ReportKind, ToggleSet};
use crate::sorting::{sort_rows, SortSpec};
use crate::source::RecordSource;
use crate::types::CustomerId;

/// One report invocation: what to run, over which window, at which grain,
/// with which optional dimension blocks.
#[derive(Clone, Debug)]
pub struct ReportRequest {
    /// Report kind to run.
    pub kind: ReportKind,
    /// Inclusive reporting window.
    pub range: DateRange,
    /// Time bucket granularity.
    pub segment: TimeSegment,
    /// Optional dimension blocks to include.
    pub toggles: ToggleSet,
}

/// Finalized report: headers plus sorted rows, one [`Scalar`] per cell.
///
/// A run that matched nothing still carries its headers, so an empty table
/// remains distinguishable from a report that never ran.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportTable {
    /// Column labels; every row has exactly this width.
    pub headers: Vec<String>,
    /// Finalized rows in display order.
    pub rows: Vec<Vec<Scalar>>,
}

impl ReportTable {
    /// True when the run produced no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Per-account run telemetry captured by [`run_report_all`].
#[derive(Clone, Debug)]
pub struct AccountRunStats {
    /// Account the entry describes.
    pub customer_id: CustomerId,
    /// Display name of the account.
    pub account_name: String,
    /// Rows the account contributed before the merge.
    pub row_count: usize,
    /// Wall-clock duration of the account's pipeline run in milliseconds.
    pub elapsed_ms: u128,
    /// Failure message when the account was skipped.
    pub error: Option<String>,
}

/// Run one report for one account.
pub fn run_report(
    source: &dyn RecordSource,
    account: &Account,
    request: &ReportRequest,
) -> Result<ReportTable, ReportError> {
    validate(request)?;
    let started = Instant::now();

    let mut records: Vec<CanonicalRecord> = Vec::new();
    for (shape, report_query) in query::for_report(request.kind, &request.range, request.segment) {
        let rows = source.fetch(&account.id, &report_query)?;
        records.extend(
            rows.iter()
                .map(|raw| normalize(request.kind, shape, raw, request.segment)),
        );
    }

    let mut rows = aggregate(request.kind, &request.toggles, &records)?;
    sort_rows(&mut rows, SortSpec::for_report(request.kind, &request.toggles));
    debug!(
        report = request.kind.label(),
        customer_id = %account.id,
        rows = rows.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "report run complete"
    );

    Ok(ReportTable {
        headers: request.kind.headers(&request.toggles),
        rows,
    })
}

/// Run one report across every account, isolating per-account failures.
///
/// Accounts run concurrently on scoped threads. An account that fails (or
/// panics) is recorded in its stats entry and skipped; surviving rows merge
/// into one table and re-sort under the same comparator the per-account runs
/// used. When nothing survives, the table is empty but keeps its headers.
pub fn run_report_all(
    source: &dyn RecordSource,
    accounts: &[Account],
    request: &ReportRequest,
) -> Result<(ReportTable, Vec<AccountRunStats>), ReportError> {
    validate(request)?;

    let mut results: Vec<Option<(Result<ReportTable, ReportError>, Duration)>> =
        Vec::with_capacity(accounts.len());
    results.resize_with(accounts.len(), || None);

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(accounts.len());
        for (idx, account) in accounts.iter().enumerate() {
            eprintln!(
                "[adreport:pipeline] processing account='{}' ({})",
                account.name, account.id
            );
            handles.push((
                idx,
                scope.spawn(move || {
                    let start = Instant::now();
                    let result = run_report(source, account, request);
                    (result, start.elapsed())
                }),
            ));
        }
        for (idx, handle) in handles {
            let result = match handle.join() {
                Ok((result, elapsed)) => (result, elapsed),
                Err(_) => (
                    Err(ReportError::SourceUnavailable {
                        customer_id: accounts[idx].id.clone(),
                        reason: "report thread panicked".into(),
                    }),
                    Duration::from_secs(0),
                ),
            };
            results[idx] = Some(result);
        }
    });

    let mut merged: Vec<Vec<Scalar>> = Vec::new();
    let mut stats = Vec::with_capacity(accounts.len());
    for (idx, account) in accounts.iter().enumerate() {
        let Some((result, elapsed)) = results[idx].take() else {
            continue;
        };
        let mut entry = AccountRunStats {
            customer_id: account.id.clone(),
            account_name: account.name.clone(),
            row_count: 0,
            elapsed_ms: elapsed.as_millis(),
            error: None,
        };
        match result {
            Ok(table) => {
                entry.row_count = table.rows.len();
                debug!(
                    customer_id = %account.id,
                    rows = entry.row_count,
                    elapsed_ms = entry.elapsed_ms as u64,
                    "account run merged"
                );
                merged.extend(table.rows);
            }
            Err(error) => {
                eprintln!(
                    "[adreport:pipeline] error processing account='{}' ({}): {error}",
                    account.name, account.id
                );
                entry.error = Some(error.to_string());
            }
        }
        stats.push(entry);
    }

    if merged.is_empty() {
        eprintln!("[adreport:pipeline] no rows returned for any account");
    }
    sort_rows(
        &mut merged,
        SortSpec::for_report(request.kind, &request.toggles),
    );

    Ok((
        ReportTable {
            headers: request.kind.headers(&request.toggles),
            rows: merged,
        },
        stats,
    ))
}

/// Request constraints that hold regardless of transport.
fn validate(request: &ReportRequest) -> Result<(), ReportError> {
    if request.kind.single_day_only() && request.range.start != request.range.end {
        return Err(ReportError::InvalidArgument(format!(
            "the {} report reads one day at a time, got {}",
            request.kind.label(),
            request.range
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::fixtures::{
        PRIMARY_ACCOUNT_NAME, PRIMARY_CUSTOMER_ID, SECONDARY_ACCOUNT_NAME, SECONDARY_CUSTOMER_ID,
    };
    use crate::record::RawRecord;
    use crate::source::{InMemorySource, RecordQuery};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn day(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn request(kind: ReportKind, start: u32, end: u32) -> ReportRequest {
        ReportRequest {
            kind,
            range: DateRange::new(day(start), day(end)).unwrap(),
            segment: TimeSegment::Date,
            toggles: ToggleSet::default(),
        }
    }

    fn account_raw(date: &str, cost_micros: i64, clicks: i64) -> RawRecord {
        RawRecord::new()
            .with("segments.date", date)
            .with("customer.descriptive_name", PRIMARY_ACCOUNT_NAME)
            .with("customer.id", 1_111_111_111i64)
            .with("metrics.cost_micros", cost_micros)
            .with("metrics.clicks", clicks)
    }

    fn primary_account() -> Account {
        Account::new(PRIMARY_CUSTOMER_ID, PRIMARY_ACCOUNT_NAME)
    }

    #[test]
    fn single_account_run_fetches_aggregates_and_sorts() {
        let source = InMemorySource::new()
            .with(
                PRIMARY_CUSTOMER_ID,
                "customer",
                account_raw("2025-03-02", 5_000_000, 10),
            )
            .with(
                PRIMARY_CUSTOMER_ID,
                "customer",
                account_raw("2025-03-01", 50_000_000, 100),
            );

        let table = run_report(
            &source,
            &primary_account(),
            &request(ReportKind::Account, 1, 2),
        )
        .unwrap();

        assert_eq!(table.headers, ReportKind::Account.headers(&ToggleSet::default()));
        assert_eq!(table.rows.len(), 2);
        // Date ascending, regardless of insertion order.
        assert_eq!(table.rows[0][0], Scalar::Text("2025-03-01".to_string()));
        assert_eq!(table.rows[0][3], Scalar::Decimal("50.00".parse().unwrap()));
        assert_eq!(table.rows[1][3], Scalar::Decimal("5.00".parse().unwrap()));
        for row in &table.rows {
            assert_eq!(row.len(), table.headers.len());
        }
    }

    #[test]
    fn ads_run_merges_both_source_shapes() {
        let entity = RawRecord::new()
            .with("segments.date", "2025-03-01")
            .with("customer.id", 1_111_111_111i64)
            .with("customer.descriptive_name", PRIMARY_ACCOUNT_NAME)
            .with("campaign.id", 7i64)
            .with("campaign.name", "Brand : 0042")
            .with("metrics.cost_micros", 10_000_000i64);
        let pmax = RawRecord::new()
            .with("segments.date", "2025-03-01")
            .with("customer.id", 1_111_111_111i64)
            .with("customer.descriptive_name", PRIMARY_ACCOUNT_NAME)
            .with("campaign.id", 9i64)
            .with("campaign.name", "PMax : 0042")
            .with("metrics.cost_micros", 2_500_000i64);
        let source = InMemorySource::new()
            .with(PRIMARY_CUSTOMER_ID, "ad_group_ad", entity)
            .with(PRIMARY_CUSTOMER_ID, "campaign", pmax);

        let table = run_report(
            &source,
            &primary_account(),
            &request(ReportKind::Ads, 1, 1),
        )
        .unwrap();

        // Same date, customer, account, and ARC with every toggle off: the
        // two shapes collapse into one bucket.
        assert_eq!(table.rows.len(), 1);
        let cost_index = ReportKind::Ads
            .selected_dimensions(&ToggleSet::default())
            .len();
        assert_eq!(
            table.rows[0][cost_index],
            Scalar::Decimal("12.50".parse().unwrap())
        );
    }

    #[test]
    fn click_view_rejects_multi_day_windows() {
        let source = InMemorySource::new();
        let error = run_report(
            &source,
            &primary_account(),
            &request(ReportKind::ClickView, 1, 2),
        )
        .unwrap_err();
        assert!(matches!(error, ReportError::InvalidArgument(_)));
    }

    struct FlakySource {
        inner: InMemorySource,
        failing_id: &'static str,
    }

    impl RecordSource for FlakySource {
        fn fetch(
            &self,
            customer_id: &str,
            query: &RecordQuery,
        ) -> Result<Vec<RawRecord>, ReportError> {
            if customer_id == self.failing_id {
                return Err(ReportError::SourceUnavailable {
                    customer_id: customer_id.to_string(),
                    reason: "quota exhausted".into(),
                });
            }
            self.inner.fetch(customer_id, query)
        }
    }

    #[test]
    fn fan_out_skips_failed_accounts_and_keeps_the_rest() {
        let inner = InMemorySource::new()
            .with(
                PRIMARY_CUSTOMER_ID,
                "customer",
                account_raw("2025-03-01", 1_000_000, 1),
            )
            .with(
                SECONDARY_CUSTOMER_ID,
                "customer",
                RawRecord::new()
                    .with("segments.date", "2025-03-01")
                    .with("customer.descriptive_name", SECONDARY_ACCOUNT_NAME)
                    .with("customer.id", 2_222_222_222i64)
                    .with("metrics.cost_micros", 3_000_000i64),
            );
        let source = FlakySource {
            inner,
            failing_id: SECONDARY_CUSTOMER_ID,
        };
        let accounts = vec![
            primary_account(),
            Account::new(SECONDARY_CUSTOMER_ID, SECONDARY_ACCOUNT_NAME),
        ];

        let (table, stats) =
            run_report_all(&source, &accounts, &request(ReportKind::Account, 1, 1)).unwrap();

        assert_eq!(table.rows.len(), 1);
        assert_eq!(
            table.rows[0][2],
            Scalar::Int(1_111_111_111),
            "only the healthy account's rows survive"
        );
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].row_count, 1);
        assert!(stats[0].error.is_none());
        assert_eq!(stats[1].row_count, 0);
        let message = stats[1].error.as_deref().unwrap();
        assert!(message.contains(SECONDARY_CUSTOMER_ID));
        assert!(message.contains("quota exhausted"));
    }

    struct PanickySource;

    impl RecordSource for PanickySource {
        fn fetch(&self, _: &str, _: &RecordQuery) -> Result<Vec<RawRecord>, ReportError> {
            panic!("wire decode exploded");
        }
    }

    #[test]
    fn fan_out_maps_thread_panics_to_source_errors() {
        let accounts = vec![primary_account()];
        let (table, stats) =
            run_report_all(&PanickySource, &accounts, &request(ReportKind::Account, 1, 1))
                .unwrap();

        assert!(table.is_empty());
        assert_eq!(stats[0].error.as_deref(), Some(
            "record source unavailable for account '1111111111': report thread panicked"
        ));
    }

    #[test]
    fn empty_fan_out_still_carries_headers() {
        let source = InMemorySource::new();
        let accounts = vec![primary_account()];
        let (table, _) =
            run_report_all(&source, &accounts, &request(ReportKind::Account, 1, 1)).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.headers, ReportKind::Account.headers(&ToggleSet::default()));
    }

    #[test]
    fn merged_rows_resort_across_accounts() {
        let source = InMemorySource::new()
            .with(
                PRIMARY_CUSTOMER_ID,
                "customer",
                account_raw("2025-03-02", 1_000_000, 1),
            )
            .with(
                SECONDARY_CUSTOMER_ID,
                "customer",
                RawRecord::new()
                    .with("segments.date", "2025-03-01")
                    .with("customer.descriptive_name", SECONDARY_ACCOUNT_NAME)
                    .with("customer.id", 2_222_222_222i64)
                    .with("metrics.cost_micros", 3_000_000i64),
            );
        let accounts = vec![
            primary_account(),
            Account::new(SECONDARY_CUSTOMER_ID, SECONDARY_ACCOUNT_NAME),
        ];

        let (table, _) =
            run_report_all(&source, &accounts, &request(ReportKind::Account, 1, 2)).unwrap();

        // The second account's earlier date leads despite arriving later.
        assert_eq!(table.rows[0][0], Scalar::Text("2025-03-01".to_string()));
        assert_eq!(table.rows[0][2], Scalar::Int(2_222_222_222));
        assert_eq!(table.rows[1][2], Scalar::Int(1_111_111_111));
    }

    #[test]
    fn volume_cost_breaks_date_ties_descending() {
        let source = InMemorySource::new()
            .with(
                PRIMARY_CUSTOMER_ID,
                "customer",
                account_raw("2025-03-01", 1_000_000, 1),
            )
            .with(
                SECONDARY_CUSTOMER_ID,
                "customer",
                RawRecord::new()
                    .with("segments.date", "2025-03-01")
                    .with("customer.descriptive_name", SECONDARY_ACCOUNT_NAME)
                    .with("customer.id", 2_222_222_222i64)
                    .with("metrics.cost_micros", 9_000_000i64),
            );
        let accounts = vec![
            primary_account(),
            Account::new(SECONDARY_CUSTOMER_ID, SECONDARY_ACCOUNT_NAME),
        ];

        let (table, _) =
            run_report_all(&source, &accounts, &request(ReportKind::Account, 1, 1)).unwrap();

        assert_eq!(table.rows[0][3], Scalar::Decimal(Decimal::new(900, 2)));
        assert_eq!(table.rows[1][3], Scalar::Decimal(Decimal::new(100, 2)));
    }
}

//! Commutative aggregation of canonical records into finalized report rows.
//!
//! The fold groups records by the toggled dimension columns and accumulates
//! per the report's metric table: counts and decimal sums add, weighted
//! rates accumulate `value * weight` plus `weight` into hidden accumulators.
//! Finalization then quantizes sums at class precision, recomputes ratio
//! metrics from their operand sums, and collapses weighted rates into
//! weighted means. Record arrival order never changes the finalized values;
//! only the row order of the returned vector reflects it, and the sorter
//! owns that.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use tracing::debug;

use crate::canonical::{CanonicalRecord, MetricId, Scalar};
use crate::constants::money::{PER_MILLE, RATE_SCALE};
use crate::errors::ReportError;
use crate::money::{quantize, zero_at};
use crate::reports::{MetricColumn, MetricMode, ReportKind, ToggleSet};

/// Hidden accumulator pair behind one weighted-rate column.
#[derive(Clone, Copy, Debug, Default)]
struct WeightedSum {
    value_times_weight: Decimal,
    weight_total: Decimal,
}

/// Running accumulators for one group key.
#[derive(Clone, Debug)]
struct Bucket {
    counts: IndexMap<MetricId, i64>,
    decimals: IndexMap<MetricId, Decimal>,
    weighted: IndexMap<MetricId, WeightedSum>,
}

impl Bucket {
    /// A bucket with every accumulating metric zeroed.
    fn seeded(metrics: &[MetricColumn]) -> Self {
        let mut bucket = Bucket {
            counts: IndexMap::new(),
            decimals: IndexMap::new(),
            weighted: IndexMap::new(),
        };
        for column in metrics {
            match column.mode {
                MetricMode::CountSum => {
                    bucket.counts.insert(column.id, 0);
                }
                MetricMode::DecimalSum { .. } => {
                    bucket.decimals.insert(column.id, Decimal::ZERO);
                }
                MetricMode::WeightedRate { .. } => {
                    bucket.weighted.insert(column.id, WeightedSum::default());
                }
                MetricMode::RatioOfSums { .. } => {}
            }
        }
        bucket
    }

    /// Accumulated sum behind `id`, whichever table it lives in.
    fn operand(&self, kind: ReportKind, id: MetricId) -> Result<Decimal, ReportError> {
        if let Some(count) = self.counts.get(&id) {
            return Ok(Decimal::from(*count));
        }
        if let Some(sum) = self.decimals.get(&id) {
            return Ok(*sum);
        }
        Err(ReportError::MissingMetric {
            report: kind.label(),
            metric: id.name(),
        })
    }
}

/// Group `records` by the dimensions selected for `kind` under `toggles` and
/// finalize one output row per group, in first-seen group order.
///
/// Every record must carry every selected dimension and every accumulating
/// metric of the kind; a gap is a normalizer bug and fails the whole report.
pub fn aggregate(
    kind: ReportKind,
    toggles: &ToggleSet,
    records: &[CanonicalRecord],
) -> Result<Vec<Vec<Scalar>>, ReportError> {
    let columns = kind.selected_dimensions(toggles);
    let metrics = kind.metric_columns();

    let mut buckets: IndexMap<Vec<Scalar>, Bucket> = IndexMap::new();
    for record in records {
        let mut key = Vec::with_capacity(columns.len());
        for column in &columns {
            let cell = record
                .dimension(column.id)
                .ok_or(ReportError::MissingDimension {
                    report: kind.label(),
                    dimension: column.id.name(),
                })?;
            key.push(cell.clone());
        }
        let bucket = buckets
            .entry(key)
            .or_insert_with(|| Bucket::seeded(metrics));
        accumulate(kind, bucket, metrics, record)?;
    }

    debug!(
        report = kind.label(),
        records = records.len(),
        buckets = buckets.len(),
        "aggregated records"
    );

    let mut rows = Vec::with_capacity(buckets.len());
    for (key, bucket) in buckets {
        let mut row = key;
        for column in metrics {
            row.push(finalize(kind, &bucket, column)?);
        }
        rows.push(row);
    }
    Ok(rows)
}

fn accumulate(
    kind: ReportKind,
    bucket: &mut Bucket,
    metrics: &[MetricColumn],
    record: &CanonicalRecord,
) -> Result<(), ReportError> {
    for column in metrics {
        match column.mode {
            MetricMode::CountSum => {
                let value = metric_int(kind, record, column.id)?;
                if let Some(sum) = bucket.counts.get_mut(&column.id) {
                    *sum += value;
                }
            }
            MetricMode::DecimalSum { .. } => {
                let value = metric_decimal(kind, record, column.id)?;
                if let Some(sum) = bucket.decimals.get_mut(&column.id) {
                    *sum += value;
                }
            }
            MetricMode::WeightedRate { weight } => {
                let value = metric_decimal(kind, record, column.id)?;
                let weight = metric_decimal(kind, record, weight)?;
                if let Some(sums) = bucket.weighted.get_mut(&column.id) {
                    sums.value_times_weight += value * weight;
                    sums.weight_total += weight;
                }
            }
            // Recomputed from operand sums at finalization.
            MetricMode::RatioOfSums { .. } => {}
        }
    }
    Ok(())
}

fn finalize(kind: ReportKind, bucket: &Bucket, column: &MetricColumn) -> Result<Scalar, ReportError> {
    let cell = match column.mode {
        MetricMode::CountSum => {
            let sum = bucket
                .counts
                .get(&column.id)
                .copied()
                .ok_or(ReportError::MissingMetric {
                    report: kind.label(),
                    metric: column.id.name(),
                })?;
            Scalar::Int(sum)
        }
        MetricMode::DecimalSum { scale } => {
            let sum = bucket
                .decimals
                .get(&column.id)
                .copied()
                .ok_or(ReportError::MissingMetric {
                    report: kind.label(),
                    metric: column.id.name(),
                })?;
            Scalar::Decimal(quantize(sum, scale))
        }
        MetricMode::WeightedRate { .. } => {
            let sums = bucket
                .weighted
                .get(&column.id)
                .copied()
                .ok_or(ReportError::MissingMetric {
                    report: kind.label(),
                    metric: column.id.name(),
                })?;
            if sums.weight_total > Decimal::ZERO {
                Scalar::Decimal(quantize(
                    sums.value_times_weight / sums.weight_total,
                    RATE_SCALE,
                ))
            } else {
                Scalar::Decimal(zero_at(RATE_SCALE))
            }
        }
        MetricMode::RatioOfSums {
            numerator,
            denominator,
            scale,
            per_mille,
        } => {
            let denominator = bucket.operand(kind, denominator)?;
            if denominator > Decimal::ZERO {
                let mut quotient = bucket.operand(kind, numerator)? / denominator;
                if per_mille {
                    quotient *= Decimal::from(PER_MILLE);
                }
                Scalar::Decimal(quantize(quotient, scale))
            } else {
                Scalar::Decimal(zero_at(scale))
            }
        }
    };
    Ok(cell)
}

fn metric_int(
    kind: ReportKind,
    record: &CanonicalRecord,
    id: MetricId,
) -> Result<i64, ReportError> {
    record
        .metric(id)
        .and_then(Scalar::as_i64)
        .ok_or(ReportError::MissingMetric {
            report: kind.label(),
            metric: id.name(),
        })
}

fn metric_decimal(
    kind: ReportKind,
    record: &CanonicalRecord,
    id: MetricId,
) -> Result<Decimal, ReportError> {
    record
        .metric(id)
        .and_then(Scalar::as_decimal)
        .ok_or(ReportError::MissingMetric {
            report: kind.label(),
            metric: id.name(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::normalize;
    use crate::constants::fixtures::PRIMARY_ACCOUNT_NAME;
    use crate::dates::TimeSegment;
    use crate::record::RawRecord;
    use crate::reports::SourceShape;

    fn account_row(date: &str, cost_micros: i64, clicks: i64, impressions: i64) -> RawRecord {
        RawRecord::new()
            .with("segments.date", date)
            .with("customer.descriptive_name", PRIMARY_ACCOUNT_NAME)
            .with("customer.id", 1_111_111_111i64)
            .with("metrics.cost_micros", cost_micros)
            .with("metrics.clicks", clicks)
            .with("metrics.invalid_clicks", 0i64)
            .with("metrics.interactions", clicks)
            .with("metrics.impressions", impressions)
    }

    fn account_records(rows: &[RawRecord]) -> Vec<CanonicalRecord> {
        rows.iter()
            .map(|raw| {
                normalize(
                    ReportKind::Account,
                    SourceShape::EntityScoped,
                    raw,
                    TimeSegment::Date,
                )
            })
            .collect()
    }

    fn cell(row: &[Scalar], index: usize) -> String {
        row[index].to_string()
    }

    #[test]
    fn records_with_equal_keys_fold_into_one_bucket() {
        let records = account_records(&[
            account_row("2025-03-01", 10_000_000, 10, 100),
            account_row("2025-03-01", 5_000_000, 5, 50),
            account_row("2025-03-02", 1_000_000, 1, 10),
        ]);
        let rows = aggregate(ReportKind::Account, &ToggleSet::default(), &records).unwrap();

        assert_eq!(rows.len(), 2);
        // date, account, customer id, cost, clicks, ...
        assert_eq!(cell(&rows[0], 0), "2025-03-01");
        assert_eq!(cell(&rows[0], 3), "15.00");
        assert_eq!(cell(&rows[0], 4), "15");
        assert_eq!(cell(&rows[1], 3), "1.00");
    }

    #[test]
    fn ratio_metrics_recompute_from_operand_sums() {
        let records = account_records(&[
            account_row("2025-03-01", 10_000_000, 10, 100),
            account_row("2025-03-01", 5_000_000, 5, 400),
        ]);
        let rows = aggregate(ReportKind::Account, &ToggleSet::default(), &records).unwrap();

        // ctr = 15 clicks / 500 impressions.
        assert_eq!(cell(&rows[0], 9), "0.0300");
        // avg cpc = 15.00 / 15 clicks.
        assert_eq!(cell(&rows[0], 10), "1.000");
        // avg cpm = 15.00 / 500 * 1000.
        assert_eq!(cell(&rows[0], 11), "30.000");
    }

    #[test]
    fn weighted_rates_are_impression_weighted_means() {
        let light = account_row("2025-03-01", 0, 0, 100)
            .with("metrics.absolute_top_impression_percentage", 50.0);
        let heavy = account_row("2025-03-01", 0, 0, 300)
            .with("metrics.absolute_top_impression_percentage", 10.0);
        let records = account_records(&[light, heavy]);
        let rows = aggregate(ReportKind::Account, &ToggleSet::default(), &records).unwrap();

        // (50*100 + 10*300) / 400, not the unweighted 30.
        assert_eq!(cell(&rows[0], 12), "20.0000");
    }

    #[test]
    fn zero_denominators_finalize_as_zero_at_class_precision() {
        let records = account_records(&[account_row("2025-03-01", 0, 0, 0)]);
        let rows = aggregate(ReportKind::Account, &ToggleSet::default(), &records).unwrap();

        assert_eq!(cell(&rows[0], 6), "0.0000"); // invalid click %
        assert_eq!(cell(&rows[0], 9), "0.0000"); // ctr
        assert_eq!(cell(&rows[0], 10), "0.000"); // avg cpc
        assert_eq!(cell(&rows[0], 11), "0.000"); // avg cpm
        assert_eq!(cell(&rows[0], 12), "0.0000"); // abs top is
    }

    #[test]
    fn accumulation_is_commutative() {
        let forward = account_records(&[
            account_row("2025-03-01", 10_010_000, 7, 103),
            account_row("2025-03-01", 4_990_000, 8, 397),
            account_row("2025-03-02", 1_000_000, 1, 10),
        ]);
        let mut reversed = forward.clone();
        reversed.reverse();

        let mut lhs = aggregate(ReportKind::Account, &ToggleSet::default(), &forward).unwrap();
        let mut rhs = aggregate(ReportKind::Account, &ToggleSet::default(), &reversed).unwrap();
        lhs.sort();
        rhs.sort();
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn toggled_dimensions_split_buckets() {
        let search = RawRecord::new()
            .with("segments.date", "2025-03-01")
            .with("customer.descriptive_name", PRIMARY_ACCOUNT_NAME)
            .with("customer.id", 1_111_111_111i64)
            .with("campaign.name", "Brand : 0042")
            .with("campaign.advertising_channel_type", "SEARCH")
            .with("metrics.cost_micros", 1_000_000i64);
        let display = RawRecord::new()
            .with("segments.date", "2025-03-01")
            .with("customer.descriptive_name", PRIMARY_ACCOUNT_NAME)
            .with("customer.id", 1_111_111_111i64)
            .with("campaign.name", "Remarketing : 0042")
            .with("campaign.advertising_channel_type", "DISPLAY")
            .with("metrics.cost_micros", 2_000_000i64);
        let records: Vec<CanonicalRecord> = [&search, &display]
            .into_iter()
            .map(|raw| {
                normalize(
                    ReportKind::Arc,
                    SourceShape::EntityScoped,
                    raw,
                    TimeSegment::Date,
                )
            })
            .collect();

        // Same ARC, so one bucket without the channel column.
        let plain = aggregate(ReportKind::Arc, &ToggleSet::default(), &records).unwrap();
        assert_eq!(plain.len(), 1);
        assert_eq!(cell(&plain[0], 4), "3.00");

        // The channel column separates them.
        let toggles = ToggleSet {
            channel_type: true,
            ..ToggleSet::default()
        };
        let split = aggregate(ReportKind::Arc, &toggles, &records).unwrap();
        assert_eq!(split.len(), 2);
    }

    #[test]
    fn missing_metric_is_a_fatal_error() {
        let record = CanonicalRecord {
            kind: ReportKind::Account,
            dimensions: account_records(&[account_row("2025-03-01", 0, 0, 0)])[0]
                .dimensions
                .clone(),
            metrics: IndexMap::new(),
        };
        let err = aggregate(ReportKind::Account, &ToggleSet::default(), &[record]).unwrap_err();
        assert!(matches!(err, ReportError::MissingMetric { .. }));
    }

    #[test]
    fn missing_dimension_is_a_fatal_error() {
        let mut record = account_records(&[account_row("2025-03-01", 0, 0, 0)])
            .pop()
            .unwrap();
        record.dimensions.clear();
        let err = aggregate(ReportKind::Account, &ToggleSet::default(), &[record]).unwrap_err();
        assert!(matches!(
            err,
            ReportError::MissingDimension {
                dimension: "time_bucket",
                ..
            }
        ));
    }

    #[test]
    fn headers_and_rows_stay_the_same_width() {
        let toggles = ToggleSet {
            campaign_info: true,
            channel_type: true,
            ad_group_info: false,
            device_info: false,
        };
        let raw = RawRecord::new()
            .with("segments.date", "2025-03-01")
            .with("customer.id", 1_111_111_111i64)
            .with("customer.descriptive_name", PRIMARY_ACCOUNT_NAME)
            .with("campaign.id", 7i64)
            .with("campaign.name", "Brand : 0042")
            .with("campaign.advertising_channel_type", "SEARCH")
            .with("metrics.cost_micros", 1_000_000i64)
            .with("metrics.impressions", 10i64)
            .with("metrics.clicks", 1i64);
        let record = normalize(
            ReportKind::Ads,
            SourceShape::EntityScoped,
            &raw,
            TimeSegment::Date,
        );
        let rows = aggregate(ReportKind::Ads, &toggles, &[record]).unwrap();
        let headers = ReportKind::Ads.headers(&toggles);
        assert_eq!(rows[0].len(), headers.len());
    }
}

//! Canonical records and the per-report normalizers that build them.
//!
//! Normalization is total: a raw row always yields a canonical record
//! carrying the full dimension superset for its report, with absent text
//! fields as empty strings, absent ids as zero, and absent or unrecognized
//! coded fields as `UNDEFINED`. Which of those dimensions end up in the
//! grouping key is decided later by the report layout, never here.
//!
//! Ownership model:
//!
//! - Normalizers borrow the raw row and clone only the fields they keep.
//! - Canonical records own their values; the aggregation fold consumes them
//!   by reference and clones dimension values into bucket keys.

use std::fmt;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::constants::money::{AVERAGE_SCALE, CURRENCY_SCALE, MICROS_PER_UNIT};
use crate::constants::normalize::{ARC_DELIMITER, PERFORMANCE_MAX_LABEL, UNDEFINED_VALUE};
use crate::dates::TimeSegment;
use crate::enums::{decode, CodedField};
use crate::money::{decimal_from_f64, quantize};
use crate::record::{FieldValue, RawRecord};
use crate::reports::{ReportKind, SourceShape};

/// One cell of a report: a dimension value or a finalized metric.
///
/// Ordering is derived, so rows of equal shape compare lexicographically;
/// the sorter leans on this for its dimension tie-break.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Ids, counters, and integer time buckets (e.g. years).
    Int(i64),
    /// Names, dates, and decoded enum values.
    Text(String),
    /// Quantized money, rates, and averages.
    Decimal(Decimal),
}

impl Scalar {
    /// Numeric view of the cell; text yields `None`.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Scalar::Int(value) => Some(Decimal::from(*value)),
            Scalar::Decimal(value) => Some(*value),
            Scalar::Text(_) => None,
        }
    }

    /// Integer view of the cell; text and decimals yield `None`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Text view of the cell; numbers yield `None`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(value) => write!(f, "{value}"),
            Scalar::Text(value) => f.write_str(value),
            Scalar::Decimal(value) => write!(f, "{value}"),
        }
    }
}

/// Stable identifier for a dimension column, independent of its header label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DimensionId {
    TimeBucket,
    AccountName,
    CustomerId,
    Arc,
    CampaignId,
    CampaignName,
    ChannelType,
    AdGroupId,
    AdGroupName,
    AdGroupType,
    AdId,
    AdType,
    Device,
    ClickType,
    Gclid,
    KeywordMatchType,
    KeywordText,
    SerpNumber,
    SerpType,
}

impl DimensionId {
    /// Diagnostic name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            DimensionId::TimeBucket => "time_bucket",
            DimensionId::AccountName => "account_name",
            DimensionId::CustomerId => "customer_id",
            DimensionId::Arc => "arc",
            DimensionId::CampaignId => "campaign_id",
            DimensionId::CampaignName => "campaign_name",
            DimensionId::ChannelType => "channel_type",
            DimensionId::AdGroupId => "ad_group_id",
            DimensionId::AdGroupName => "ad_group_name",
            DimensionId::AdGroupType => "ad_group_type",
            DimensionId::AdId => "ad_id",
            DimensionId::AdType => "ad_type",
            DimensionId::Device => "device",
            DimensionId::ClickType => "click_type",
            DimensionId::Gclid => "gclid",
            DimensionId::KeywordMatchType => "keyword_match_type",
            DimensionId::KeywordText => "keyword_text",
            DimensionId::SerpNumber => "serp_number",
            DimensionId::SerpType => "serp_type",
        }
    }
}

/// Stable identifier for a metric column.
///
/// Ratio metrics (CTR, CPC, CPM, per-query rates) appear only in report
/// metric tables; normalizers never store them on records because they
/// finalize from accumulated sums.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum MetricId {
    Cost,
    Impressions,
    Clicks,
    InvalidClicks,
    InvalidClickRate,
    Interactions,
    Ctr,
    AvgCpc,
    AvgCpm,
    AbsTopImpressionShare,
    TopImpressionShare,
    VideoViews,
    Conversions,
    ConversionValue,
    OrganicQueries,
    OrganicImpressions,
    OrganicClicks,
    OrganicImpressionsPerQuery,
    OrganicClicksPerQuery,
    PaidImpressions,
    PaidClicks,
    PaidCtr,
    TotalCost,
    TotalQueries,
    TotalImpressions,
    TotalClicks,
    TotalClicksPerQuery,
}

impl MetricId {
    /// Diagnostic name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            MetricId::Cost => "cost",
            MetricId::Impressions => "impressions",
            MetricId::Clicks => "clicks",
            MetricId::InvalidClicks => "invalid_clicks",
            MetricId::InvalidClickRate => "invalid_click_rate",
            MetricId::Interactions => "interactions",
            MetricId::Ctr => "ctr",
            MetricId::AvgCpc => "avg_cpc",
            MetricId::AvgCpm => "avg_cpm",
            MetricId::AbsTopImpressionShare => "abs_top_impression_share",
            MetricId::TopImpressionShare => "top_impression_share",
            MetricId::VideoViews => "video_views",
            MetricId::Conversions => "conversions",
            MetricId::ConversionValue => "conversion_value",
            MetricId::OrganicQueries => "organic_queries",
            MetricId::OrganicImpressions => "organic_impressions",
            MetricId::OrganicClicks => "organic_clicks",
            MetricId::OrganicImpressionsPerQuery => "organic_impressions_per_query",
            MetricId::OrganicClicksPerQuery => "organic_clicks_per_query",
            MetricId::PaidImpressions => "paid_impressions",
            MetricId::PaidClicks => "paid_clicks",
            MetricId::PaidCtr => "paid_ctr",
            MetricId::TotalCost => "total_cost",
            MetricId::TotalQueries => "total_queries",
            MetricId::TotalImpressions => "total_impressions",
            MetricId::TotalClicks => "total_clicks",
            MetricId::TotalClicksPerQuery => "total_clicks_per_query",
        }
    }
}

/// One normalized row, ready for the aggregation fold.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CanonicalRecord {
    /// Report this record was normalized for.
    pub kind: ReportKind,
    /// Full dimension superset for the report, toggled or not.
    pub dimensions: IndexMap<DimensionId, Scalar>,
    /// Per-record samples of every accumulating metric.
    pub metrics: IndexMap<MetricId, Scalar>,
}

impl CanonicalRecord {
    /// Dimension value, if the normalizer produced it.
    pub fn dimension(&self, id: DimensionId) -> Option<&Scalar> {
        self.dimensions.get(&id)
    }

    /// Metric sample, if the normalizer produced it.
    pub fn metric(&self, id: MetricId) -> Option<&Scalar> {
        self.metrics.get(&id)
    }
}

/// Normalize one raw row for `kind` as delivered by `shape`.
pub fn normalize(
    kind: ReportKind,
    shape: SourceShape,
    raw: &RawRecord,
    segment: TimeSegment,
) -> CanonicalRecord {
    match (kind, shape) {
        (ReportKind::Arc, _) => normalize_arc(raw, segment),
        (ReportKind::Account, _) => normalize_account(raw, segment),
        (ReportKind::Ads, SourceShape::EntityScoped) => normalize_ads_entity(raw, segment),
        (ReportKind::Ads, SourceShape::CampaignOnly) => normalize_ads_campaign_only(raw, segment),
        (ReportKind::ClickView, _) => normalize_click_view(raw, segment),
        (ReportKind::PaidOrganicTerms, _) => normalize_paid_organic(raw, segment),
    }
}

/// ARC suffix of a campaign name: the substring after the last `:`, trimmed.
///
/// Names without a delimiter, and names whose suffix trims to nothing,
/// normalize to `UNDEFINED`.
///
/// # Examples
///
/// ```
/// use adreport::canonical::arc_suffix;
///
/// assert_eq!(arc_suffix("Brand : US : 0042"), "0042");
/// assert_eq!(arc_suffix("Unlabeled"), "UNDEFINED");
/// assert_eq!(arc_suffix("trailing:"), "UNDEFINED");
/// ```
pub fn arc_suffix(name: &str) -> String {
    let Some((_, suffix)) = name.rsplit_once(ARC_DELIMITER) else {
        return UNDEFINED_VALUE.to_string();
    };
    let suffix = suffix.trim();
    if suffix.is_empty() {
        UNDEFINED_VALUE.to_string()
    } else {
        suffix.to_string()
    }
}

/// Time bucket cell for the row. Date-like segments arrive as text, the year
/// segment as an integer; anything missing becomes `UNDEFINED`.
fn time_bucket(raw: &RawRecord, segment: TimeSegment) -> Scalar {
    match raw.get(segment.field_path()) {
        Some(FieldValue::Text(value)) if !value.is_empty() => Scalar::Text(value.clone()),
        Some(FieldValue::Integer(value)) => Scalar::Int(*value),
        _ => Scalar::Text(UNDEFINED_VALUE.to_string()),
    }
}

fn text_dim(raw: &RawRecord, path: &str) -> Scalar {
    Scalar::Text(raw.text_or_empty(path))
}

fn int_dim(raw: &RawRecord, path: &str) -> Scalar {
    Scalar::Int(raw.integer_or_zero(path))
}

fn coded_dim(raw: &RawRecord, path: &str, field: CodedField) -> Scalar {
    Scalar::Text(decode(field, raw.get(path)))
}

fn count_metric(raw: &RawRecord, path: &str) -> Scalar {
    Scalar::Int(raw.integer_or_zero(path))
}

fn share_metric(raw: &RawRecord, path: &str) -> Scalar {
    Scalar::Decimal(decimal_from_f64(raw.float_or_zero(path)))
}

/// Micros field quantized to `places`. Handles both INT64 micros (costs) and
/// DOUBLE micros (averages like `metrics.average_cpc`).
fn micros_field(raw: &RawRecord, path: &str, places: u32) -> Decimal {
    let micros = match raw.get(path) {
        Some(FieldValue::Integer(value)) => Decimal::from(*value),
        Some(FieldValue::Float(value)) => decimal_from_f64(*value),
        _ => Decimal::ZERO,
    };
    quantize(micros / Decimal::from(MICROS_PER_UNIT), places)
}

fn normalize_arc(raw: &RawRecord, segment: TimeSegment) -> CanonicalRecord {
    let campaign_name = raw.text_or_empty("campaign.name");

    let mut dimensions = IndexMap::new();
    dimensions.insert(DimensionId::TimeBucket, time_bucket(raw, segment));
    dimensions.insert(
        DimensionId::AccountName,
        text_dim(raw, "customer.descriptive_name"),
    );
    dimensions.insert(DimensionId::CustomerId, int_dim(raw, "customer.id"));
    dimensions.insert(
        DimensionId::CampaignName,
        Scalar::Text(campaign_name.clone()),
    );
    dimensions.insert(
        DimensionId::ChannelType,
        coded_dim(
            raw,
            "campaign.advertising_channel_type",
            CodedField::ChannelType,
        ),
    );
    dimensions.insert(DimensionId::Arc, Scalar::Text(arc_suffix(&campaign_name)));

    let mut metrics = IndexMap::new();
    metrics.insert(
        MetricId::Cost,
        Scalar::Decimal(micros_field(raw, "metrics.cost_micros", CURRENCY_SCALE)),
    );

    CanonicalRecord {
        kind: ReportKind::Arc,
        dimensions,
        metrics,
    }
}

fn normalize_account(raw: &RawRecord, segment: TimeSegment) -> CanonicalRecord {
    let mut dimensions = IndexMap::new();
    dimensions.insert(DimensionId::TimeBucket, time_bucket(raw, segment));
    dimensions.insert(
        DimensionId::AccountName,
        text_dim(raw, "customer.descriptive_name"),
    );
    dimensions.insert(DimensionId::CustomerId, int_dim(raw, "customer.id"));

    let mut metrics = IndexMap::new();
    metrics.insert(
        MetricId::Cost,
        Scalar::Decimal(micros_field(raw, "metrics.cost_micros", CURRENCY_SCALE)),
    );
    metrics.insert(MetricId::Clicks, count_metric(raw, "metrics.clicks"));
    metrics.insert(
        MetricId::InvalidClicks,
        count_metric(raw, "metrics.invalid_clicks"),
    );
    metrics.insert(
        MetricId::Interactions,
        count_metric(raw, "metrics.interactions"),
    );
    metrics.insert(
        MetricId::Impressions,
        count_metric(raw, "metrics.impressions"),
    );
    metrics.insert(
        MetricId::AbsTopImpressionShare,
        share_metric(raw, "metrics.absolute_top_impression_percentage"),
    );
    metrics.insert(
        MetricId::TopImpressionShare,
        share_metric(raw, "metrics.top_impression_percentage"),
    );

    CanonicalRecord {
        kind: ReportKind::Account,
        dimensions,
        metrics,
    }
}

/// Dimensions shared by both ad-report shapes, up to the ad-group block.
fn ads_leading_dimensions(raw: &RawRecord, segment: TimeSegment) -> IndexMap<DimensionId, Scalar> {
    let campaign_name = raw.text_or_empty("campaign.name");

    let mut dimensions = IndexMap::new();
    dimensions.insert(DimensionId::TimeBucket, time_bucket(raw, segment));
    dimensions.insert(DimensionId::CustomerId, int_dim(raw, "customer.id"));
    dimensions.insert(
        DimensionId::AccountName,
        text_dim(raw, "customer.descriptive_name"),
    );
    dimensions.insert(DimensionId::Arc, Scalar::Text(arc_suffix(&campaign_name)));
    dimensions.insert(DimensionId::CampaignId, int_dim(raw, "campaign.id"));
    dimensions.insert(DimensionId::CampaignName, Scalar::Text(campaign_name));
    dimensions.insert(
        DimensionId::ChannelType,
        coded_dim(
            raw,
            "campaign.advertising_channel_type",
            CodedField::ChannelType,
        ),
    );
    dimensions
}

fn ads_metrics(raw: &RawRecord) -> IndexMap<MetricId, Scalar> {
    let mut metrics = IndexMap::new();
    metrics.insert(
        MetricId::Cost,
        Scalar::Decimal(micros_field(raw, "metrics.cost_micros", CURRENCY_SCALE)),
    );
    metrics.insert(
        MetricId::Impressions,
        count_metric(raw, "metrics.impressions"),
    );
    metrics.insert(
        MetricId::AbsTopImpressionShare,
        share_metric(raw, "metrics.absolute_top_impression_percentage"),
    );
    metrics.insert(
        MetricId::TopImpressionShare,
        share_metric(raw, "metrics.top_impression_percentage"),
    );
    metrics.insert(
        MetricId::Interactions,
        count_metric(raw, "metrics.interactions"),
    );
    metrics.insert(MetricId::Clicks, count_metric(raw, "metrics.clicks"));
    metrics.insert(
        MetricId::VideoViews,
        count_metric(raw, "metrics.video_views"),
    );
    metrics.insert(
        MetricId::Conversions,
        Scalar::Decimal(decimal_from_f64(raw.float_or_zero("metrics.conversions"))),
    );
    metrics.insert(
        MetricId::ConversionValue,
        Scalar::Decimal(quantize(
            decimal_from_f64(raw.float_or_zero("metrics.conversions_value")),
            CURRENCY_SCALE,
        )),
    );
    metrics
}

fn normalize_ads_entity(raw: &RawRecord, segment: TimeSegment) -> CanonicalRecord {
    let mut dimensions = ads_leading_dimensions(raw, segment);
    dimensions.insert(DimensionId::AdGroupId, int_dim(raw, "ad_group.id"));
    dimensions.insert(DimensionId::AdGroupName, text_dim(raw, "ad_group.name"));
    dimensions.insert(
        DimensionId::AdGroupType,
        coded_dim(raw, "ad_group.type", CodedField::AdGroupType),
    );
    dimensions.insert(DimensionId::AdId, int_dim(raw, "ad_group_ad.ad.id"));
    dimensions.insert(
        DimensionId::AdType,
        coded_dim(raw, "ad_group_ad.ad.type", CodedField::AdType),
    );

    CanonicalRecord {
        kind: ReportKind::Ads,
        dimensions,
        metrics: ads_metrics(raw),
    }
}

/// Performance Max campaigns have no ad groups or ads, so the campaign
/// stands in for the whole entity block: its id fills the ad-group and ad id
/// columns, its name the ad-group name, and the type columns read
/// `PERFORMANCE_MAX`.
fn normalize_ads_campaign_only(raw: &RawRecord, segment: TimeSegment) -> CanonicalRecord {
    let campaign_id = raw.integer_or_zero("campaign.id");
    let campaign_name = raw.text_or_empty("campaign.name");

    let mut dimensions = ads_leading_dimensions(raw, segment);
    dimensions.insert(DimensionId::AdGroupId, Scalar::Int(campaign_id));
    dimensions.insert(DimensionId::AdGroupName, Scalar::Text(campaign_name));
    dimensions.insert(
        DimensionId::AdGroupType,
        Scalar::Text(PERFORMANCE_MAX_LABEL.to_string()),
    );
    dimensions.insert(DimensionId::AdId, Scalar::Int(campaign_id));
    dimensions.insert(
        DimensionId::AdType,
        Scalar::Text(PERFORMANCE_MAX_LABEL.to_string()),
    );

    CanonicalRecord {
        kind: ReportKind::Ads,
        dimensions,
        metrics: ads_metrics(raw),
    }
}

fn normalize_click_view(raw: &RawRecord, segment: TimeSegment) -> CanonicalRecord {
    let mut dimensions = IndexMap::new();
    dimensions.insert(DimensionId::TimeBucket, time_bucket(raw, segment));
    dimensions.insert(
        DimensionId::AccountName,
        text_dim(raw, "customer.descriptive_name"),
    );
    dimensions.insert(DimensionId::CustomerId, int_dim(raw, "customer.id"));
    dimensions.insert(DimensionId::CampaignId, int_dim(raw, "campaign.id"));
    dimensions.insert(DimensionId::CampaignName, text_dim(raw, "campaign.name"));
    dimensions.insert(
        DimensionId::ChannelType,
        coded_dim(
            raw,
            "campaign.advertising_channel_type",
            CodedField::ChannelType,
        ),
    );
    dimensions.insert(DimensionId::AdGroupId, int_dim(raw, "ad_group.id"));
    dimensions.insert(DimensionId::AdGroupName, text_dim(raw, "ad_group.name"));
    dimensions.insert(DimensionId::Gclid, text_dim(raw, "click_view.gclid"));
    dimensions.insert(
        DimensionId::KeywordMatchType,
        coded_dim(
            raw,
            "click_view.keyword_info.match_type",
            CodedField::KeywordMatchType,
        ),
    );
    dimensions.insert(
        DimensionId::KeywordText,
        Scalar::Text(raw.text_or_empty("click_view.keyword_info.text").trim().to_string()),
    );
    dimensions.insert(
        DimensionId::SerpNumber,
        int_dim(raw, "click_view.page_number"),
    );
    dimensions.insert(
        DimensionId::Device,
        coded_dim(raw, "segments.device", CodedField::Device),
    );
    dimensions.insert(
        DimensionId::ClickType,
        coded_dim(raw, "segments.click_type", CodedField::ClickType),
    );

    let mut metrics = IndexMap::new();
    metrics.insert(MetricId::Clicks, count_metric(raw, "metrics.clicks"));

    CanonicalRecord {
        kind: ReportKind::ClickView,
        dimensions,
        metrics,
    }
}

fn normalize_paid_organic(raw: &RawRecord, segment: TimeSegment) -> CanonicalRecord {
    let mut dimensions = IndexMap::new();
    dimensions.insert(DimensionId::TimeBucket, time_bucket(raw, segment));
    dimensions.insert(
        DimensionId::AccountName,
        text_dim(raw, "customer.descriptive_name"),
    );
    dimensions.insert(DimensionId::CustomerId, int_dim(raw, "customer.id"));
    dimensions.insert(DimensionId::CampaignName, text_dim(raw, "campaign.name"));
    dimensions.insert(DimensionId::CampaignId, int_dim(raw, "campaign.id"));
    dimensions.insert(
        DimensionId::ChannelType,
        coded_dim(
            raw,
            "campaign.advertising_channel_type",
            CodedField::ChannelType,
        ),
    );
    dimensions.insert(DimensionId::AdGroupName, text_dim(raw, "ad_group.name"));
    dimensions.insert(DimensionId::AdGroupId, int_dim(raw, "ad_group.id"));
    dimensions.insert(
        DimensionId::Device,
        coded_dim(raw, "segments.device", CodedField::Device),
    );
    dimensions.insert(
        DimensionId::SerpType,
        coded_dim(
            raw,
            "segments.search_engine_results_page_type",
            CodedField::SerpType,
        ),
    );
    dimensions.insert(
        DimensionId::KeywordMatchType,
        coded_dim(
            raw,
            "segments.keyword.info.match_type",
            CodedField::KeywordMatchType,
        ),
    );
    dimensions.insert(
        DimensionId::KeywordText,
        Scalar::Text(raw.text_or_empty("segments.keyword.info.text").trim().to_string()),
    );

    // The source has no spend column for this resource, so spend is rebuilt
    // per row from the quantized average CPC times paid clicks.
    let paid_clicks = raw.integer_or_zero("metrics.clicks");
    let spend = if paid_clicks > 0 {
        micros_field(raw, "metrics.average_cpc", AVERAGE_SCALE) * Decimal::from(paid_clicks)
    } else {
        Decimal::ZERO
    };
    let organic_impressions = raw.integer_or_zero("metrics.organic_impressions");
    let paid_impressions = raw.integer_or_zero("metrics.impressions");

    let mut metrics = IndexMap::new();
    metrics.insert(
        MetricId::OrganicQueries,
        count_metric(raw, "metrics.organic_queries"),
    );
    metrics.insert(
        MetricId::OrganicImpressions,
        Scalar::Int(organic_impressions),
    );
    metrics.insert(
        MetricId::OrganicClicks,
        count_metric(raw, "metrics.organic_clicks"),
    );
    metrics.insert(MetricId::PaidImpressions, Scalar::Int(paid_impressions));
    metrics.insert(MetricId::PaidClicks, Scalar::Int(paid_clicks));
    metrics.insert(MetricId::TotalCost, Scalar::Decimal(spend));
    metrics.insert(
        MetricId::TotalQueries,
        count_metric(raw, "metrics.combined_queries"),
    );
    metrics.insert(
        MetricId::TotalImpressions,
        Scalar::Int(organic_impressions + paid_impressions),
    );
    metrics.insert(
        MetricId::TotalClicks,
        count_metric(raw, "metrics.combined_clicks"),
    );

    CanonicalRecord {
        kind: ReportKind::PaidOrganicTerms,
        dimensions,
        metrics,
    }
}

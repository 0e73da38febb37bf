//! The report catalog: per-kind column layouts, metric rules, and toggles.
//!
//! Everything the engine needs to know about a report kind lives in the
//! static tables here. A dimension column names the canonical field it reads,
//! the header label it renders under, and the toggle that gates it; a metric
//! column names its accumulation mode. The aggregation fold and the output
//! layer consume these tables instead of hard-coding per-report branches.

use std::fmt;

use serde::Serialize;

use crate::canonical::{DimensionId, MetricId};
use crate::constants::money::{AVERAGE_SCALE, CURRENCY_SCALE, RATE_SCALE};

/// The five performance report kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Spend by ARC code, optionally split by campaign and channel type.
    Arc,
    /// Top-level account performance, one row per time bucket.
    Account,
    /// Ad-level performance merging entity-scoped and Performance Max rows.
    Ads,
    /// Per-click GCLID listing from the click view resource.
    ClickView,
    /// Paid and organic search term performance side by side.
    PaidOrganicTerms,
}

impl ReportKind {
    /// All kinds, in menu order.
    pub const ALL: [ReportKind; 5] = [
        ReportKind::Arc,
        ReportKind::Account,
        ReportKind::Ads,
        ReportKind::ClickView,
        ReportKind::PaidOrganicTerms,
    ];

    /// Canonical option keyword, as used in CLI arguments and errors.
    pub fn label(self) -> &'static str {
        match self {
            ReportKind::Arc => "arc",
            ReportKind::Account => "account",
            ReportKind::Ads => "ads",
            ReportKind::ClickView => "clickview",
            ReportKind::PaidOrganicTerms => "paid_organic_terms",
        }
    }

    /// Menu title shown when selecting a report interactively.
    pub fn title(self) -> &'static str {
        match self {
            ReportKind::Arc => "ARC Report",
            ReportKind::Account => "Account Report",
            ReportKind::Ads => "Ads Report",
            ReportKind::ClickView => "GCLID/ClickView Report",
            ReportKind::PaidOrganicTerms => "Paid and Organic Search Terms Report",
        }
    }

    /// Resolve a report option keyword or alias.
    ///
    /// # Examples
    ///
    /// ```
    /// use adreport::reports::ReportKind;
    ///
    /// assert_eq!(ReportKind::from_alias("gclid"), Some(ReportKind::ClickView));
    /// assert_eq!(ReportKind::from_alias("ad"), Some(ReportKind::Ads));
    /// assert_eq!(ReportKind::from_alias("nonsense"), None);
    /// ```
    pub fn from_alias(alias: &str) -> Option<ReportKind> {
        match alias.trim().to_ascii_lowercase().as_str() {
            "arc" => Some(ReportKind::Arc),
            "account" | "accounts" => Some(ReportKind::Account),
            "ads" | "ad" => Some(ReportKind::Ads),
            "clickview" | "click_view" | "gclid" => Some(ReportKind::ClickView),
            "paid_organic_terms" | "paid-organic" | "paidorganic" => {
                Some(ReportKind::PaidOrganicTerms)
            }
            _ => None,
        }
    }

    /// Whether the source restricts this kind to a single reporting day.
    ///
    /// The click view resource only answers one day at a time.
    pub fn single_day_only(self) -> bool {
        matches!(self, ReportKind::ClickView)
    }

    /// Metric that breaks ties after the time bucket when sorting,
    /// descending.
    pub fn volume_metric(self) -> MetricId {
        match self {
            ReportKind::Arc | ReportKind::Account | ReportKind::Ads => MetricId::Cost,
            ReportKind::ClickView => MetricId::Clicks,
            ReportKind::PaidOrganicTerms => MetricId::TotalClicks,
        }
    }

    /// The full dimension layout, gated columns included.
    pub fn dimension_columns(self) -> &'static [DimensionColumn] {
        match self {
            ReportKind::Arc => ARC_DIMENSIONS,
            ReportKind::Account => ACCOUNT_DIMENSIONS,
            ReportKind::Ads => ADS_DIMENSIONS,
            ReportKind::ClickView => CLICK_VIEW_DIMENSIONS,
            ReportKind::PaidOrganicTerms => PAID_ORGANIC_DIMENSIONS,
        }
    }

    /// The metric columns, in output order.
    pub fn metric_columns(self) -> &'static [MetricColumn] {
        match self {
            ReportKind::Arc => ARC_METRICS,
            ReportKind::Account => ACCOUNT_METRICS,
            ReportKind::Ads => ADS_METRICS,
            ReportKind::ClickView => CLICK_VIEW_METRICS,
            ReportKind::PaidOrganicTerms => PAID_ORGANIC_METRICS,
        }
    }

    /// Dimension columns selected by `toggles`, in layout order.
    ///
    /// Two calls with the same toggles return the same columns in the same
    /// order; the grouping key and the headers both derive from this list.
    pub fn selected_dimensions(self, toggles: &ToggleSet) -> Vec<DimensionColumn> {
        self.dimension_columns()
            .iter()
            .filter(|column| column.gate.map_or(true, |gate| toggles.is_enabled(gate)))
            .copied()
            .collect()
    }

    /// Header row for this kind under `toggles`: dimensions, then metrics.
    pub fn headers(self, toggles: &ToggleSet) -> Vec<String> {
        self.selected_dimensions(toggles)
            .iter()
            .map(|column| column.header.to_string())
            .chain(
                self.metric_columns()
                    .iter()
                    .map(|column| column.header.to_string()),
            )
            .collect()
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Top-level reporting categories, as listed on the main menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportScope {
    /// Aggregated performance reporting.
    Performance,
    /// Per-account audit listings.
    Audit,
    /// Budget reporting.
    Budget,
}

impl ReportScope {
    /// All scopes, in menu order.
    pub const ALL: [ReportScope; 3] = [
        ReportScope::Performance,
        ReportScope::Audit,
        ReportScope::Budget,
    ];

    /// Canonical scope keyword.
    pub fn label(self) -> &'static str {
        match self {
            ReportScope::Performance => "performance",
            ReportScope::Audit => "audit",
            ReportScope::Budget => "budget",
        }
    }

    /// Menu title shown on the main menu.
    pub fn title(self) -> &'static str {
        match self {
            ReportScope::Performance => "Performance Reporting",
            ReportScope::Audit => "Account Auditing",
            ReportScope::Budget => "Budget Reporting",
        }
    }

    /// Resolve a scope keyword or alias.
    pub fn from_alias(alias: &str) -> Option<ReportScope> {
        match alias.trim().to_ascii_lowercase().as_str() {
            "performance" | "perf" | "p" => Some(ReportScope::Performance),
            "auditing" | "audit" | "a" => Some(ReportScope::Audit),
            "budget" | "budgets" | "b" => Some(ReportScope::Budget),
            _ => None,
        }
    }
}

impl fmt::Display for ReportScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shape of a raw row's source: whether it carries real ad-group/ad identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceShape {
    /// Rows scoped to an ad entity (ad group and ad ids are real).
    EntityScoped,
    /// Campaign-scoped rows (Performance Max; no ad group or ad exists).
    CampaignOnly,
}

/// Optional dimension blocks a request can switch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    /// Campaign id/name columns.
    CampaignInfo,
    /// Advertising channel type column.
    ChannelType,
    /// Ad group and ad identity columns.
    AdGroupInfo,
    /// Device segmentation column.
    DeviceInfo,
}

impl Toggle {
    /// All toggles, in canonical column order.
    pub const ALL: [Toggle; 4] = [
        Toggle::CampaignInfo,
        Toggle::ChannelType,
        Toggle::AdGroupInfo,
        Toggle::DeviceInfo,
    ];

    /// Whether this toggle affects the layout of `kind`.
    pub fn applies_to(self, kind: ReportKind) -> bool {
        match self {
            Toggle::CampaignInfo | Toggle::ChannelType => !matches!(kind, ReportKind::Account),
            Toggle::AdGroupInfo => matches!(
                kind,
                ReportKind::Ads | ReportKind::ClickView | ReportKind::PaidOrganicTerms
            ),
            Toggle::DeviceInfo => {
                matches!(kind, ReportKind::ClickView | ReportKind::PaidOrganicTerms)
            }
        }
    }

    /// CLI option that sets this toggle.
    pub fn cli_option(self) -> &'static str {
        match self {
            Toggle::CampaignInfo => "--campaign-info",
            Toggle::ChannelType => "--channel-types",
            Toggle::AdGroupInfo => "--ad-group",
            Toggle::DeviceInfo => "--device",
        }
    }

    /// Short description used in prompts and ignore notices.
    pub fn label(self) -> &'static str {
        match self {
            Toggle::CampaignInfo => "campaign metadata",
            Toggle::ChannelType => "channel type segmentation",
            Toggle::AdGroupInfo => "ad group metadata",
            Toggle::DeviceInfo => "device segmentation",
        }
    }
}

/// A request's toggle switches. Everything defaults to excluded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ToggleSet {
    /// Include campaign id/name columns.
    pub campaign_info: bool,
    /// Include the channel type column.
    pub channel_type: bool,
    /// Include ad group / ad identity columns.
    pub ad_group_info: bool,
    /// Include the device column.
    pub device_info: bool,
}

impl ToggleSet {
    /// Whether `toggle` is switched on.
    pub fn is_enabled(self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::CampaignInfo => self.campaign_info,
            Toggle::ChannelType => self.channel_type,
            Toggle::AdGroupInfo => self.ad_group_info,
            Toggle::DeviceInfo => self.device_info,
        }
    }

    /// Switch `toggle` on or off.
    pub fn set(&mut self, toggle: Toggle, enabled: bool) {
        match toggle {
            Toggle::CampaignInfo => self.campaign_info = enabled,
            Toggle::ChannelType => self.channel_type = enabled,
            Toggle::AdGroupInfo => self.ad_group_info = enabled,
            Toggle::DeviceInfo => self.device_info = enabled,
        }
    }

    /// Builder-style variant of [`ToggleSet::set`].
    pub fn with(mut self, toggle: Toggle) -> Self {
        self.set(toggle, true);
        self
    }

    /// Enabled toggles that `kind` does not support, in canonical order.
    ///
    /// These are ignored by the layout tables; callers surface them as a
    /// notice instead of failing the request.
    pub fn ignored_by(self, kind: ReportKind) -> Vec<Toggle> {
        Toggle::ALL
            .into_iter()
            .filter(|toggle| self.is_enabled(*toggle) && !toggle.applies_to(kind))
            .collect()
    }
}

/// One dimension column of a report layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DimensionColumn {
    /// Canonical record field backing the column.
    pub id: DimensionId,
    /// Header label rendered for the column.
    pub header: &'static str,
    /// Toggle controlling the column; `None` means always present.
    pub gate: Option<Toggle>,
}

/// One metric column of a report and how it accumulates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MetricColumn {
    /// Canonical record metric backing the column.
    pub id: MetricId,
    /// Header label rendered for the column.
    pub header: &'static str,
    /// Accumulation and finalization rule.
    pub mode: MetricMode,
}

/// How a metric column accumulates across records and finalizes into a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricMode {
    /// Integer count summed across records.
    CountSum,
    /// Decimal sum, re-quantized at `scale` when finalized.
    DecimalSum {
        /// Fractional digits of the finalized sum.
        scale: u32,
    },
    /// Mean of a per-record rate weighted by another metric in the record.
    ///
    /// Accumulates `value * weight` and `weight`; finalizes as their
    /// quotient at rate precision, or zero when no weight accumulated.
    WeightedRate {
        /// Metric whose per-record value weights each sample.
        weight: MetricId,
    },
    /// Quotient of two accumulated sums, quantized at `scale`.
    ///
    /// Never divides by zero: a zero denominator finalizes as zero at
    /// `scale`. `per_mille` multiplies the quotient by 1000 (CPM).
    RatioOfSums {
        /// Metric summed into the numerator.
        numerator: MetricId,
        /// Metric summed into the denominator.
        denominator: MetricId,
        /// Fractional digits of the finalized quotient.
        scale: u32,
        /// Scale the quotient per mille instead of per unit.
        per_mille: bool,
    },
}

const fn always(id: DimensionId, header: &'static str) -> DimensionColumn {
    DimensionColumn {
        id,
        header,
        gate: None,
    }
}

const fn when(gate: Toggle, id: DimensionId, header: &'static str) -> DimensionColumn {
    DimensionColumn {
        id,
        header,
        gate: Some(gate),
    }
}

const fn count(id: MetricId, header: &'static str) -> MetricColumn {
    MetricColumn {
        id,
        header,
        mode: MetricMode::CountSum,
    }
}

const fn money_sum(id: MetricId, header: &'static str) -> MetricColumn {
    MetricColumn {
        id,
        header,
        mode: MetricMode::DecimalSum {
            scale: CURRENCY_SCALE,
        },
    }
}

const fn weighted(id: MetricId, header: &'static str, weight: MetricId) -> MetricColumn {
    MetricColumn {
        id,
        header,
        mode: MetricMode::WeightedRate { weight },
    }
}

const fn ratio(
    id: MetricId,
    header: &'static str,
    numerator: MetricId,
    denominator: MetricId,
    scale: u32,
) -> MetricColumn {
    MetricColumn {
        id,
        header,
        mode: MetricMode::RatioOfSums {
            numerator,
            denominator,
            scale,
            per_mille: false,
        },
    }
}

const fn ratio_per_mille(
    id: MetricId,
    header: &'static str,
    numerator: MetricId,
    denominator: MetricId,
) -> MetricColumn {
    MetricColumn {
        id,
        header,
        mode: MetricMode::RatioOfSums {
            numerator,
            denominator,
            scale: AVERAGE_SCALE,
            per_mille: true,
        },
    }
}

const ARC_DIMENSIONS: &[DimensionColumn] = &[
    always(DimensionId::TimeBucket, "Date"),
    always(DimensionId::AccountName, "Account name"),
    always(DimensionId::CustomerId, "Customer ID"),
    when(Toggle::CampaignInfo, DimensionId::CampaignName, "Campaign"),
    when(Toggle::ChannelType, DimensionId::ChannelType, "Campaign type"),
    always(DimensionId::Arc, "ARC"),
];

const ARC_METRICS: &[MetricColumn] = &[money_sum(MetricId::Cost, "Cost")];

const ACCOUNT_DIMENSIONS: &[DimensionColumn] = &[
    always(DimensionId::TimeBucket, "date"),
    always(DimensionId::AccountName, "account"),
    always(DimensionId::CustomerId, "customer id"),
];

const ACCOUNT_METRICS: &[MetricColumn] = &[
    money_sum(MetricId::Cost, "cost"),
    count(MetricId::Clicks, "clicks"),
    count(MetricId::InvalidClicks, "invalid clicks"),
    ratio(
        MetricId::InvalidClickRate,
        "invalid click %",
        MetricId::InvalidClicks,
        MetricId::Clicks,
        RATE_SCALE,
    ),
    count(MetricId::Interactions, "interactions"),
    count(MetricId::Impressions, "impressions"),
    ratio(
        MetricId::Ctr,
        "ctr",
        MetricId::Clicks,
        MetricId::Impressions,
        RATE_SCALE,
    ),
    ratio(
        MetricId::AvgCpc,
        "avg cpc",
        MetricId::Cost,
        MetricId::Clicks,
        AVERAGE_SCALE,
    ),
    ratio_per_mille(
        MetricId::AvgCpm,
        "avg cpm",
        MetricId::Cost,
        MetricId::Impressions,
    ),
    weighted(
        MetricId::AbsTopImpressionShare,
        "abs top is",
        MetricId::Impressions,
    ),
    weighted(
        MetricId::TopImpressionShare,
        "top is %",
        MetricId::Impressions,
    ),
];

const ADS_DIMENSIONS: &[DimensionColumn] = &[
    always(DimensionId::TimeBucket, "Date"),
    always(DimensionId::CustomerId, "Customer ID"),
    always(DimensionId::AccountName, "Account name"),
    always(DimensionId::Arc, "ARC"),
    when(Toggle::CampaignInfo, DimensionId::CampaignId, "Campaign ID"),
    when(
        Toggle::CampaignInfo,
        DimensionId::CampaignName,
        "Campaign name",
    ),
    when(Toggle::ChannelType, DimensionId::ChannelType, "Campaign type"),
    when(Toggle::AdGroupInfo, DimensionId::AdGroupId, "Ad group ID"),
    when(Toggle::AdGroupInfo, DimensionId::AdGroupName, "Ad group name"),
    when(Toggle::AdGroupInfo, DimensionId::AdGroupType, "Ad group type"),
    when(Toggle::AdGroupInfo, DimensionId::AdId, "Ad ID"),
    when(Toggle::AdGroupInfo, DimensionId::AdType, "Ad type"),
];

const ADS_METRICS: &[MetricColumn] = &[
    money_sum(MetricId::Cost, "Cost"),
    count(MetricId::Impressions, "Impr."),
    weighted(
        MetricId::AbsTopImpressionShare,
        "Abs Top Imp%",
        MetricId::Impressions,
    ),
    weighted(
        MetricId::TopImpressionShare,
        "Top Imp%",
        MetricId::Impressions,
    ),
    ratio_per_mille(
        MetricId::AvgCpm,
        "Avg CPM",
        MetricId::Cost,
        MetricId::Impressions,
    ),
    count(MetricId::Interactions, "Interactions"),
    count(MetricId::Clicks, "Clicks"),
    ratio(
        MetricId::AvgCpc,
        "Avg CPC",
        MetricId::Cost,
        MetricId::Clicks,
        AVERAGE_SCALE,
    ),
    count(MetricId::VideoViews, "Video Views"),
    money_sum(MetricId::Conversions, "Conversions"),
    money_sum(MetricId::ConversionValue, "Conv. value"),
];

const CLICK_VIEW_DIMENSIONS: &[DimensionColumn] = &[
    always(DimensionId::TimeBucket, "Date"),
    always(DimensionId::AccountName, "Account name"),
    always(DimensionId::CustomerId, "Customer ID"),
    when(Toggle::CampaignInfo, DimensionId::CampaignId, "Campaign ID"),
    when(
        Toggle::CampaignInfo,
        DimensionId::CampaignName,
        "Campaign name",
    ),
    when(Toggle::ChannelType, DimensionId::ChannelType, "Campaign type"),
    when(Toggle::AdGroupInfo, DimensionId::AdGroupId, "Ad group ID"),
    when(Toggle::AdGroupInfo, DimensionId::AdGroupName, "Ad group name"),
    always(DimensionId::Gclid, "gclid"),
    always(DimensionId::KeywordMatchType, "keyword match type"),
    always(DimensionId::KeywordText, "keyword text"),
    always(DimensionId::SerpNumber, "SERP #"),
    when(Toggle::DeviceInfo, DimensionId::Device, "device"),
    always(DimensionId::ClickType, "click type"),
];

const CLICK_VIEW_METRICS: &[MetricColumn] = &[count(MetricId::Clicks, "clicks")];

const PAID_ORGANIC_DIMENSIONS: &[DimensionColumn] = &[
    always(DimensionId::TimeBucket, "Date"),
    always(DimensionId::AccountName, "Account name"),
    always(DimensionId::CustomerId, "Customer ID"),
    when(
        Toggle::CampaignInfo,
        DimensionId::CampaignName,
        "Campaign name",
    ),
    when(Toggle::CampaignInfo, DimensionId::CampaignId, "Campaign ID"),
    when(Toggle::ChannelType, DimensionId::ChannelType, "Campaign type"),
    when(Toggle::AdGroupInfo, DimensionId::AdGroupName, "Ad group name"),
    when(Toggle::AdGroupInfo, DimensionId::AdGroupId, "Ad group ID"),
    when(Toggle::DeviceInfo, DimensionId::Device, "device"),
    always(DimensionId::SerpType, "SERP type"),
    always(DimensionId::KeywordMatchType, "keyword match type"),
    always(DimensionId::KeywordText, "keyword text"),
];

const PAID_ORGANIC_METRICS: &[MetricColumn] = &[
    count(MetricId::OrganicQueries, "org queries"),
    count(MetricId::OrganicImpressions, "org impr"),
    ratio(
        MetricId::OrganicImpressionsPerQuery,
        "org impr per query",
        MetricId::OrganicImpressions,
        MetricId::OrganicQueries,
        RATE_SCALE,
    ),
    count(MetricId::OrganicClicks, "org clicks"),
    ratio(
        MetricId::OrganicClicksPerQuery,
        "org clicks per query",
        MetricId::OrganicClicks,
        MetricId::OrganicQueries,
        RATE_SCALE,
    ),
    count(MetricId::PaidImpressions, "paid impr"),
    count(MetricId::PaidClicks, "paid clicks"),
    ratio(
        MetricId::PaidCtr,
        "paid ctr",
        MetricId::PaidClicks,
        MetricId::PaidImpressions,
        RATE_SCALE,
    ),
    ratio(
        MetricId::AvgCpc,
        "avg cpc",
        MetricId::TotalCost,
        MetricId::PaidClicks,
        AVERAGE_SCALE,
    ),
    money_sum(MetricId::TotalCost, "total cost"),
    count(MetricId::TotalQueries, "total queries"),
    count(MetricId::TotalImpressions, "total impr"),
    count(MetricId::TotalClicks, "total clicks"),
    ratio(
        MetricId::TotalClicksPerQuery,
        "total clicks per query",
        MetricId::TotalClicks,
        MetricId::TotalQueries,
        RATE_SCALE,
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn header_list(kind: ReportKind, toggles: &ToggleSet) -> Vec<&'static str> {
        kind.selected_dimensions(toggles)
            .iter()
            .map(|column| column.header)
            .collect()
    }

    #[test]
    fn default_toggles_keep_only_mandatory_columns() {
        let toggles = ToggleSet::default();
        assert_eq!(
            header_list(ReportKind::Arc, &toggles),
            ["Date", "Account name", "Customer ID", "ARC"]
        );
        assert_eq!(
            header_list(ReportKind::Ads, &toggles),
            ["Date", "Customer ID", "Account name", "ARC"]
        );
    }

    #[test]
    fn ads_layout_orders_toggled_blocks_canonically() {
        let toggles = ToggleSet {
            campaign_info: true,
            channel_type: true,
            ad_group_info: true,
            device_info: false,
        };
        assert_eq!(
            header_list(ReportKind::Ads, &toggles),
            [
                "Date",
                "Customer ID",
                "Account name",
                "ARC",
                "Campaign ID",
                "Campaign name",
                "Campaign type",
                "Ad group ID",
                "Ad group name",
                "Ad group type",
                "Ad ID",
                "Ad type",
            ]
        );
    }

    #[test]
    fn click_view_device_column_sits_between_serp_and_click_type() {
        let toggles = ToggleSet::default().with(Toggle::DeviceInfo);
        assert_eq!(
            header_list(ReportKind::ClickView, &toggles),
            [
                "Date",
                "Account name",
                "Customer ID",
                "gclid",
                "keyword match type",
                "keyword text",
                "SERP #",
                "device",
                "click type",
            ]
        );
    }

    #[test]
    fn paid_organic_campaign_block_is_name_first() {
        let toggles = ToggleSet::default().with(Toggle::CampaignInfo);
        let headers = header_list(ReportKind::PaidOrganicTerms, &toggles);
        assert_eq!(headers[3], "Campaign name");
        assert_eq!(headers[4], "Campaign ID");
    }

    #[test]
    fn account_headers_join_dimensions_and_metrics() {
        let headers = ReportKind::Account.headers(&ToggleSet::default());
        assert_eq!(
            headers,
            [
                "date",
                "account",
                "customer id",
                "cost",
                "clicks",
                "invalid clicks",
                "invalid click %",
                "interactions",
                "impressions",
                "ctr",
                "avg cpc",
                "avg cpm",
                "abs top is",
                "top is %",
            ]
        );
    }

    #[test]
    fn toggle_applicability_matches_the_catalog() {
        for toggle in [Toggle::CampaignInfo, Toggle::ChannelType] {
            assert!(toggle.applies_to(ReportKind::Arc));
            assert!(toggle.applies_to(ReportKind::Ads));
            assert!(toggle.applies_to(ReportKind::ClickView));
            assert!(toggle.applies_to(ReportKind::PaidOrganicTerms));
            assert!(!toggle.applies_to(ReportKind::Account));
        }
        assert!(!Toggle::AdGroupInfo.applies_to(ReportKind::Arc));
        assert!(Toggle::AdGroupInfo.applies_to(ReportKind::Ads));
        assert!(!Toggle::DeviceInfo.applies_to(ReportKind::Ads));
        assert!(Toggle::DeviceInfo.applies_to(ReportKind::ClickView));
        assert!(Toggle::DeviceInfo.applies_to(ReportKind::PaidOrganicTerms));
    }

    #[test]
    fn applicability_agrees_with_the_layout_tables() {
        // A toggle applies exactly when some column of the kind is gated on it.
        for kind in ReportKind::ALL {
            for toggle in Toggle::ALL {
                let gated = kind
                    .dimension_columns()
                    .iter()
                    .any(|column| column.gate == Some(toggle));
                assert_eq!(
                    gated,
                    toggle.applies_to(kind),
                    "{toggle:?} on {kind:?}",
                );
            }
        }
    }

    #[test]
    fn inapplicable_toggles_are_reported_not_applied() {
        let toggles = ToggleSet {
            campaign_info: true,
            channel_type: false,
            ad_group_info: true,
            device_info: true,
        };
        assert_eq!(
            toggles.ignored_by(ReportKind::Arc),
            [Toggle::AdGroupInfo, Toggle::DeviceInfo]
        );
        assert!(toggles.ignored_by(ReportKind::PaidOrganicTerms).is_empty());
        // Layout is unaffected by inapplicable toggles either way.
        assert_eq!(
            ReportKind::Arc.selected_dimensions(&toggles),
            ReportKind::Arc
                .selected_dimensions(&ToggleSet::default().with(Toggle::CampaignInfo))
        );
    }

    #[test]
    fn every_ratio_operand_is_an_accumulated_metric() {
        for kind in ReportKind::ALL {
            let accumulated: Vec<MetricId> = kind
                .metric_columns()
                .iter()
                .filter(|column| {
                    matches!(
                        column.mode,
                        MetricMode::CountSum | MetricMode::DecimalSum { .. }
                    )
                })
                .map(|column| column.id)
                .collect();
            for column in kind.metric_columns() {
                match column.mode {
                    MetricMode::RatioOfSums {
                        numerator,
                        denominator,
                        ..
                    } => {
                        assert!(accumulated.contains(&numerator), "{kind:?} {column:?}");
                        assert!(accumulated.contains(&denominator), "{kind:?} {column:?}");
                    }
                    MetricMode::WeightedRate { weight } => {
                        assert!(accumulated.contains(&weight), "{kind:?} {column:?}");
                    }
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn volume_metric_is_listed_for_every_kind() {
        for kind in ReportKind::ALL {
            let volume = kind.volume_metric();
            assert!(
                kind.metric_columns()
                    .iter()
                    .any(|column| column.id == volume),
                "{kind:?}"
            );
        }
    }

    #[test]
    fn aliases_resolve_to_kinds() {
        assert_eq!(ReportKind::from_alias("accounts"), Some(ReportKind::Account));
        assert_eq!(
            ReportKind::from_alias("click_view"),
            Some(ReportKind::ClickView)
        );
        assert_eq!(
            ReportKind::from_alias("paid-organic"),
            Some(ReportKind::PaidOrganicTerms)
        );
        assert_eq!(ReportKind::from_alias("ARC"), Some(ReportKind::Arc));
    }

    #[test]
    fn scope_aliases_resolve() {
        assert_eq!(
            ReportScope::from_alias("perf"),
            Some(ReportScope::Performance)
        );
        assert_eq!(ReportScope::from_alias("p"), Some(ReportScope::Performance));
        assert_eq!(ReportScope::from_alias("auditing"), Some(ReportScope::Audit));
        assert_eq!(ReportScope::from_alias("A"), Some(ReportScope::Audit));
        assert_eq!(ReportScope::from_alias("budgets"), Some(ReportScope::Budget));
        assert_eq!(ReportScope::from_alias("quarterly"), None);
    }
}

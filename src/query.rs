//! Query text builders for performance reports, account listing, and audits.
//!
//! Queries follow the Google Ads Query Language shape: a `SELECT` list of
//! dotted field paths, a `FROM` resource, a `WHERE` chain joined with `AND`
//! (dated queries lead with `segments.date BETWEEN`), and an optional
//! `ORDER BY`. Select lists carry exactly the fields the normalizers read;
//! ratio metrics the engine finalizes itself are never fetched.

use crate::dates::{DateRange, TimeSegment};
use crate::reports::{ReportKind, SourceShape};
use crate::source::RecordQuery;

/// Queries to issue for one performance report, paired with the shape each
/// result set arrives in. The ads report spans two resources because
/// Performance Max campaigns never surface through `ad_group_ad`.
pub fn for_report(
    kind: ReportKind,
    range: &DateRange,
    segment: TimeSegment,
) -> Vec<(SourceShape, RecordQuery)> {
    match kind {
        ReportKind::Arc => vec![(SourceShape::EntityScoped, arc_report(range, segment))],
        ReportKind::Account => vec![(SourceShape::EntityScoped, account_report(range, segment))],
        ReportKind::Ads => vec![
            (SourceShape::EntityScoped, ad_entity_report(range, segment)),
            (SourceShape::CampaignOnly, pmax_campaign_report(range, segment)),
        ],
        ReportKind::ClickView => {
            vec![(SourceShape::EntityScoped, click_view_report(range, segment))]
        }
        ReportKind::PaidOrganicTerms => {
            vec![(SourceShape::EntityScoped, paid_organic_report(range, segment))]
        }
    }
}

/// Campaign-level spend by ARC suffix.
pub fn arc_report(range: &DateRange, segment: TimeSegment) -> RecordQuery {
    dated(
        "campaign",
        segment,
        &[
            "customer.descriptive_name",
            "customer.id",
            "campaign.name",
            "campaign.advertising_channel_type",
            "metrics.cost_micros",
        ],
        range,
        &[],
        &[],
    )
}

/// Account-level performance rollup.
pub fn account_report(range: &DateRange, segment: TimeSegment) -> RecordQuery {
    dated(
        "customer",
        segment,
        &[
            "customer.descriptive_name",
            "customer.id",
            "metrics.clicks",
            "metrics.invalid_clicks",
            "metrics.impressions",
            "metrics.interactions",
            "metrics.cost_micros",
            "metrics.absolute_top_impression_percentage",
            "metrics.top_impression_percentage",
        ],
        range,
        &["customer.status = 'ENABLED'"],
        &["customer.descriptive_name DESC"],
    )
}

/// Ad-level rows for every campaign type that has ad groups.
pub fn ad_entity_report(range: &DateRange, segment: TimeSegment) -> RecordQuery {
    dated(
        "ad_group_ad",
        segment,
        &[
            "customer.id",
            "customer.descriptive_name",
            "campaign.id",
            "campaign.name",
            "campaign.advertising_channel_type",
            "ad_group.id",
            "ad_group.name",
            "ad_group.type",
            "ad_group_ad.ad.id",
            "ad_group_ad.ad.type",
            "metrics.cost_micros",
            "metrics.impressions",
            "metrics.absolute_top_impression_percentage",
            "metrics.top_impression_percentage",
            "metrics.video_views",
            "metrics.clicks",
            "metrics.interactions",
            "metrics.conversions",
            "metrics.conversions_value",
        ],
        range,
        &["customer.status = 'ENABLED'"],
        &["customer.descriptive_name ASC", "campaign.name ASC"],
    )
}

/// Campaign-level rows for Performance Max, which exposes no ad groups.
pub fn pmax_campaign_report(range: &DateRange, segment: TimeSegment) -> RecordQuery {
    dated(
        "campaign",
        segment,
        &[
            "customer.id",
            "customer.descriptive_name",
            "campaign.id",
            "campaign.name",
            "campaign.advertising_channel_type",
            "metrics.cost_micros",
            "metrics.impressions",
            "metrics.absolute_top_impression_percentage",
            "metrics.top_impression_percentage",
            "metrics.video_views",
            "metrics.clicks",
            "metrics.interactions",
            "metrics.conversions",
            "metrics.conversions_value",
        ],
        range,
        &[
            "campaign.advertising_channel_type = 'PERFORMANCE_MAX'",
            "customer.status = 'ENABLED'",
        ],
        &["customer.descriptive_name ASC", "campaign.name ASC"],
    )
}

/// Per-click rows; the resource only exists for single days.
pub fn click_view_report(range: &DateRange, segment: TimeSegment) -> RecordQuery {
    dated(
        "click_view",
        segment,
        &[
            "customer.descriptive_name",
            "customer.id",
            "campaign.name",
            "campaign.id",
            "campaign.advertising_channel_type",
            "ad_group.name",
            "ad_group.id",
            "click_view.gclid",
            "click_view.keyword_info.match_type",
            "click_view.keyword_info.text",
            "click_view.page_number",
            "segments.device",
            "segments.click_type",
            "metrics.clicks",
        ],
        range,
        &["metrics.clicks > 0"],
        &[
            "customer.descriptive_name ASC",
            "campaign.name ASC",
            "ad_group.name ASC",
        ],
    )
}

/// Paid versus organic search-term rows.
pub fn paid_organic_report(range: &DateRange, segment: TimeSegment) -> RecordQuery {
    dated(
        "paid_organic_search_term_view",
        segment,
        &[
            "segments.search_engine_results_page_type",
            "segments.keyword.info.match_type",
            "segments.keyword.info.text",
            "segments.device",
            "customer.id",
            "customer.descriptive_name",
            "campaign.id",
            "campaign.name",
            "campaign.advertising_channel_type",
            "ad_group.id",
            "ad_group.name",
            "metrics.organic_queries",
            "metrics.organic_impressions",
            "metrics.organic_clicks",
            "metrics.impressions",
            "metrics.clicks",
            "metrics.average_cpc",
            "metrics.combined_queries",
            "metrics.combined_clicks",
        ],
        range,
        &[],
        &[
            "customer.descriptive_name DESC",
            "campaign.name ASC",
            "metrics.clicks DESC",
        ],
    )
}

/// Non-manager, visible, enabled client accounts under a login customer.
pub fn account_listing() -> RecordQuery {
    undated(
        "customer_client",
        &[
            "customer_client.client_customer",
            "customer_client.level",
            "customer_client.manager",
            "customer_client.descriptive_name",
            "customer_client.id",
        ],
        &[
            "customer_client.level <= 10",
            "customer_client.status = 'ENABLED'",
            "customer_client.hidden = FALSE",
        ],
        &["customer_client.descriptive_name ASC"],
    )
}

/// Enabled labels, by name.
pub fn labels() -> RecordQuery {
    undated(
        "label",
        &["label.name", "label.id"],
        &["label.status = 'ENABLED'"],
        &["label.name ASC"],
    )
}

/// Enabled campaign groups, by name.
pub fn campaign_groups() -> RecordQuery {
    undated(
        "campaign_group",
        &["campaign_group.name", "campaign_group.id"],
        &["campaign_group.status = 'ENABLED'"],
        &["campaign_group.name ASC"],
    )
}

/// Campaign and ad-group rows with their label and group attachments.
pub fn label_assignments() -> RecordQuery {
    undated(
        "ad_group",
        &[
            "customer.id",
            "customer.descriptive_name",
            "campaign.id",
            "campaign.name",
            "campaign.advertising_channel_type",
            "campaign.campaign_group",
            "campaign.labels",
            "ad_group.id",
            "ad_group.name",
            "ad_group.type",
            "ad_group.labels",
        ],
        &["ad_group.status != 'REMOVED'"],
        &[
            "customer.descriptive_name ASC",
            "campaign.name ASC",
            "ad_group.name ASC",
        ],
    )
}

/// Dated query: the segment field leads the select list and the ordering,
/// and the date window leads the `WHERE` chain.
fn dated(
    resource: &str,
    segment: TimeSegment,
    fields: &[&str],
    range: &DateRange,
    extra_where: &[&str],
    order_tail: &[&str],
) -> RecordQuery {
    let mut select = vec![segment.field_path().to_string()];
    select.extend(fields.iter().map(ToString::to_string));

    let date_clause = format!(
        "segments.date BETWEEN '{}' AND '{}'",
        range.start, range.end
    );
    let mut clauses = vec![date_clause];
    clauses.extend(extra_where.iter().map(ToString::to_string));

    let mut order = vec![format!("{} ASC", segment.field_path())];
    order.extend(order_tail.iter().map(ToString::to_string));

    assemble(resource, &select, &clauses, &order)
}

fn undated(resource: &str, fields: &[&str], clauses: &[&str], order: &[&str]) -> RecordQuery {
    let select: Vec<String> = fields.iter().map(ToString::to_string).collect();
    let clauses: Vec<String> = clauses.iter().map(ToString::to_string).collect();
    let order: Vec<String> = order.iter().map(ToString::to_string).collect();
    assemble(resource, &select, &clauses, &order)
}

fn assemble(
    resource: &str,
    select: &[String],
    clauses: &[String],
    order: &[String],
) -> RecordQuery {
    let mut text = String::from("SELECT\n    ");
    text.push_str(&select.join(",\n    "));
    text.push_str("\nFROM ");
    text.push_str(resource);
    if !clauses.is_empty() {
        text.push_str("\nWHERE ");
        text.push_str(&clauses.join(" AND "));
    }
    if !order.is_empty() {
        text.push_str("\nORDER BY ");
        text.push_str(&order.join(", "));
    }
    RecordQuery {
        resource: resource.to_string(),
        text,
    }
}

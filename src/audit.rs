//! Audit listings: labels, campaign groups, and label assignments.
//!
//! Unlike the performance reports these are flat per-account listings with
//! no aggregation; they exist to answer "what is tagged with what" during
//! account hygiene reviews. Label and campaign-group attachments arrive as
//! resource names, so the assignment listing first fetches both id → name
//! maps and resolves attachments through them.

use indexmap::IndexMap;
use tracing::debug;

use crate::canonical::Scalar;
use crate::constants::normalize::UNDEFINED_VALUE;
use crate::enums::{decode, CodedField};
use crate::errors::ReportError;
use crate::pipeline::ReportTable;
use crate::query;
use crate::source::RecordSource;

const LABEL_HEADERS: [&str; 2] = ["Label Name", "Label ID"];
const CAMPAIGN_GROUP_HEADERS: [&str; 2] = ["Campaign Group Name", "Campaign Group ID"];
const ASSIGNMENT_HEADERS: [&str; 11] = [
    "account id",
    "account name",
    "campaign id",
    "campaign name",
    "campaign type",
    "campaign group",
    "campaign labels",
    "ad_group id",
    "ad_group name",
    "ad_group type",
    "ad_group labels",
];

/// The three audit listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuditKind {
    /// Enabled labels and their ids.
    AccountLabels,
    /// Enabled campaign groups and their ids.
    CampaignGroups,
    /// Campaigns and ad groups with resolved group and label names.
    LabelAssignments,
}

impl AuditKind {
    /// All listings, in menu order.
    pub const ALL: [AuditKind; 3] = [
        AuditKind::AccountLabels,
        AuditKind::CampaignGroups,
        AuditKind::LabelAssignments,
    ];

    /// Canonical option keyword, as used in CLI arguments.
    pub fn label(self) -> &'static str {
        match self {
            AuditKind::AccountLabels => "account_labels",
            AuditKind::CampaignGroups => "campaign_groups",
            AuditKind::LabelAssignments => "label_assignments",
        }
    }

    /// Menu title shown when selecting a listing interactively.
    pub fn title(self) -> &'static str {
        match self {
            AuditKind::AccountLabels => "Account Labels List",
            AuditKind::CampaignGroups => "Campaign Group List",
            AuditKind::LabelAssignments => "Campaign and Ad Group Label Assignments",
        }
    }

    /// Line printed when the listing is selected.
    pub fn headline(self) -> &'static str {
        match self {
            AuditKind::AccountLabels => "Account Labels Only Audit selected...",
            AuditKind::CampaignGroups => "Campaign Group Only Audit selected...",
            AuditKind::LabelAssignments => {
                "Campaign and Ad Group Label Assignments Audit selected..."
            }
        }
    }

    /// Resolve an option keyword or alias.
    pub fn from_alias(alias: &str) -> Option<AuditKind> {
        match alias.trim().to_ascii_lowercase().as_str() {
            "account_labels" | "labels" => Some(AuditKind::AccountLabels),
            "campaign_groups" | "campaign-group" | "campaigns" => {
                Some(AuditKind::CampaignGroups)
            }
            "label_assignments" | "assignments" => Some(AuditKind::LabelAssignments),
            _ => None,
        }
    }

    /// Run this listing against one account.
    pub fn run(
        self,
        source: &dyn RecordSource,
        customer_id: &str,
    ) -> Result<ReportTable, ReportError> {
        match self {
            AuditKind::AccountLabels => labels_report(source, customer_id),
            AuditKind::CampaignGroups => campaign_groups_report(source, customer_id),
            AuditKind::LabelAssignments => label_assignments_report(source, customer_id),
        }
    }
}

/// Enabled labels for one account, ordered by name.
pub fn labels_report(
    source: &dyn RecordSource,
    customer_id: &str,
) -> Result<ReportTable, ReportError> {
    let (mut rows, _) = fetch_labels(source, customer_id)?;
    rows.sort_by(|a, b| a[0].cmp(&b[0]));
    Ok(ReportTable {
        headers: owned(&LABEL_HEADERS),
        rows,
    })
}

/// Enabled campaign groups for one account, ordered by name.
pub fn campaign_groups_report(
    source: &dyn RecordSource,
    customer_id: &str,
) -> Result<ReportTable, ReportError> {
    let (mut rows, _) = fetch_campaign_groups(source, customer_id)?;
    rows.sort_by(|a, b| a[0].cmp(&b[0]));
    Ok(ReportTable {
        headers: owned(&CAMPAIGN_GROUP_HEADERS),
        rows,
    })
}

/// Campaign and ad-group rows with their resolved group and label names.
///
/// Attachments that reference a label or group the account no longer exposes
/// resolve to `UNDEFINED`; an entity with no labels shows an empty cell.
pub fn label_assignments_report(
    source: &dyn RecordSource,
    customer_id: &str,
) -> Result<ReportTable, ReportError> {
    let (_, label_names) = fetch_labels(source, customer_id)?;
    let (_, group_names) = fetch_campaign_groups(source, customer_id)?;

    let raw_rows = source.fetch(customer_id, &query::label_assignments())?;
    let mut rows = Vec::with_capacity(raw_rows.len());
    for raw in &raw_rows {
        let campaign_labels = resolve_all(&label_names, raw.text_list("campaign.labels"));
        let ad_group_labels = resolve_all(&label_names, raw.text_list("ad_group.labels"));
        let group = resolve(&group_names, &raw.text_or_empty("campaign.campaign_group"));

        rows.push(vec![
            Scalar::Int(raw.integer_or_zero("customer.id")),
            Scalar::Text(raw.text_or_empty("customer.descriptive_name")),
            Scalar::Int(raw.integer_or_zero("campaign.id")),
            Scalar::Text(raw.text_or_empty("campaign.name")),
            Scalar::Text(decode(
                CodedField::ChannelType,
                raw.get("campaign.advertising_channel_type"),
            )),
            Scalar::Text(group),
            Scalar::Text(campaign_labels),
            Scalar::Int(raw.integer_or_zero("ad_group.id")),
            Scalar::Text(raw.text_or_empty("ad_group.name")),
            Scalar::Text(decode(CodedField::AdGroupType, raw.get("ad_group.type"))),
            Scalar::Text(ad_group_labels),
        ]);
    }
    // Account name, campaign name, ad-group name: the review reading order.
    rows.sort_by(|a, b| {
        (&a[1], &a[3], &a[8]).cmp(&(&b[1], &b[3], &b[8]))
    });
    debug!(customer_id, rows = rows.len(), "label assignment audit built");

    Ok(ReportTable {
        headers: owned(&ASSIGNMENT_HEADERS),
        rows,
    })
}

type NamesById = IndexMap<String, String>;

fn fetch_labels(
    source: &dyn RecordSource,
    customer_id: &str,
) -> Result<(Vec<Vec<Scalar>>, NamesById), ReportError> {
    let raw_rows = source.fetch(customer_id, &query::labels())?;
    let mut names = NamesById::new();
    let mut rows = Vec::with_capacity(raw_rows.len());
    for raw in &raw_rows {
        let name = raw.text_or_empty("label.name");
        let id = raw.integer_or_zero("label.id");
        names.insert(id.to_string(), name.clone());
        rows.push(vec![Scalar::Text(name), Scalar::Int(id)]);
    }
    Ok((rows, names))
}

fn fetch_campaign_groups(
    source: &dyn RecordSource,
    customer_id: &str,
) -> Result<(Vec<Vec<Scalar>>, NamesById), ReportError> {
    let raw_rows = source.fetch(customer_id, &query::campaign_groups())?;
    let mut names = NamesById::new();
    let mut rows = Vec::with_capacity(raw_rows.len());
    for raw in &raw_rows {
        let name = raw.text_or_empty("campaign_group.name");
        let id = raw.integer_or_zero("campaign_group.id");
        names.insert(id.to_string(), name.clone());
        rows.push(vec![Scalar::Text(name), Scalar::Int(id)]);
    }
    Ok((rows, names))
}

/// Name for a resource reference, looked up by its trailing id segment.
fn resolve(names: &NamesById, resource: &str) -> String {
    let id = resource.rsplit('/').next().unwrap_or(resource);
    names
        .get(id)
        .cloned()
        .unwrap_or_else(|| UNDEFINED_VALUE.to_string())
}

fn resolve_all(names: &NamesById, resources: &[String]) -> String {
    resources
        .iter()
        .map(|resource| resolve(names, resource))
        .collect::<Vec<_>>()
        .join(", ")
}

fn owned(headers: &[&str]) -> Vec<String> {
    headers.iter().map(ToString::to_string).collect()
}

//! Decoding of coded (enum) API fields into display strings.
//!
//! REST-style transports deliver enum fields as their canonical names
//! (`SEARCH`, `MOBILE`); protobuf-style transports deliver integer codes.
//! [`decode`] accepts both: names pass through, codes resolve against the
//! registries below, and anything absent or unrecognized collapses to
//! `UNDEFINED` so a single odd row never aborts a report.
//!
//! Only the short, stable registries are carried here. Long-tail enums
//! (ad types, click types) decode by name passthrough alone.

use crate::constants::normalize::UNDEFINED_VALUE;
use crate::record::FieldValue;

/// Coded field families the normalizers decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodedField {
    /// `campaign.advertising_channel_type`.
    ChannelType,
    /// `segments.device`.
    Device,
    /// Keyword match type, from `segments.keyword.info` or `click_view.keyword_info`.
    KeywordMatchType,
    /// `segments.search_engine_results_page_type`.
    SerpType,
    /// `ad_group.type`.
    AdGroupType,
    /// `ad_group_ad.ad.type`.
    AdType,
    /// `segments.click_type`.
    ClickType,
}

const CHANNEL_TYPES: &[(i64, &str)] = &[
    (0, "UNSPECIFIED"),
    (1, "UNKNOWN"),
    (2, "SEARCH"),
    (3, "DISPLAY"),
    (4, "SHOPPING"),
    (5, "HOTEL"),
    (6, "VIDEO"),
    (7, "MULTI_CHANNEL"),
    (8, "LOCAL"),
    (9, "SMART"),
    (10, "PERFORMANCE_MAX"),
    (11, "LOCAL_SERVICES"),
    (12, "DISCOVERY"),
    (13, "TRAVEL"),
];

const DEVICES: &[(i64, &str)] = &[
    (0, "UNSPECIFIED"),
    (1, "UNKNOWN"),
    (2, "MOBILE"),
    (3, "TABLET"),
    (4, "DESKTOP"),
    (5, "OTHER"),
    (6, "CONNECTED_TV"),
];

const KEYWORD_MATCH_TYPES: &[(i64, &str)] = &[
    (0, "UNSPECIFIED"),
    (1, "UNKNOWN"),
    (2, "EXACT"),
    (3, "PHRASE"),
    (4, "BROAD"),
];

const SERP_TYPES: &[(i64, &str)] = &[
    (0, "UNSPECIFIED"),
    (1, "UNKNOWN"),
    (2, "ADS_ONLY"),
    (3, "ORGANIC_ONLY"),
    (4, "ADS_AND_ORGANIC"),
];

impl CodedField {
    fn registry(self) -> &'static [(i64, &'static str)] {
        match self {
            CodedField::ChannelType => CHANNEL_TYPES,
            CodedField::Device => DEVICES,
            CodedField::KeywordMatchType => KEYWORD_MATCH_TYPES,
            CodedField::SerpType => SERP_TYPES,
            CodedField::AdGroupType | CodedField::AdType | CodedField::ClickType => &[],
        }
    }
}

/// Decode one coded field value to its display string.
pub fn decode(field: CodedField, value: Option<&FieldValue>) -> String {
    match value {
        Some(FieldValue::Text(name)) => {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                UNDEFINED_VALUE.to_string()
            } else {
                trimmed.to_string()
            }
        }
        Some(FieldValue::Integer(code)) => field
            .registry()
            .iter()
            .find(|(candidate, _)| candidate == code)
            .map(|(_, name)| (*name).to_string())
            .unwrap_or_else(|| UNDEFINED_VALUE.to_string()),
        _ => UNDEFINED_VALUE.to_string(),
    }
}

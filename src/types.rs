//! Shared identifier aliases used across the reporting engine.

/// Digits-only Google Ads customer id, without `-` separators.
///
/// # Examples
///
/// ```
/// use adreport::types::CustomerId;
///
/// let id: CustomerId = "1234567890".to_string();
/// assert_eq!(id.len(), 10);
/// ```
pub type CustomerId = String;

/// Dotted field path into a raw API row, e.g. `metrics.cost_micros`.
///
/// # Examples
///
/// ```
/// use adreport::types::FieldPath;
///
/// let path: FieldPath = "campaign.advertising_channel_type".to_string();
/// assert!(path.starts_with("campaign."));
/// ```
pub type FieldPath = String;

/// Resource name suffix used to resolve labels and campaign groups,
/// e.g. the `456` in `customers/123/labels/456`.
pub type ResourceRef = String;

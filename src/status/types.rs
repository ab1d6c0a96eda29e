//! Core data types for the dataset status feed
//!
//! This module defines the types shared by the loader, the classifier and
//! the dashboard:
//! - `RawRecord`: one dataset row exactly as the feed delivers it
//! - `DatasetRecord`: a raw row enriched with derived severity tags
//! - `StatusFeed`: the fetch timestamp plus the classified, name-ordered records
//! - `Severity`, `DataStatus` and `GroupField`: classification enums

use serde::{Deserialize, Deserializer, Serialize};

/// The `meta` block of the status document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeedMeta {
    /// Human-readable time at which the feed was generated
    #[serde(default)]
    pub fetch_time: String,
}

/// The status document as served at `json/status.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatusDocument {
    pub meta: FeedMeta,
    #[serde(default)]
    pub datasets: Vec<RawRecord>,
}

/// One dataset/deployment row as delivered by the feed
///
/// Timestamps are epoch milliseconds. The feed writer sometimes emits them
/// as floating point numbers, so both forms are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawRecord {
    /// Display key, e.g. "ru29-20240105T1541"
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub operator: Option<String>,
    /// Data provider account that registered the deployment
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub wmo_id: Option<String>,
    #[serde(default, deserialize_with = "de_millis")]
    pub created: Option<i64>,
    #[serde(default, deserialize_with = "de_millis")]
    pub updated: Option<i64>,
    #[serde(default, deserialize_with = "de_millis")]
    pub start: Option<i64>,
    #[serde(default, deserialize_with = "de_millis")]
    pub end: Option<i64>,
    /// THREDDS endpoint
    #[serde(default)]
    pub tds: Option<String>,
    /// ERDDAP tabledap endpoint
    #[serde(default)]
    pub tabledap: Option<String>,
}

impl RawRecord {
    /// Create a record with only a name set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder method: set a group field value
    pub fn group(mut self, field: GroupField, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match field {
            GroupField::Institution => self.institution = value,
            GroupField::Operator => self.operator = value,
            GroupField::Provider => self.username = value,
            GroupField::WmoId => self.wmo_id = value,
        }
        self
    }

    /// Builder method: set the creation time
    pub fn created(mut self, millis: i64) -> Self {
        self.created = Some(millis);
        self
    }

    /// Builder method: set the last update time
    pub fn updated(mut self, millis: i64) -> Self {
        self.updated = Some(millis);
        self
    }

    /// Builder method: set the time coverage
    pub fn coverage(mut self, start: i64, end: i64) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Builder method: set both downstream endpoints
    pub fn endpoints(mut self, tds: impl Into<String>, tabledap: impl Into<String>) -> Self {
        self.tds = Some(tds.into());
        self.tabledap = Some(tabledap.into());
        self
    }

    /// A record is incomplete when either downstream endpoint is missing
    pub fn is_incomplete(&self) -> bool {
        self.tds.is_none() || self.tabledap.is_none()
    }

    /// Value of a group field, if present
    pub fn group_value(&self, field: GroupField) -> Option<&str> {
        match field {
            GroupField::Institution => self.institution.as_deref(),
            GroupField::Operator => self.operator.as_deref(),
            GroupField::Provider => self.username.as_deref(),
            GroupField::WmoId => self.wmo_id.as_deref(),
        }
    }
}

fn de_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(value.and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64))))
}

/// Freshness severity derived from the age of a timestamp
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Fresh,
    Warn,
    Stale,
    Info,
    /// Older than every threshold
    #[serde(rename = "none")]
    Dormant,
}

impl Severity {
    /// Bootstrap contextual class used when rendering a cell
    pub fn css_class(&self) -> &'static str {
        match self {
            Severity::Fresh => "bg-success",
            Severity::Warn => "bg-warning",
            Severity::Stale => "bg-danger",
            Severity::Info => "bg-info",
            Severity::Dormant => "none",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Fresh => write!(f, "fresh"),
            Severity::Warn => write!(f, "warn"),
            Severity::Stale => write!(f, "stale"),
            Severity::Info => write!(f, "info"),
            Severity::Dormant => write!(f, "none"),
        }
    }
}

/// Completeness of the downstream endpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DataStatus {
    Degraded,
}

impl DataStatus {
    pub fn css_class(&self) -> &'static str {
        "bg-danger"
    }
}

/// A raw record plus the tags computed at load time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetRecord {
    #[serde(flatten)]
    pub raw: RawRecord,
    #[serde(rename = "created-status", skip_serializing_if = "Option::is_none", default)]
    pub created_status: Option<Severity>,
    #[serde(
        rename = "time-coverage-status",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub time_coverage_status: Option<Severity>,
    #[serde(rename = "data-status", default)]
    pub data_status: Option<DataStatus>,
}

impl DatasetRecord {
    pub fn name(&self) -> &str {
        &self.raw.name
    }

    pub fn is_degraded(&self) -> bool {
        self.data_status == Some(DataStatus::Degraded)
    }
}

/// The classified feed held by the dashboard for a page session
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusFeed {
    /// `meta.fetch_time` of the document, shown in captions
    pub fetch_time: String,
    /// Records ordered by lowercase name
    pub records: Vec<DatasetRecord>,
}

impl StatusFeed {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Record fields used to group datasets in the navigation dropdowns
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum GroupField {
    Institution,
    Operator,
    /// Matches the `username` field
    Provider,
    WmoId,
}

impl GroupField {
    /// All group fields in dropdown order
    pub fn all() -> &'static [GroupField] {
        &[
            GroupField::Institution,
            GroupField::Operator,
            GroupField::Provider,
            GroupField::WmoId,
        ]
    }

    /// Class carried by the dropdown links and used in URLs
    pub fn link_class(&self) -> &'static str {
        match self {
            GroupField::Institution => "institution",
            GroupField::Operator => "operator",
            GroupField::Provider => "provider",
            GroupField::WmoId => "wmo-id",
        }
    }

    /// Navbar label of the dropdown
    pub fn label(&self) -> &'static str {
        match self {
            GroupField::Institution => "Institutions",
            GroupField::Operator => "Operators",
            GroupField::Provider => "Providers",
            GroupField::WmoId => "WMO IDs",
        }
    }
}

impl std::fmt::Display for GroupField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.link_class())
    }
}

impl std::str::FromStr for GroupField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "institution" => Ok(GroupField::Institution),
            "operator" => Ok(GroupField::Operator),
            "provider" | "username" => Ok(GroupField::Provider),
            "wmo-id" | "wmo_id" | "wmo" => Ok(GroupField::WmoId),
            other => Err(format!("unknown group field: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_parses_nulls_and_floats() {
        let json = r#"{
            "name": "ru29-20240105T1541",
            "institution": "Rutgers",
            "operator": null,
            "username": "rutgers",
            "wmo_id": null,
            "created": 1704470000000.0,
            "updated": 1704480000000,
            "start": null,
            "end": 1704490000000,
            "tds": null,
            "tabledap": "https://gliders.ioos.us/erddap/tabledap/ru29-20240105T1541.html",
            "summary": "ignored"
        }"#;

        let record: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.created, Some(1_704_470_000_000));
        assert_eq!(record.updated, Some(1_704_480_000_000));
        assert_eq!(record.start, None);
        assert_eq!(record.operator, None);
        assert!(record.is_incomplete());
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let record: RawRecord = serde_json::from_str(r#"{"name": "bare"}"#).unwrap();
        assert_eq!(record, RawRecord::new("bare"));
        assert!(record.is_incomplete());
    }

    #[test]
    fn test_group_value_uses_username_for_provider() {
        let record = RawRecord::new("a").group(GroupField::Provider, "usf");
        assert_eq!(record.group_value(GroupField::Provider), Some("usf"));
        assert_eq!(record.username.as_deref(), Some("usf"));
    }

    #[test]
    fn test_dataset_record_serializes_derived_tags() {
        let record = DatasetRecord {
            raw: RawRecord::new("a"),
            created_status: Some(Severity::Warn),
            time_coverage_status: None,
            data_status: Some(DataStatus::Degraded),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["name"], "a");
        assert_eq!(value["created-status"], "warn");
        assert_eq!(value["data-status"], "degraded");
        assert!(value.get("time-coverage-status").is_none());
    }

    #[test]
    fn test_group_field_parse() {
        assert_eq!("wmo-id".parse::<GroupField>().unwrap(), GroupField::WmoId);
        assert_eq!("username".parse::<GroupField>().unwrap(), GroupField::Provider);
        assert!("glider".parse::<GroupField>().is_err());
    }

    #[test]
    fn test_severity_css_classes() {
        assert_eq!(Severity::Fresh.css_class(), "bg-success");
        assert_eq!(Severity::Dormant.css_class(), "none");
        assert_eq!(Severity::Dormant.to_string(), "none");
    }
}

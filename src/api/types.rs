//! Types for the admin API

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Usage statistics for one tenant
///
/// Aggregates are `null` for tenants without recordings; those read as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantRecord {
    /// The tenant's user ID
    pub user_id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub patient_count: u64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub successful_recordings: u64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub failed_recordings: u64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub total_hours: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub avg_length_seconds: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub avg_file_size_bytes: f64,

    /// Raw tier name; unknown values are kept as-is
    #[serde(default)]
    pub tier_name: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl TenantRecord {
    /// The tier, if it is one of the known plans
    pub fn tier(&self) -> Option<TierName> {
        self.tier_name.as_deref().and_then(|t| t.parse().ok())
    }

    pub fn total_recordings(&self) -> u64 {
        self.successful_recordings + self.failed_recordings
    }
}

/// Subscription plans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TierName {
    #[serde(rename = "Free Trial")]
    FreeTrial,
    Basic,
    Professional,
    Enterprise,
}

impl TierName {
    pub const ALL: [TierName; 4] = [
        TierName::FreeTrial,
        TierName::Basic,
        TierName::Professional,
        TierName::Enterprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TierName::FreeTrial => "Free Trial",
            TierName::Basic => "Basic",
            TierName::Professional => "Professional",
            TierName::Enterprise => "Enterprise",
        }
    }
}

impl fmt::Display for TierName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown tier '{0}'")]
pub struct ParseTierError(pub String);

impl FromStr for TierName {
    type Err = ParseTierError;

    /// Accepts the display name; case, `-` and `_` are ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| if c == '-' || c == '_' { ' ' } else { c })
            .collect::<String>()
            .to_lowercase();

        TierName::ALL
            .into_iter()
            .find(|tier| tier.as_str().to_lowercase() == normalized)
            .ok_or_else(|| ParseTierError(s.to_string()))
    }
}

/// Body of the tier upgrade request
#[derive(Debug, Clone, Serialize)]
pub struct TierChangeRequest {
    pub tier_name: TierName,
}

/// Answer to a tier change; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TierChangeResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tier_names_parse_loosely() {
        assert_eq!("Free Trial".parse::<TierName>(), Ok(TierName::FreeTrial));
        assert_eq!("free-trial".parse::<TierName>(), Ok(TierName::FreeTrial));
        assert_eq!("ENTERPRISE".parse::<TierName>(), Ok(TierName::Enterprise));
        assert!("Gold".parse::<TierName>().is_err());
    }

    #[test]
    fn tier_serializes_as_display_name() {
        let body = serde_json::to_value(TierChangeRequest {
            tier_name: TierName::FreeTrial,
        })
        .unwrap();
        assert_eq!(body, json!({ "tier_name": "Free Trial" }));
    }

    #[test]
    fn record_keeps_unknown_tier() {
        let record: TenantRecord = serde_json::from_value(json!({
            "user_id": "user-001",
            "full_name": "Alice",
            "email": "alice@example.com",
            "patient_count": 3,
            "successful_recordings": 10,
            "failed_recordings": 2,
            "total_hours": 4.5,
            "avg_length_seconds": 120.0,
            "avg_file_size_bytes": 2048.0,
            "tier_name": "Legacy"
        }))
        .unwrap();

        assert_eq!(record.tier_name.as_deref(), Some("Legacy"));
        assert_eq!(record.tier(), None);
        assert_eq!(record.total_recordings(), 12);
    }

    #[test]
    fn null_aggregates_read_as_zero() {
        let record: TenantRecord = serde_json::from_value(json!({
            "user_id": "user-003",
            "full_name": "Carol",
            "email": "carol@example.com",
            "patient_count": 1,
            "successful_recordings": 0,
            "failed_recordings": 0,
            "total_hours": null,
            "avg_length_seconds": null,
            "avg_file_size_bytes": null
        }))
        .unwrap();

        assert_eq!(record.total_hours, 0.0);
        assert_eq!(record.avg_length_seconds, 0.0);
        assert_eq!(record.avg_file_size_bytes, 0.0);
        assert_eq!(record.patient_count, 1);
    }

    #[test]
    fn missing_aggregates_read_as_zero() {
        let record: TenantRecord = serde_json::from_value(json!({
            "user_id": "user-004",
            "full_name": null,
            "email": "dave@example.com"
        }))
        .unwrap();

        assert_eq!(record.full_name, "");
        assert_eq!(record.total_recordings(), 0);
    }

    #[test]
    fn record_without_tier() {
        let record: TenantRecord = serde_json::from_value(json!({
            "user_id": "user-002",
            "full_name": "Bob",
            "email": "bob@example.com",
            "patient_count": 0,
            "successful_recordings": 0,
            "failed_recordings": 0,
            "total_hours": 0,
            "avg_length_seconds": 0,
            "avg_file_size_bytes": 0
        }))
        .unwrap();

        assert_eq!(record.tier_name, None);
    }
}

//! Client for the telephony vendor's REST API.
//!
//! The vendor (an Exotel-style account API) owns the call records; this
//! crate only fetches them read-only for the reporting layer. Nothing
//! here is persisted — call records live in memory for the lifetime of
//! one report.

pub mod error;
pub mod exotel;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Credentials and endpoint for one vendor account.
///
/// `api_key`/`api_token` form the HTTP basic-auth pair; `account_sid` is
/// the account identifier baked into every URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExotelConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(default)]
    pub account_sid: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ExotelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_token: String::new(),
            account_sid: String::new(),
            base_url: default_base_url(),
        }
    }
}

impl ExotelConfig {
    /// True when all three credential fields are present. An unconfigured
    /// account makes the report fall back to sample data.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.api_token.is_empty() && !self.account_sid.is_empty()
    }
}

fn default_base_url() -> String {
    "https://api.exotel.com/v1".to_string()
}

/// Date-range and record-limit parameters for a call-log fetch.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use ivrmon_telephony::CallQuery;
///
/// let query = CallQuery {
///     start_date: NaiveDate::from_ymd_opt(2025, 6, 1),
///     end_date: NaiveDate::from_ymd_opt(2025, 6, 30),
///     limit: 100,
/// };
/// assert_eq!(query.limit, 100);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CallQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Maximum records per fetch (the vendor's `PageSize`).
    pub limit: usize,
}

impl Default for CallQuery {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            limit: 100,
        }
    }
}

/// One call record as returned by the vendor.
///
/// Field names follow the vendor's JSON; `Sid` is accepted as an alias
/// and always serialized back out as `CallSid`. `Duration` and `Price`
/// arrive as either strings or numbers depending on the endpoint, so
/// both are deserialized leniently.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CallRecord {
    #[serde(rename = "CallSid", alias = "Sid")]
    pub call_sid: String,
    #[serde(
        rename = "DateCreated",
        default,
        deserialize_with = "deserialize_vendor_datetime"
    )]
    pub date_created: Option<NaiveDateTime>,
    #[serde(rename = "From", default)]
    pub from_number: Option<String>,
    #[serde(rename = "To", default)]
    pub to_number: Option<String>,
    /// Vendor-owned status string (`completed`, `busy`, `no-answer`,
    /// `failed`, `canceled`, ...). Kept opaque.
    #[serde(rename = "Status", default)]
    pub status: String,
    /// Call duration in seconds.
    #[serde(rename = "Duration", default, deserialize_with = "deserialize_lenient_i64")]
    pub duration: i64,
    #[serde(rename = "Direction", default)]
    pub direction: String,
    #[serde(rename = "Price", default, deserialize_with = "deserialize_lenient_f64")]
    pub price: f64,
    #[serde(rename = "RecordingUrl", default)]
    pub recording_url: Option<String>,
}

const VENDOR_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn deserialize_vendor_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) => Ok(NaiveDateTime::parse_from_str(&s, VENDOR_DATETIME_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S"))
            .ok()),
    }
}

fn deserialize_lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberInput {
        Int(i64),
        Float(f64),
        Text(String),
        Missing(Option<()>),
    }

    match NumberInput::deserialize(deserializer)? {
        NumberInput::Int(v) => Ok(v),
        NumberInput::Float(v) => Ok(v as i64),
        NumberInput::Text(s) => Ok(s.trim().parse().unwrap_or(0)),
        NumberInput::Missing(_) => Ok(0),
    }
}

fn deserialize_lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberInput {
        Num(f64),
        Text(String),
        Missing(Option<()>),
    }

    match NumberInput::deserialize(deserializer)? {
        NumberInput::Num(v) => Ok(v),
        NumberInput::Text(s) => Ok(s.trim().parse().unwrap_or(0.0)),
        NumberInput::Missing(_) => Ok(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_record_parses_vendor_json() {
        let raw = r#"{
            "Sid": "CAe1234567890",
            "DateCreated": "2025-06-01 16:05:22",
            "From": "+919999900001",
            "To": "+918888800001",
            "Status": "completed",
            "Duration": "48",
            "Direction": "inbound",
            "Price": 1.25,
            "RecordingUrl": null
        }"#;
        let call: CallRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(call.call_sid, "CAe1234567890");
        assert_eq!(call.duration, 48);
        assert_eq!(call.price, 1.25);
        assert_eq!(call.status, "completed");
        assert_eq!(
            call.date_created.unwrap().format("%Y-%m-%d").to_string(),
            "2025-06-01"
        );

        // Serialized form uses the normalized CallSid name.
        let out = serde_json::to_value(&call).unwrap();
        assert_eq!(out["CallSid"], "CAe1234567890");
    }

    #[test]
    fn call_record_tolerates_missing_optional_fields() {
        let call: CallRecord = serde_json::from_str(r#"{"CallSid": "CA1"}"#).unwrap();
        assert_eq!(call.call_sid, "CA1");
        assert_eq!(call.duration, 0);
        assert_eq!(call.price, 0.0);
        assert!(call.date_created.is_none());
        assert!(call.recording_url.is_none());
    }

    #[test]
    fn unconfigured_account_is_detected() {
        let config = ExotelConfig::default();
        assert!(!config.is_configured());

        let config = ExotelConfig {
            api_key: "k".into(),
            api_token: "t".into(),
            account_sid: "acct".into(),
            ..ExotelConfig::default()
        };
        assert!(config.is_configured());
    }
}

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{Result, TelephonyError};
use crate::{CallQuery, CallRecord, ExotelConfig};

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Read-only client for the vendor's account API.
///
/// All requests are `GET` with HTTP basic auth (API key / API token) and
/// are answered within the vendor's default rate limits; no retries are
/// performed here — the vendor owns retry policy for webhooks, and the
/// reporting layer degrades to sample data when a fetch fails.
pub struct ExotelClient {
    config: ExotelConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct CallsEnvelope {
    #[serde(rename = "Calls", default)]
    calls: Vec<CallRecord>,
}

#[derive(Debug, Deserialize)]
struct CallEnvelope {
    #[serde(rename = "Call")]
    call: CallRecord,
}

impl ExotelClient {
    pub fn new(config: ExotelConfig) -> Result<Self> {
        if !config.is_configured() {
            return Err(TelephonyError::ConfigError(
                "api_key, api_token and account_sid are all required".to_string(),
            ));
        }
        let client = Client::builder()
            .use_rustls_tls()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { config, client })
    }

    fn account_url(&self, resource: &str) -> String {
        format!(
            "{}/Accounts/{}/{resource}",
            self.config.base_url.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    /// Fetches call logs, newest first as the vendor returns them.
    ///
    /// The date bounds become the vendor's `StartTime`/`EndTime`
    /// parameters, widened to whole days so the range is inclusive on
    /// both ends; `limit` becomes `PageSize`.
    pub async fn get_calls(&self, query: &CallQuery) -> Result<Vec<CallRecord>> {
        let url = self.account_url("Calls.json");
        let mut params: Vec<(&str, String)> = vec![("PageSize", query.limit.to_string())];
        if let Some(start) = query.start_date {
            params.push(("StartTime", format_day_start(start)));
        }
        if let Some(end) = query.end_date {
            params.push(("EndTime", format_day_end(end)));
        }

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.api_key, Some(&self.config.api_token))
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(TelephonyError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TelephonyError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: CallsEnvelope = response.json().await?;
        tracing::debug!(count = envelope.calls.len(), "Fetched call records");
        Ok(envelope.calls)
    }

    /// Fetches the detail record for a single call.
    pub async fn get_call(&self, call_sid: &str) -> Result<CallRecord> {
        let url = self.account_url(&format!("Calls/{call_sid}.json"));
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.api_key, Some(&self.config.api_token))
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(TelephonyError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TelephonyError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: CallEnvelope = response.json().await?;
        Ok(envelope.call)
    }
}

fn format_day_start(date: NaiveDate) -> String {
    format!("{} 00:00:00", date.format("%Y-%m-%d"))
}

fn format_day_end(date: NaiveDate) -> String {
    format!("{} 23:59:59", date.format("%Y-%m-%d"))
}

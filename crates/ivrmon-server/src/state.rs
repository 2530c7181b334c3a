use crate::config::ServerConfig;
use chrono::{DateTime, Utc};
use ivrmon_storage::store::SqliteIvrStore;
use ivrmon_telephony::exotel::ExotelClient;
use std::sync::Arc;

/// Shared handles for every request handler. Built once at startup; the
/// store lives for the whole process and is closed by drop on shutdown.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteIvrStore>,
    /// Absent when the vendor account is not configured; the report
    /// endpoint then serves sample data.
    pub telephony: Option<Arc<ExotelClient>>,
    pub config: Arc<ServerConfig>,
    pub start_time: DateTime<Utc>,
}

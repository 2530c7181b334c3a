use ivrmon_telephony::ExotelConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址（默认 0.0.0.0）
    #[serde(default = "default_host")]
    pub host: String,
    /// HTTP 端口（默认 5000）
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// SQLite 数据库文件路径
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// 报表单次拉取的最大通话记录数（厂商 PageSize）
    #[serde(default = "default_report_page_size")]
    pub report_page_size: usize,
    /// 厂商账号配置（缺省时报表回退到示例数据）
    #[serde(default)]
    pub exotel: ExotelConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    5000
}

fn default_db_path() -> String {
    "ivr_data.db".to_string()
}

fn default_report_page_size() -> usize {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            db_path: default_db_path(),
            report_page_size: default_report_page_size(),
            exotel: ExotelConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Environment variables override the file for the values the
    /// deployment scripts have always passed through the environment:
    /// the vendor credentials and the receiver's host/port/database.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("EXOTEL_API_KEY") {
            self.exotel.api_key = v;
        }
        if let Ok(v) = std::env::var("EXOTEL_API_TOKEN") {
            self.exotel.api_token = v;
        }
        if let Ok(v) = std::env::var("EXOTEL_SID") {
            self.exotel.account_sid = v;
        }
        if let Ok(v) = std::env::var("IVR_DB_PATH") {
            self.db_path = v;
        }
        if let Ok(v) = std::env::var("WEBHOOK_HOST") {
            self.host = v;
        }
        if let Ok(port) = std::env::var("WEBHOOK_PORT") {
            match port.parse() {
                Ok(port) => self.http_port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid WEBHOOK_PORT"),
            }
        }
    }
}

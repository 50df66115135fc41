use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::Level;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Query flags sent along with every upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadFlags {
    pub extract: bool,
    pub save_to_db: bool,
    pub create_embeddings: bool,
}

impl Default for UploadFlags {
    fn default() -> Self {
        Self {
            extract: true,
            save_to_db: true,
            create_embeddings: true,
        }
    }
}

impl UploadFlags {
    pub fn as_query(&self) -> [(&'static str, &'static str); 3] {
        let flag = |b: bool| if b { "true" } else { "false" };
        [
            ("extract", flag(self.extract)),
            ("save_to_db", flag(self.save_to_db)),
            ("create_embeddings", flag(self.create_embeddings)),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Applied to every read request so one hung artifact can't stall the rest.
    pub fetch_timeout: Duration,
    pub upload_timeout: Duration,
    pub qa_top_k: u32,
    pub auto_select_uploads: bool,
    pub upload_flags: UploadFlags,
    pub log_level: Level,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            fetch_timeout: Duration::from_secs(30),
            upload_timeout: Duration::from_secs(300),
            qa_top_k: 5,
            auto_select_uploads: true,
            upload_flags: UploadFlags::default(),
            log_level: Level::INFO,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or blank keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let base_url = get("API_BASE_URL").unwrap_or(defaults.base_url);
        let fetch_timeout = match get("FETCH_TIMEOUT_SECS") {
            Some(v) => parse_secs("FETCH_TIMEOUT_SECS", &v)?,
            None => defaults.fetch_timeout,
        };
        let upload_timeout = match get("UPLOAD_TIMEOUT_SECS") {
            Some(v) => parse_secs("UPLOAD_TIMEOUT_SECS", &v)?,
            None => defaults.upload_timeout,
        };
        let qa_top_k = match get("QA_TOP_K") {
            Some(v) => v
                .parse::<u32>()
                .with_context(|| format!("QA_TOP_K must be a positive integer, got {:?}", v))?,
            None => defaults.qa_top_k,
        };
        let flag = |key: &str, default: bool| -> Result<bool> {
            match get(key) {
                Some(v) => parse_bool(&v).with_context(|| format!("{} must be a boolean", key)),
                None => Ok(default),
            }
        };
        let log_level = match get("LOG_LEVEL") {
            Some(v) => Level::from_str(&v)
                .map_err(|_| anyhow::anyhow!("LOG_LEVEL must be one of trace|debug|info|warn|error, got {:?}", v))?,
            None => defaults.log_level,
        };

        Ok(Self {
            base_url,
            fetch_timeout,
            upload_timeout,
            qa_top_k,
            auto_select_uploads: flag("AUTO_SELECT_UPLOADS", defaults.auto_select_uploads)?,
            upload_flags: UploadFlags {
                extract: flag("UPLOAD_EXTRACT", true)?,
                save_to_db: flag("UPLOAD_SAVE_TO_DB", true)?,
                create_embeddings: flag("UPLOAD_CREATE_EMBEDDINGS", true)?,
            },
            log_level,
        })
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[cfg(test)]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    #[cfg(test)]
    pub fn with_auto_select(mut self, auto_select: bool) -> Self {
        self.auto_select_uploads = auto_select;
        self
    }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration> {
    let secs = value
        .parse::<u64>()
        .with_context(|| format!("{} must be a whole number of seconds, got {:?}", key, value))?;
    if secs == 0 {
        bail!("{} must be greater than zero", key);
    }
    Ok(Duration::from_secs(secs))
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("unrecognized boolean {:?}", other),
    }
}

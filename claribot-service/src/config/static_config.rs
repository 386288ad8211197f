//! Startup configuration sections.
//! Every field has a serde default so an empty environment yields a working service.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StaticConfig {
    #[serde(default = "default_server")]
    pub server: ServerConfig,

    #[serde(default = "default_upload")]
    pub upload: UploadConfig,

    #[serde(default)]
    pub reading_order: ReadingOrderConfig,

    #[serde(default = "default_gemini")]
    pub gemini: GeminiConfig,

    #[serde(default = "default_retry")]
    pub retry: RetryConfig,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            upload: default_upload(),
            reading_order: ReadingOrderConfig::default(),
            gemini: default_gemini(),
            retry: default_retry(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Upload handling
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Directory for in-flight uploads. Files are removed once the request finishes.
    #[serde(default = "default_upload_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
}

/// Direction of the y-axis reported by the fragment source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YAxis {
    /// Smaller y is read first (top-down page coordinates).
    #[default]
    Ascending,
    /// Larger y is read first (bottom-up page coordinates).
    Descending,
}

/// Line clustering parameters
///
/// The tolerance is an absolute distance in the source's page units. It is
/// not scaled by font size or page dimensions.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadingOrderConfig {
    #[serde(default = "default_line_tolerance")]
    pub line_tolerance: f64,

    #[serde(default)]
    pub y_axis: YAxis,
}

impl Default for ReadingOrderConfig {
    fn default() -> Self {
        Self {
            line_tolerance: default_line_tolerance(),
            y_axis: YAxis::default(),
        }
    }
}

/// Gemini generative-language API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// Falls back to the `GEMINI_API_KEY` environment variable when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_gemini_url")]
    pub base_url: String,

    #[serde(default = "default_gemini_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f64,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Retry policy for analysis backend calls
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay after attempt `n` is `base_delay_ms * 2^n`.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

// ==================== Default Value Functions ====================

pub(crate) fn default_server() -> ServerConfig {
    ServerConfig {
        host: default_host(),
        port: default_port(),
    }
}

pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    3000
}

pub(crate) fn default_upload() -> UploadConfig {
    UploadConfig {
        dir: default_upload_dir(),
        max_file_size_bytes: default_max_file_size(),
    }
}

pub(crate) fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

pub(crate) fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

pub(crate) fn default_line_tolerance() -> f64 {
    0.1
}

pub(crate) fn default_gemini() -> GeminiConfig {
    GeminiConfig {
        api_key: None,
        base_url: default_gemini_url(),
        model: default_gemini_model(),
        temperature: default_temperature(),
        top_k: default_top_k(),
        top_p: default_top_p(),
        max_output_tokens: default_max_output_tokens(),
        request_timeout_secs: default_request_timeout_secs(),
    }
}

pub(crate) fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

pub(crate) fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

pub(crate) fn default_temperature() -> f64 {
    0.3
}

pub(crate) fn default_top_k() -> u32 {
    32
}

pub(crate) fn default_top_p() -> f64 {
    0.9
}

pub(crate) fn default_max_output_tokens() -> u32 {
    4096
}

pub(crate) fn default_request_timeout_secs() -> u64 {
    120
}

pub(crate) fn default_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: default_max_attempts(),
        base_delay_ms: default_base_delay_ms(),
    }
}

pub(crate) fn default_max_attempts() -> u32 {
    3
}

pub(crate) fn default_base_delay_ms() -> u64 {
    1000
}

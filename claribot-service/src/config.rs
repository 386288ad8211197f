//! Service configuration.
//!
//! Loaded once at startup from an optional `config.toml` and `CLARIBOT__*`
//! environment variables, in that order of precedence (env wins).

mod loader;
mod static_config;

pub use loader::load_static_config;
pub use static_config::{
    GeminiConfig, ReadingOrderConfig, RetryConfig, StaticConfig, UploadConfig, YAxis,
};

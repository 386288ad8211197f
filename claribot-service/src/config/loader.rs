//! Configuration loading from files and environment variables.

use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};

use crate::error::{ServiceError, ServiceResult};

use super::static_config::StaticConfig;

/// Load configuration from `config.toml` (optional) and `CLARIBOT__*` env vars
pub fn load_static_config() -> ServiceResult<StaticConfig> {
    let builder = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix("CLARIBOT")
                .separator("__")
                .try_parsing(true),
        );

    let mut config = from_builder(builder)?;
    if config.gemini.api_key.is_none() {
        config.gemini.api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());
    }

    Ok(config)
}

/// Build, deserialize and validate a configuration from the given sources
pub(crate) fn from_builder(builder: ConfigBuilder<DefaultState>) -> ServiceResult<StaticConfig> {
    let config: StaticConfig = builder
        .build()
        .map_err(|e| ServiceError::Config {
            message: format!("Failed to build config: {}", e),
        })?
        .try_deserialize()
        .map_err(|e| ServiceError::Config {
            message: format!("Failed to deserialize config: {}", e),
        })?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &StaticConfig) -> ServiceResult<()> {
    let tolerance = config.reading_order.line_tolerance;
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(ServiceError::Config {
            message: format!(
                "reading_order.line_tolerance must be a finite, non-negative number (got {})",
                tolerance
            ),
        });
    }

    if config.retry.max_attempts == 0 {
        return Err(ServiceError::Config {
            message: "retry.max_attempts must be at least 1".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::YAxis;
    use config::FileFormat;

    fn load(toml: &str) -> ServiceResult<StaticConfig> {
        from_builder(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn test_defaults() {
        let config = load("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upload.max_file_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.reading_order.line_tolerance, 0.1);
        assert_eq!(config.reading_order.y_axis, YAxis::Ascending);
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
        assert_eq!(config.gemini.top_k, 32);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.gemini.api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(
            r#"
[reading_order]
line_tolerance = 0.25
y_axis = "descending"

[retry]
max_attempts = 5
"#,
        )
        .unwrap();

        assert_eq!(config.reading_order.line_tolerance, 0.25);
        assert_eq!(config.reading_order.y_axis, YAxis::Descending);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 1000);
    }

    #[test]
    fn test_rejects_negative_tolerance() {
        let err = load("[reading_order]\nline_tolerance = -1.0\n").unwrap_err();
        assert!(matches!(err, ServiceError::Config { .. }));
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let err = load("[retry]\nmax_attempts = 0\n").unwrap_err();
        assert!(matches!(err, ServiceError::Config { .. }));
    }
}

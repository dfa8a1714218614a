//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and URLs.
//! Every problem is reported, not just the first.

use crate::config::schema::AppConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match url::Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError {
            field,
            message: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError {
            field,
            message: format!("invalid URL '{}': {}", value, e),
        }),
    }
}

fn check_positive(errors: &mut Vec<ValidationError>, field: &'static str, value: u64) {
    if value == 0 {
        errors.push(ValidationError {
            field,
            message: "must be greater than zero".to_string(),
        });
    }
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "upstream.token_url", &config.upstream.token_url);
    check_url(&mut errors, "upstream.data_url", &config.upstream.data_url);
    check_url(&mut errors, "connectivity.probe_url", &config.connectivity.probe_url);

    check_positive(&mut errors, "upstream.request_timeout_secs", config.upstream.request_timeout_secs);
    check_positive(&mut errors, "retry.max_attempts", u64::from(config.retry.max_attempts));
    check_positive(&mut errors, "cache.max_age_secs", config.cache.max_age_secs);
    check_positive(&mut errors, "refresher.fetch_interval_secs", config.refresher.fetch_interval_secs);
    check_positive(&mut errors, "refresher.connectivity_retry_secs", config.refresher.connectivity_retry_secs);
    check_positive(&mut errors, "connectivity.timeout_secs", config.connectivity.timeout_secs);
    check_positive(&mut errors, "http.request_timeout_secs", config.http.request_timeout_secs);
    check_positive(&mut errors, "cache.fetch_timeout_secs", config.cache.fetch_timeout_secs);

    if config.cache.fetch_timeout_secs >= config.http.request_timeout_secs {
        errors.push(ValidationError {
            field: "cache.fetch_timeout_secs",
            message: "must be smaller than http.request_timeout_secs".to_string(),
        });
    }

    if config.retry.max_delay_ms < config.retry.base_delay_ms {
        errors.push(ValidationError {
            field: "retry.max_delay_ms",
            message: "must not be smaller than retry.base_delay_ms".to_string(),
        });
    }

    if let Some(bad) = config.retry.retry_statuses.iter().find(|s| !(100..=599).contains(*s)) {
        errors.push(ValidationError {
            field: "retry.retry_statuses",
            message: format!("{} is not an HTTP status code", bad),
        });
    }

    if config.http.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "http.bind_address",
            message: format!("'{}' is not a socket address", config.http.bind_address),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

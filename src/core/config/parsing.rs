use std::env;

use super::types::{ConfigError, Environment};

const DEFAULT_CORS_ORIGINS: &[&str] =
    &["http://localhost:3000", "http://localhost:5173", "http://127.0.0.1:3000"];

pub(super) fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

pub(super) fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

pub(super) fn parse_u16(field: &'static str, value: String) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidValue { field, value })
}

/// Parses a strictly positive count such as the per-paper minute allotment.
pub(super) fn parse_positive_u32(field: &'static str, value: String) -> Result<u32, ConfigError> {
    match value.parse::<u32>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::InvalidValue { field, value }),
    }
}

pub(super) fn parse_cors_origins(value: Option<String>) -> Result<Vec<String>, ConfigError> {
    let Some(raw) = value.filter(|raw| !raw.trim().is_empty()) else {
        return Ok(default_cors_origins());
    };

    let origins: Vec<String> = if raw.trim_start().starts_with('[') {
        serde_json::from_str(&raw).map_err(|_| ConfigError::InvalidCors(raw.clone()))?
    } else {
        raw.split(',').map(|item| item.trim().to_string()).filter(|item| !item.is_empty()).collect()
    };

    if origins.is_empty() {
        return Ok(default_cors_origins());
    }

    Ok(origins)
}

pub(super) fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES" | "on" | "ON")
}

pub(super) fn parse_environment(value: Option<String>) -> Environment {
    match value.as_deref().map(|item| item.to_lowercase()) {
        Some(ref val) if val == "production" || val == "prod" => Environment::Production,
        Some(ref val) if val == "staging" => Environment::Staging,
        Some(ref val) if val == "test" || val == "testing" => Environment::Test,
        _ => Environment::Development,
    }
}

fn default_cors_origins() -> Vec<String> {
    DEFAULT_CORS_ORIGINS.iter().map(|item| item.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_origins_accept_json_array() {
        let raw = "[\"http://exam.local\",\"http://admin.local\"]".to_string();
        let parsed = parse_cors_origins(Some(raw)).expect("cors json");
        assert_eq!(parsed, vec!["http://exam.local".to_string(), "http://admin.local".to_string()]);
    }

    #[test]
    fn cors_origins_accept_comma_list() {
        let parsed = parse_cors_origins(Some("http://a, ,http://b".to_string())).expect("cors csv");
        assert_eq!(parsed, vec!["http://a".to_string(), "http://b".to_string()]);
    }

    #[test]
    fn cors_origins_fall_back_to_defaults() {
        assert_eq!(parse_cors_origins(None).expect("none"), default_cors_origins());
        assert_eq!(parse_cors_origins(Some("  ".to_string())).expect("blank"), default_cors_origins());
        assert_eq!(parse_cors_origins(Some("[]".to_string())).expect("empty"), default_cors_origins());
    }

    #[test]
    fn cors_origins_reject_broken_json() {
        assert!(matches!(
            parse_cors_origins(Some("[\"http://a\"".to_string())),
            Err(ConfigError::InvalidCors(_))
        ));
    }

    #[test]
    fn minutes_per_paper_must_be_positive() {
        assert_eq!(parse_positive_u32("EXAM_MINUTES_PER_PAPER", "60".to_string()).unwrap(), 60);
        assert!(parse_positive_u32("EXAM_MINUTES_PER_PAPER", "0".to_string()).is_err());
        assert!(parse_positive_u32("EXAM_MINUTES_PER_PAPER", "-5".to_string()).is_err());
        assert!(parse_positive_u32("EXAM_MINUTES_PER_PAPER", "hour".to_string()).is_err());
    }

    #[test]
    fn bool_variants() {
        assert!(parse_bool("1"));
        assert!(parse_bool("yes"));
        assert!(parse_bool("ON"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("0"));
    }

    #[test]
    fn environment_variants() {
        assert_eq!(parse_environment(Some("prod".to_string())), Environment::Production);
        assert_eq!(parse_environment(Some("Staging".to_string())), Environment::Staging);
        assert_eq!(parse_environment(Some("testing".to_string())), Environment::Test);
        assert_eq!(parse_environment(Some("whatever".to_string())), Environment::Development);
        assert_eq!(parse_environment(None), Environment::Development);
    }
}

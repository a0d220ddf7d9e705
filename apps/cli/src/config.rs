use std::path::PathBuf;
use std::time::Duration;

use recallcheck_client::config::{DEFAULT_PRIMARY_BASE_URL, DEFAULT_SECONDARY_BASE_URL};
use recallcheck_client::{ClientConfig, MatchConfig, SecondaryConfig};

pub struct Config {
    pub client: ClientConfig,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let defaults = MatchConfig::default();

        let timeout_ms: u64 = var("RC_REQUEST_TIMEOUT_MS", "10000").parse().unwrap_or(10000);
        let fuzzy_min_length: usize = lookup("RC_FUZZY_MIN_LENGTH")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.fuzzy_min_length);
        let primary_retry_after = lookup("RC_PRIMARY_RETRY_AFTER_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let client = ClientConfig {
            primary_base_url: var("RC_PRIMARY_URL", DEFAULT_PRIMARY_BASE_URL),
            secondary: SecondaryConfig {
                base_url: var("RC_SECONDARY_URL", DEFAULT_SECONDARY_BASE_URL),
                app_id: var("RC_APP_ID", ""),
                app_secret: var("RC_APP_SECRET", ""),
                app_token: var("RC_APP_TOKEN", ""),
                table_id: var("RC_TABLE_ID", ""),
                token_cache: parse_flag(lookup("RC_TOKEN_CACHE"), false),
                ..SecondaryConfig::default()
            },
            matching: MatchConfig {
                fuzzy_enabled: parse_flag(lookup("RC_FUZZY_ENABLED"), defaults.fuzzy_enabled),
                fuzzy_min_length,
            },
            request_timeout: Duration::from_millis(timeout_ms),
            primary_retry_after,
        };

        Self {
            client,
            data_dir: PathBuf::from(var("RC_DATA_DIR", "./data")),
        }
    }
}

fn parse_flag(value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" || v.eq_ignore_ascii_case("yes") => {
            true
        }
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" || v.eq_ignore_ascii_case("no") => {
            false
        }
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(Some("TRUE".to_string()), false));
        assert!(parse_flag(Some(" 1 ".to_string()), false));
        assert!(!parse_flag(Some("no".to_string()), true));
        assert!(parse_flag(Some("maybe".to_string()), true));
        assert!(!parse_flag(None, false));
    }
}

use crate::error::{Result, ScoutError};
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str =
    "https://www.willhaben.at/iad/immobilien/mietwohnungen/mietwohnung-angebote";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP settings for the scraper
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ScraperConfig {
    /// Defaults overridden by `HOUSING_SCOUT_BASE_URL`,
    /// `HOUSING_SCOUT_TIMEOUT_SECS` and `HOUSING_SCOUT_USER_AGENT`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(base_url) = lookup("HOUSING_SCOUT_BASE_URL") {
            config.base_url = Url::parse(&base_url)?;
        }
        if let Some(timeout) = lookup("HOUSING_SCOUT_TIMEOUT_SECS") {
            let secs = timeout.trim().parse::<u64>().map_err(|_| {
                ScoutError::Config(format!(
                    "HOUSING_SCOUT_TIMEOUT_SECS must be a number, got {timeout:?}"
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(user_agent) = lookup("HOUSING_SCOUT_USER_AGENT") {
            config.user_agent = user_agent;
        }
        Ok(config)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let config = ScraperConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_are_applied() {
        let config = ScraperConfig::from_lookup(lookup(&[
            ("HOUSING_SCOUT_BASE_URL", "http://localhost:8080/search"),
            ("HOUSING_SCOUT_TIMEOUT_SECS", "5"),
            ("HOUSING_SCOUT_USER_AGENT", "scout/0.1"),
        ]))
        .unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/search");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "scout/0.1");
    }

    #[test]
    fn bad_timeout_is_a_config_error() {
        let result = ScraperConfig::from_lookup(lookup(&[("HOUSING_SCOUT_TIMEOUT_SECS", "soon")]));
        assert!(matches!(result, Err(ScoutError::Config(_))));
    }
}

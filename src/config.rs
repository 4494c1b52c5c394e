use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

use crate::pacer::PaceWindow;

pub const DEFAULT_BASE_URL: &str = "https://www.linkedin.com";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Process-wide configuration, read once from the environment (and `.env`).
/// Library types never read this directly; the binary hands a
/// [`ScraperConfig`] down.
pub static CONFIG: Lazy<ScraperConfig> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    let defaults = ScraperConfig::default();
    ScraperConfig {
        base_url: get_env_or_default("JOBHARVEST_BASE_URL", DEFAULT_BASE_URL),
        user_agent: get_env_or_default("JOBHARVEST_USER_AGENT", DEFAULT_USER_AGENT),
        request_timeout: Duration::from_secs(get_env_parsed("JOBHARVEST_TIMEOUT_SECS", 30)),
        search_delay: PaceWindow::from_secs(
            get_env_parsed("JOBHARVEST_SEARCH_DELAY_MIN", secs(defaults.search_delay.min)),
            get_env_parsed("JOBHARVEST_SEARCH_DELAY_MAX", secs(defaults.search_delay.max)),
        ),
        detail_delay: PaceWindow::from_secs(
            get_env_parsed("JOBHARVEST_DETAIL_DELAY_MIN", secs(defaults.detail_delay.min)),
            get_env_parsed("JOBHARVEST_DETAIL_DELAY_MAX", secs(defaults.detail_delay.max)),
        ),
    }
});

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Scheme and host of the listing service; endpoints are joined onto it.
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout: Duration,
    /// Wait inserted before every search page request.
    pub search_delay: PaceWindow,
    /// Wait inserted before every detail document request.
    pub detail_delay: PaceWindow,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        ScraperConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
            search_delay: PaceWindow::from_secs(1.0, 2.0),
            detail_delay: PaceWindow::from_secs(1.0, 2.5),
        }
    }
}

impl ScraperConfig {
    /// Same endpoints and client settings, no pacing. Meant for stub servers.
    pub fn unpaced(base_url: impl Into<String>) -> Self {
        ScraperConfig {
            base_url: base_url.into(),
            search_delay: PaceWindow::ZERO,
            detail_delay: PaceWindow::ZERO,
            ..ScraperConfig::default()
        }
    }
}

fn secs(duration: Duration) -> f64 {
    duration.as_secs_f64()
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_parsed<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparseable environment value");
            default
        }),
        Err(_) => default,
    }
}

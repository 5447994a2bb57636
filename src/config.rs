use std::env;
use std::path::PathBuf;

use chrono::NaiveDate;
use once_cell::sync::OnceCell;

use crate::fixtures::parse_date;
use crate::standings::DEFAULT_FORM_LEN;

pub const DEFAULT_LIVE_MINUTE_CAP: u32 = 90;

static CONFIG: OnceCell<AppConfig> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub form_len: usize,
    pub live_minute_cap: u32,
    pub include_live: bool,
    /// Pin "today" for the fixtures tab (reproducible exports).
    pub today: Option<NaiveDate>,
    pub cache_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            form_len: DEFAULT_FORM_LEN,
            live_minute_cap: DEFAULT_LIVE_MINUTE_CAP,
            include_live: false,
            today: None,
            cache_dir: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key).and_then(|val| {
                if val.trim().is_empty() {
                    None
                } else {
                    Some(val.trim().to_string())
                }
            })
        };
        let form_len = get("FE_FORM_LENGTH")
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_FORM_LEN)
            .clamp(1, 10);
        let live_minute_cap = get("FE_LIVE_MINUTE_CAP")
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(DEFAULT_LIVE_MINUTE_CAP)
            .clamp(45, 130);
        let include_live = get("FE_INCLUDE_LIVE").is_some_and(|val| parse_flag(&val));
        let today = get("FE_TODAY").and_then(|val| parse_date(&val));
        let cache_dir = get("FE_CACHE_DIR").map(PathBuf::from);

        Self {
            form_len,
            live_minute_cap,
            include_live,
            today,
            cache_dir,
        }
    }
}

/// Process-wide settings, read from the environment on first use.
pub fn app_config() -> &'static AppConfig {
    CONFIG.get_or_init(AppConfig::from_env)
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(AppConfig::from_lookup(|_| None), AppConfig::default());
    }

    #[test]
    fn values_are_parsed_and_clamped() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("FE_FORM_LENGTH", "25"),
            ("FE_LIVE_MINUTE_CAP", "120"),
            ("FE_INCLUDE_LIVE", "Yes"),
            ("FE_TODAY", "2024-06-10"),
            ("FE_CACHE_DIR", " "),
        ]));
        assert_eq!(cfg.form_len, 10);
        assert_eq!(cfg.live_minute_cap, 120);
        assert!(cfg.include_live);
        assert_eq!(cfg.today, NaiveDate::from_ymd_opt(2024, 6, 10));
        assert!(cfg.cache_dir.is_none());
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("FE_FORM_LENGTH", "five"),
            ("FE_INCLUDE_LIVE", "maybe"),
            ("FE_TODAY", "someday"),
        ]));
        assert_eq!(cfg.form_len, DEFAULT_FORM_LEN);
        assert!(!cfg.include_live);
        assert!(cfg.today.is_none());
    }
}

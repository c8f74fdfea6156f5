use chrono::NaiveDate;
use std::{env, path::PathBuf};
use tracing::warn;

const DEFAULT_DATA_PATH: &str = "data/state.json";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub port: u16,
    pub today: Option<NaiveDate>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let today = lookup("APP_TODAY").and_then(|value| {
            match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(err) => {
                    warn!("ignoring APP_TODAY={value}: {err}");
                    None
                }
            }
        });

        Self {
            data_path,
            port,
            today,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.data_path, PathBuf::from("data/state.json"));
        assert_eq!(config.port, 8080);
        assert!(config.today.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("APP_DATA_PATH", "/tmp/habits.json"),
            ("PORT", "9000"),
            ("APP_TODAY", "2024-01-10"),
        ]);
        assert_eq!(config.data_path, PathBuf::from("/tmp/habits.json"));
        assert_eq!(config.port, 9000);
        assert_eq!(config.today, NaiveDate::from_ymd_opt(2024, 1, 10));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[("PORT", "not-a-port"), ("APP_TODAY", "10/01/2024")]);
        assert_eq!(config.port, 8080);
        assert!(config.today.is_none());
    }
}

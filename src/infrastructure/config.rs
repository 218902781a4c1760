//! Application configuration

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::domain::value_objects::{SelectionPolicy, TierTable, WideningPolicy};

/// Settings for the D&D 5e API client
#[derive(Debug, Clone)]
pub struct Dnd5eApiConfig {
    /// API base URL (without the `/api` suffix)
    pub base_url: String,
    pub timeout: Duration,
    /// Extra attempts after the first failed request
    pub max_retries: u32,
    /// Delay before the first retry; doubled on each subsequent retry
    pub retry_base_delay: Duration,
}

/// Where the creature catalog comes from
#[derive(Debug, Clone)]
pub enum CatalogSource {
    /// Static JSON reference file
    ReferenceData { path: PathBuf },
    /// D&D 5e API with an on-disk cache
    Dnd5eApi {
        api: Dnd5eApiConfig,
        cache_path: PathBuf,
        cache_ttl: Duration,
    },
}

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP server port
    pub server_port: u16,
    pub catalog: CatalogSource,
    /// Tier table, widening and count limits for enemy selection
    pub selection_policy: SelectionPolicy,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_source<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_port = parse_or(&lookup, "SERVER_PORT", 3000u16)
            .context("SERVER_PORT must be a valid port number")?;

        let catalog = match lookup("REFERENCE_DATA_PATH") {
            Some(path) if !path.trim().is_empty() => CatalogSource::ReferenceData {
                path: PathBuf::from(path),
            },
            _ => CatalogSource::Dnd5eApi {
                api: Dnd5eApiConfig {
                    base_url: lookup("DND5E_API_BASE_URL")
                        .unwrap_or_else(|| "https://www.dnd5eapi.co".to_string()),
                    timeout: Duration::from_secs(
                        parse_or(&lookup, "DND5E_API_TIMEOUT_SECS", 10u64)
                            .context("DND5E_API_TIMEOUT_SECS must be a whole number of seconds")?,
                    ),
                    max_retries: parse_or(&lookup, "DND5E_API_MAX_RETRIES", 2u32)
                        .context("DND5E_API_MAX_RETRIES must be a non-negative integer")?,
                    retry_base_delay: Duration::from_millis(
                        parse_or(&lookup, "DND5E_API_RETRY_BASE_DELAY_MS", 250u64)
                            .context("DND5E_API_RETRY_BASE_DELAY_MS must be a whole number of milliseconds")?,
                    ),
                },
                cache_path: PathBuf::from(
                    lookup("CATALOG_CACHE_PATH").unwrap_or_else(|| "cache/monsters.json".to_string()),
                ),
                cache_ttl: Duration::from_secs(
                    parse_or(&lookup, "CATALOG_CACHE_TTL_HOURS", 24u64)
                        .context("CATALOG_CACHE_TTL_HOURS must be a whole number of hours")?
                        * 3600,
                ),
            },
        };

        let selection_policy = selection_policy_from(&lookup)?;

        Ok(Self {
            server_port,
            catalog,
            selection_policy,
        })
    }
}

fn selection_policy_from<F>(lookup: &F) -> Result<SelectionPolicy>
where
    F: Fn(&str) -> Option<String>,
{
    let tier = |key: &str, default: (f64, f64)| -> Result<(f64, f64)> {
        match lookup(key) {
            Some(value) => parse_range(&value).with_context(|| format!("{} must look like '1-4'", key)),
            None => Ok(default),
        }
    };

    let tiers = TierTable::new(
        tier("COPILOT_TIER_EASY", (0.0, 3.0))?,
        tier("COPILOT_TIER_MEDIUM", (1.0, 4.0))?,
        tier("COPILOT_TIER_HARD", (2.0, 6.0))?,
        tier("COPILOT_TIER_DEADLY", (5.0, 12.0))?,
    )?;

    let widening = WideningPolicy::new(
        parse_or(lookup, "COPILOT_WIDEN_MIN_BY", 1.0f64).context("COPILOT_WIDEN_MIN_BY must be a number")?,
        parse_or(lookup, "COPILOT_WIDEN_MAX_BY", 2.0f64).context("COPILOT_WIDEN_MAX_BY must be a number")?,
    )?;

    let max_count = parse_or(lookup, "COPILOT_MAX_ENEMY_COUNT", 5usize)
        .context("COPILOT_MAX_ENEMY_COUNT must be a positive integer")?;

    Ok(SelectionPolicy::new(tiers, widening, max_count)?)
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => Ok(value.trim().parse()?),
        None => Ok(default),
    }
}

/// Parse "min-max" into a pair of bounds
fn parse_range(value: &str) -> Result<(f64, f64)> {
    let (min, max) = value
        .split_once('-')
        .ok_or_else(|| anyhow!("missing '-' in range '{}'", value))?;
    Ok((min.trim().parse()?, max.trim().parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::domain::value_objects::{CrRange, DifficultyTier};

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_source(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.selection_policy, SelectionPolicy::default());

        match config.catalog {
            CatalogSource::Dnd5eApi { api, cache_path, cache_ttl } => {
                assert_eq!(api.base_url, "https://www.dnd5eapi.co");
                assert_eq!(api.max_retries, 2);
                assert_eq!(api.retry_base_delay, Duration::from_millis(250));
                assert_eq!(cache_path, PathBuf::from("cache/monsters.json"));
                assert_eq!(cache_ttl, Duration::from_secs(24 * 3600));
            }
            other => panic!("unexpected catalog source: {:?}", other),
        }
    }

    #[test]
    fn test_reference_data_source() {
        let config = config_from(&[("REFERENCE_DATA_PATH", "data/monsters.json")]).unwrap();
        assert!(matches!(
            config.catalog,
            CatalogSource::ReferenceData { ref path } if path == &PathBuf::from("data/monsters.json")
        ));
    }

    #[test]
    fn test_policy_overrides() {
        let config = config_from(&[
            ("COPILOT_TIER_EASY", "0-2"),
            ("COPILOT_WIDEN_MAX_BY", "4"),
            ("COPILOT_MAX_ENEMY_COUNT", "8"),
        ])
        .unwrap();

        let policy = config.selection_policy;
        assert_eq!(policy.tiers.range_for(DifficultyTier::Easy), CrRange { min: 0.0, max: 2.0 });
        assert_eq!(policy.tiers.range_for(DifficultyTier::Deadly), CrRange { min: 5.0, max: 12.0 });
        assert_eq!(policy.max_count, 8);
        assert_eq!(
            policy.widening.apply(CrRange { min: 3.0, max: 3.0 }),
            CrRange { min: 2.0, max: 7.0 }
        );
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(config_from(&[("SERVER_PORT", "not-a-port")]).is_err());
        assert!(config_from(&[("COPILOT_TIER_HARD", "6-2")]).is_err());
        assert!(config_from(&[("COPILOT_TIER_HARD", "six")]).is_err());
        assert!(config_from(&[("COPILOT_MAX_ENEMY_COUNT", "0")]).is_err());
        assert!(config_from(&[("COPILOT_WIDEN_MIN_BY", "-1")]).is_err());
    }
}

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use dotenvy::dotenv;

use crate::cache::DEFAULT_TTL_SECS;
use crate::scoring::DEFAULT_AT_RISK_THRESHOLD;

const MAX_CACHE_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub cache_ttl_secs: i64,
    pub at_risk_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".campus-nexus"),
            cache_ttl_secs: DEFAULT_TTL_SECS,
            at_risk_threshold: DEFAULT_AT_RISK_THRESHOLD,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            data_dir: lookup("CAMPUS_NEXUS_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            cache_ttl_secs: match lookup("CAMPUS_NEXUS_CACHE_TTL_SECS") {
                Some(raw) => parse_ttl(&raw)?,
                None => defaults.cache_ttl_secs,
            },
            at_risk_threshold: match lookup("CAMPUS_NEXUS_AT_RISK_THRESHOLD") {
                Some(raw) => raw
                    .parse()
                    .context("CAMPUS_NEXUS_AT_RISK_THRESHOLD must be a number")?,
                None => defaults.at_risk_threshold,
            },
        })
    }
}

fn parse_ttl(raw: &str) -> Result<i64> {
    let secs: i64 = raw
        .parse()
        .context("CAMPUS_NEXUS_CACHE_TTL_SECS must be a whole number of seconds")?;
    if !(0..=MAX_CACHE_TTL_SECS).contains(&secs) {
        bail!("CAMPUS_NEXUS_CACHE_TTL_SECS must be between 0 and {MAX_CACHE_TTL_SECS}, got {secs}");
    }
    Ok(secs)
}

// src/config.rs

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: Option<String>,
    pub simulate_workflow: bool,
    /// `None` disables the background sweep.
    pub escalation_sweep: Option<Duration>,
    pub seed_demo_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: None,
            simulate_workflow: false,
            escalation_sweep: Some(Duration::from_secs(300)),
            seed_demo_data: true,
        }
    }
}

fn parse_var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("invalid value for {name}: '{raw}'")),
        _ => Ok(None),
    }
}

impl Config {
    /// Read configuration from the environment (after `.env`, if any, has
    /// been loaded).
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Config::default();

        let sweep_secs: Option<u64> = parse_var("ESCALATION_SWEEP_SECS")?;
        let escalation_sweep = match sweep_secs {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.escalation_sweep,
        };

        Ok(Config {
            port: parse_var("PORT")?.unwrap_or(defaults.port),
            database_url: env::var("DATABASE_URL").ok().filter(|u| !u.trim().is_empty()),
            simulate_workflow: parse_var("SIMULATE_WORKFLOW")?.unwrap_or(defaults.simulate_workflow),
            escalation_sweep,
            seed_demo_data: parse_var("SEED_DEMO_DATA")?.unwrap_or(defaults.seed_demo_data),
        })
    }
}

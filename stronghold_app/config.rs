use dotenvy::dotenv;
use std::env;

use stronghold_types::common::ResourceGroup;

#[derive(Debug, Clone)]
pub struct Config {
    pub speed: u8,
    /// Share of the cost given back when an upgrade is cancelled right after it started.
    pub base_refund_rate: f64,
    /// Upgrades allowed to run at once in a village, `None` for no cap.
    pub max_concurrent_upgrades: Option<usize>,
    /// Seconds between queue sweeps, 0 disables the sweeper.
    pub sweep_interval_secs: u64,
    pub starting_resources: ResourceGroup,
    pub catalog_path: Option<String>,
    pub http_port: u16,
    pub database_url: Option<String>,
    /// Directory of the daily rolling log files.
    pub log_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speed: 1,
            base_refund_rate: 0.5,
            max_concurrent_upgrades: None,
            sweep_interval_secs: 5,
            starting_resources: ResourceGroup::splat(750),
            catalog_path: None,
            http_port: 8080,
            database_url: None,
            log_dir: "logs".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();
        let defaults = Self::default();

        let speed = match env::var("STRONGHOLD_SERVER_SPEED") {
            Ok(val) => val.parse::<u8>().unwrap_or(defaults.speed).clamp(1, 10),
            Err(_) => defaults.speed,
        };

        let base_refund_rate = match env::var("STRONGHOLD_BASE_REFUND_RATE") {
            Ok(val) => val
                .parse::<f64>()
                .ok()
                .filter(|rate| rate.is_finite())
                .unwrap_or(defaults.base_refund_rate)
                .clamp(0.0, 1.0),
            Err(_) => defaults.base_refund_rate,
        };

        let max_concurrent_upgrades = match env::var("STRONGHOLD_MAX_CONCURRENT_UPGRADES") {
            Ok(val) => val.parse::<usize>().ok().filter(|limit| *limit > 0),
            Err(_) => None,
        };

        let sweep_interval_secs = match env::var("STRONGHOLD_SWEEP_INTERVAL_SECS") {
            Ok(val) => val.parse::<u64>().unwrap_or(defaults.sweep_interval_secs),
            Err(_) => defaults.sweep_interval_secs,
        };

        let starting_resources = match env::var("STRONGHOLD_STARTING_RESOURCES") {
            Ok(val) => parse_resources(&val).unwrap_or(defaults.starting_resources),
            Err(_) => defaults.starting_resources,
        };

        let catalog_path = env::var("STRONGHOLD_CATALOG_PATH")
            .ok()
            .filter(|p| !p.is_empty());

        let http_port = match env::var("STRONGHOLD_HTTP_PORT") {
            Ok(val) => val.parse::<u16>().unwrap_or(defaults.http_port),
            Err(_) => defaults.http_port,
        };

        let database_url = env::var("DATABASE_URL").ok().filter(|u| !u.is_empty());

        let log_dir = env::var("STRONGHOLD_LOG_DIR")
            .ok()
            .filter(|d| !d.is_empty())
            .unwrap_or(defaults.log_dir);

        Self {
            speed,
            base_refund_rate,
            max_concurrent_upgrades,
            sweep_interval_secs,
            starting_resources,
            catalog_path,
            http_port,
            database_url,
            log_dir,
        }
    }
}

/// Parses `wood,stone,food,gold`.
fn parse_resources(value: &str) -> Option<ResourceGroup> {
    let amounts = value
        .split(',')
        .map(|part| part.trim().parse::<u32>().ok())
        .collect::<Option<Vec<u32>>>()?;

    match amounts.as_slice() {
        [wood, stone, food, gold] => Some(ResourceGroup::new(*wood, *stone, *food, *gold)),
        _ => None,
    }
}

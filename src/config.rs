//! Runtime configuration loading from environment variables.
//!
//! All configuration values are loaded from `LANDING_PRELOAD_*` environment
//! variables with sensible defaults. Invalid values fall back to defaults
//! without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `LANDING_PRELOAD_MAX_CONCURRENT` | 3 | Max concurrent image fetches |
//! | `LANDING_PRELOAD_SAFETY_NET_MS` | 500 | Safety-net drain interval (ms) |
//! | `LANDING_PRELOAD_IDLE_DELAY_MS` | 100 | Deferred drain delay (ms) |
//! | `LANDING_PRELOAD_SCHEDULER` | deferred | `deferred` or `immediate` |
//! | `LANDING_PRELOAD_DWELL_MS` | 5000 | Breakdown step duration (ms) |
//! | `LANDING_PRELOAD_LEAD_MS` | 2000 | Preload head start before a step (ms) |
//! | `LANDING_PRELOAD_TRANSITION_MS` | 300 | Gap between breakdown steps (ms) |
//! | `LANDING_PRELOAD_HERO_THRESHOLD` | 0.1 | Hero intersection threshold |
//! | `LANDING_PRELOAD_ASSET_ROOT` | . | Root directory for local assets |
//! | `LANDING_PRELOAD_CDN_URL` | (empty) | Asset base url |
//! | `LANDING_PRELOAD_LOG_FORMAT` | json | `json` or `pretty` |
//! | `LANDING_PRELOAD_LOG_LEVEL` | info | Tracing filter directive |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::animation::BreakdownTiming;
use crate::scheduler::{LoaderConfig, SchedulerMode};
use crate::telemetry::{LogConfig, LogFormat};
use crate::viewport::HERO_THRESHOLD;

/// Effective runtime configuration summary (serializable).
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub max_concurrent: usize,
    pub safety_net_ms: u64,
    pub idle_delay_ms: u64,
    pub scheduler: SchedulerMode,
    pub dwell_ms: u64,
    pub preload_lead_ms: u64,
    pub transition_ms: u64,
    pub hero_threshold: f64,
    pub asset_root: String,
    pub cdn_url: String,
    pub log_format: LogFormat,
    pub log_level: String,
}

/// All runtime configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub loader: LoaderConfig,
    pub scheduler: SchedulerMode,
    pub idle_delay: Duration,
    pub breakdown: BreakdownTiming,
    pub preload_lead: Duration,
    pub hero_threshold: f64,
    pub asset_root: PathBuf,
    pub cdn_url: String,
    pub logging: LogConfig,
}

/// Parse a `usize` env var, returning `default` on missing or invalid.
fn parse_usize(key: &str, default: usize) -> usize {
    parse_or(key, default)
}

/// Parse a `u64` env var, returning `default` on missing or invalid.
fn parse_u64(key: &str, default: u64) -> u64 {
    parse_or(key, default)
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Load loader configuration from environment.
fn load_loader_config() -> LoaderConfig {
    let max_concurrent = parse_usize("LANDING_PRELOAD_MAX_CONCURRENT", 3);
    let safety_net_ms = parse_u64("LANDING_PRELOAD_SAFETY_NET_MS", 500);
    let max_concurrent = max_concurrent.max(1);
    let safety_net_ms = safety_net_ms.max(10); // floor: 10ms
    LoaderConfig {
        max_concurrent,
        safety_net_interval: Duration::from_millis(safety_net_ms),
    }
}

/// Load breakdown animation timing from environment.
fn load_breakdown_timing() -> BreakdownTiming {
    let dwell_ms = parse_u64("LANDING_PRELOAD_DWELL_MS", 5000);
    let transition_ms = parse_u64("LANDING_PRELOAD_TRANSITION_MS", 300);
    BreakdownTiming {
        dwell: Duration::from_millis(dwell_ms.max(1)),
        transition: Duration::from_millis(transition_ms),
    }
}

/// Load logging configuration from environment.
fn load_log_config() -> LogConfig {
    let format = parse_or("LANDING_PRELOAD_LOG_FORMAT", LogFormat::Json);
    let level = parse_string("LANDING_PRELOAD_LOG_LEVEL", "info");
    LogConfig {
        format,
        level,
        output_path: None,
    }
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> EnvConfig {
    let scheduler = parse_or("LANDING_PRELOAD_SCHEDULER", SchedulerMode::Deferred);
    let idle_delay_ms = parse_u64("LANDING_PRELOAD_IDLE_DELAY_MS", 100);
    let lead_ms = parse_u64("LANDING_PRELOAD_LEAD_MS", 2000);
    let hero_threshold = parse_or("LANDING_PRELOAD_HERO_THRESHOLD", HERO_THRESHOLD);
    let hero_threshold = if hero_threshold.is_finite() {
        hero_threshold.clamp(0.0, 1.0)
    } else {
        HERO_THRESHOLD
    };

    EnvConfig {
        loader: load_loader_config(),
        scheduler,
        idle_delay: Duration::from_millis(idle_delay_ms),
        breakdown: load_breakdown_timing(),
        preload_lead: Duration::from_millis(lead_ms),
        hero_threshold,
        asset_root: PathBuf::from(parse_string("LANDING_PRELOAD_ASSET_ROOT", ".")),
        cdn_url: parse_string("LANDING_PRELOAD_CDN_URL", ""),
        logging: load_log_config(),
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            loader: LoaderConfig::default(),
            scheduler: SchedulerMode::default(),
            idle_delay: Duration::from_millis(100),
            breakdown: BreakdownTiming::default(),
            preload_lead: Duration::from_millis(2000),
            hero_threshold: HERO_THRESHOLD,
            asset_root: PathBuf::from("."),
            cdn_url: String::new(),
            logging: LogConfig::default(),
        }
    }
}

impl EnvConfig {
    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            max_concurrent: self.loader.max_concurrent,
            safety_net_ms: self.loader.safety_net_interval.as_millis() as u64,
            idle_delay_ms: self.idle_delay.as_millis() as u64,
            scheduler: self.scheduler,
            dwell_ms: self.breakdown.dwell.as_millis() as u64,
            preload_lead_ms: self.preload_lead.as_millis() as u64,
            transition_ms: self.breakdown.transition.as_millis() as u64,
            hero_threshold: self.hero_threshold,
            asset_root: self.asset_root.display().to_string(),
            cdn_url: self.cdn_url.clone(),
            log_format: self.logging.format,
            log_level: self.logging.level.clone(),
        }
    }
}

// Copyright 2024-2026 landing-preload Contributors
// SPDX-License-Identifier: Apache-2.0

//! Config CLI subcommands: show, defaults, validate.
//!
//! These commands read configuration directly from environment variables.

use crate::config::{self, EffectiveConfig, EnvConfig};

/// Print effective config to stdout, as key-value pairs or JSON.
pub fn run_show(json: bool) -> i32 {
    let cfg = config::load().effective_config();
    emit(&cfg, json)
}

/// Print default config values (no env overrides) to stdout.
pub fn run_defaults(json: bool) -> i32 {
    let cfg = EnvConfig::default().effective_config();
    emit(&cfg, json)
}

/// Validate configuration for obvious misconfigurations.
///
/// Returns 0 if valid, 1 if any warnings are found.
pub fn run_validate() -> i32 {
    let env = config::load();
    let warnings = validate(&env);
    for warning in &warnings {
        eprintln!("WARNING: {warning}");
    }
    if warnings.is_empty() {
        println!("Configuration is valid.");
        0
    } else {
        1
    }
}

/// Collect human-readable warnings for `env`.
pub fn validate(env: &EnvConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if env.preload_lead >= env.breakdown.dwell {
        warnings.push(format!(
            "LANDING_PRELOAD_LEAD_MS ({}) >= LANDING_PRELOAD_DWELL_MS ({}); preloads fire immediately",
            env.preload_lead.as_millis(),
            env.breakdown.dwell.as_millis()
        ));
    }
    if env.hero_threshold == 0.0 {
        warnings.push(
            "LANDING_PRELOAD_HERO_THRESHOLD is 0; the hero counts as visible while any edge touches the viewport"
                .to_string(),
        );
    }
    if !env.asset_root.is_dir() {
        warnings.push(format!(
            "LANDING_PRELOAD_ASSET_ROOT ({}) is not a directory",
            env.asset_root.display()
        ));
    }
    if !env.cdn_url.is_empty() && !env.cdn_url.starts_with("http") {
        warnings.push(format!(
            "LANDING_PRELOAD_CDN_URL ({}) is not an http(s) url",
            env.cdn_url
        ));
    }
    warnings
}

fn emit(cfg: &EffectiveConfig, json: bool) -> i32 {
    if !json {
        print_config(cfg);
        return 0;
    }
    match serde_json::to_string_pretty(cfg) {
        Ok(text) => {
            println!("{text}");
            0
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {e}");
            1
        }
    }
}

fn print_config(cfg: &EffectiveConfig) {
    println!("LANDING_PRELOAD_MAX_CONCURRENT={}", cfg.max_concurrent);
    println!("LANDING_PRELOAD_SAFETY_NET_MS={}", cfg.safety_net_ms);
    println!("LANDING_PRELOAD_IDLE_DELAY_MS={}", cfg.idle_delay_ms);
    println!("LANDING_PRELOAD_SCHEDULER={}", scheduler_name(cfg));
    println!("LANDING_PRELOAD_DWELL_MS={}", cfg.dwell_ms);
    println!("LANDING_PRELOAD_LEAD_MS={}", cfg.preload_lead_ms);
    println!("LANDING_PRELOAD_TRANSITION_MS={}", cfg.transition_ms);
    println!("LANDING_PRELOAD_HERO_THRESHOLD={}", cfg.hero_threshold);
    println!("LANDING_PRELOAD_ASSET_ROOT={}", cfg.asset_root);
    println!("LANDING_PRELOAD_CDN_URL={}", cfg.cdn_url);
    println!("LANDING_PRELOAD_LOG_FORMAT={}", log_format_name(cfg));
    println!("LANDING_PRELOAD_LOG_LEVEL={}", cfg.log_level);
}

fn scheduler_name(cfg: &EffectiveConfig) -> &'static str {
    match cfg.scheduler {
        crate::scheduler::SchedulerMode::Immediate => "immediate",
        crate::scheduler::SchedulerMode::Deferred => "deferred",
    }
}

fn log_format_name(cfg: &EffectiveConfig) -> &'static str {
    match cfg.log_format {
        crate::telemetry::LogFormat::Json => "json",
        crate::telemetry::LogFormat::Pretty => "pretty",
    }
}

// Copyright 2024-2026 landing-preload Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI module for the `landing-preload` binary.
//!
//! ## Usage
//!
//! ```bash
//! landing-preload preload site.toml --selected scout   # Preload and report as JSON
//! landing-preload config show                          # Effective configuration
//! landing-preload config defaults --json               # Defaults as JSON
//! ```

pub mod config_cmd;
pub mod preload_cmd;

pub use preload_cmd::{preload, run_preload, ImageReport, ImageStatus, PreloadArgs, PreloadSummary};

/// Whether `flag` appears anywhere in `args`.
pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

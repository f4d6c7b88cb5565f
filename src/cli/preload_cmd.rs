// Copyright 2024-2026 landing-preload Contributors
// SPDX-License-Identifier: Apache-2.0

//! `preload` subcommand: load a manifest's above-the-fold images from disk.
//!
//! Queues the hero thumbnails and wave 0 of the reason tracks, waits for the
//! loader to go idle, and prints a JSON report.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::manifest::{AssetManifest, ManifestError};
use crate::scheduler::{
    reason_image_id, ImageLoader, ImageSource, LoaderStats, ResourcePriority,
};
use crate::{PreloadRuntime, RuntimeConfig};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Parsed `preload` arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadArgs {
    pub manifest: PathBuf,
    pub selected: Option<String>,
    pub timeout: Duration,
}

impl PreloadArgs {
    /// Parse everything after the subcommand name.
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let mut manifest = None;
        let mut selected = None;
        let mut timeout_secs = DEFAULT_TIMEOUT_SECS;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--selected" => {
                    let value = args.get(i + 1).ok_or("Missing value for --selected")?;
                    selected = Some(value.clone());
                    i += 2;
                }
                "--timeout-secs" => {
                    let value = args.get(i + 1).ok_or("Missing value for --timeout-secs")?;
                    timeout_secs = value
                        .parse()
                        .map_err(|_| format!("Invalid --timeout-secs: {value}"))?;
                    i += 2;
                }
                flag if flag.starts_with("--") => {
                    return Err(format!("Unknown argument: {flag}"));
                }
                path => {
                    if manifest.is_some() {
                        return Err(format!("Unexpected argument: {path}"));
                    }
                    manifest = Some(PathBuf::from(path));
                    i += 1;
                }
            }
        }

        Ok(Self {
            manifest: manifest.ok_or("Missing manifest path")?,
            selected,
            timeout: Duration::from_secs(timeout_secs.max(1)),
        })
    }
}

/// Outcome of one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    Loaded,
    Failed,
    Cancelled,
    Unfinished,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageReport {
    pub id: String,
    pub url: String,
    pub priority: ResourcePriority,
    pub status: ImageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreloadSummary {
    pub manifest: String,
    pub completed: bool,
    pub elapsed_ms: u64,
    pub stats: LoaderStats,
    pub images: Vec<ImageReport>,
}

impl PreloadSummary {
    pub fn all_loaded(&self) -> bool {
        self.images.iter().all(|i| i.status == ImageStatus::Loaded)
    }
}

/// Entry point for `landing-preload preload ...`. Returns the exit code.
pub async fn run_preload(args: &[String], config: RuntimeConfig) -> i32 {
    let args = match PreloadArgs::parse(args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            eprintln!(
                "Usage: landing-preload preload <MANIFEST> [--selected NAME] [--timeout-secs N]"
            );
            return 2;
        }
    };

    let manifest = match AssetManifest::load(&args.manifest) {
        Ok(manifest) => Arc::new(manifest),
        Err(e) => {
            eprintln!("Error: {e}");
            return 2;
        }
    };

    let summary = match preload(
        config,
        manifest,
        args.selected.as_deref(),
        args.timeout,
        args.manifest.display().to_string(),
    )
    .await
    {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error: {e}");
            return 2;
        }
    };

    match serde_json::to_string_pretty(&summary) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Failed to serialize report: {e}");
            return 1;
        }
    }
    if summary.completed && summary.all_loaded() {
        0
    } else {
        1
    }
}

/// Run one preload pass over `manifest` with assets from `config.asset_root`.
pub async fn preload(
    config: RuntimeConfig,
    manifest: Arc<AssetManifest>,
    selected: Option<&str>,
    timeout: Duration,
    label: String,
) -> Result<PreloadSummary, ManifestError> {
    let started = Instant::now();
    let mut runtime = PreloadRuntime::with_file_fetcher(config);
    runtime.start();

    let thumbnails = runtime.preload_thumbnails(&manifest, selected)?;

    let mut section = runtime.breakdown_section(Arc::clone(&manifest));
    let now = Instant::now();
    for track in 0..manifest.tracks.len() {
        section.set_track_visible(track, true, now);
    }

    let completed = runtime.loader().wait_idle(timeout).await;
    if !completed {
        tracing::warn!(timeout_secs = timeout.as_secs(), "preload timed out");
    }

    let loader = runtime.loader().clone();
    let stats = loader.stats();
    let thumbnail_status: Vec<ImageStatus> = thumbnails
        .iter()
        .map(|(plan, _)| queue_status(&loader, &plan.id))
        .collect();
    let mut wave_reports = Vec::new();
    for track in 0..manifest.tracks.len() {
        let Some(url) = manifest.image_url(track, 0) else {
            continue;
        };
        let id = reason_image_id(track, 0);
        wave_reports.push(ImageReport {
            status: queue_status(&loader, &id),
            id,
            url,
            priority: ResourcePriority::for_wave(0),
            size_bytes: None,
            error: None,
        });
    }

    drop(section);
    runtime.shutdown().await;

    let (plans, receivers): (Vec<_>, Vec<_>) = thumbnails.into_iter().unzip();
    let results = futures::future::join_all(receivers).await;

    let mut images: Vec<ImageReport> = plans
        .into_iter()
        .zip(results)
        .zip(thumbnail_status)
        .map(|((plan, result), fallback)| {
            let (status, size_bytes, error) = match result {
                Ok(Ok(image)) => (ImageStatus::Loaded, Some(image.size_bytes), None),
                Ok(Err(e)) => (ImageStatus::Failed, None, Some(e.to_string())),
                Err(_) => (fallback, None, None),
            };
            ImageReport {
                id: plan.id,
                url: plan.url,
                priority: plan.priority,
                status,
                size_bytes,
                error,
            }
        })
        .collect();
    images.extend(wave_reports);

    Ok(PreloadSummary {
        manifest: label,
        completed,
        elapsed_ms: started.elapsed().as_millis() as u64,
        stats,
        images,
    })
}

fn queue_status(loader: &ImageLoader, id: &str) -> ImageStatus {
    if loader.is_image_loaded(id) {
        ImageStatus::Loaded
    } else if loader.has_image_failed(id) {
        ImageStatus::Failed
    } else if loader.is_image_cancelled(id) {
        ImageStatus::Cancelled
    } else {
        ImageStatus::Unfinished
    }
}

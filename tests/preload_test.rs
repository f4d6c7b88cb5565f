//! End-to-end preload of a manifest from a temporary asset root.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use landing_preload::cli::{preload, ImageStatus};
use landing_preload::manifest::AssetManifest;
use landing_preload::scheduler::{ResourcePriority, SchedulerMode};
use landing_preload::RuntimeConfig;

fn write_asset(root: &Path, relative: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"\x89PNG fake image bytes").unwrap();
}

fn manifest_toml() -> &'static str {
    r#"
cdn_url = "https://cdn.example.com"

[[thumbnails]]
name = "scout"
url = "/Images/agents/scout.png"

[[thumbnails]]
name = "scribe"
url = "/Images/agents/scribe.png"

[[thumbnails]]
name = "sentinel"
url = "/Images/agents/sentinel.png"

[[tracks]]
name = "speed"
images = ["/Images/reasons/speed-0.png", "/Images/reasons/speed-1.png"]

[[tracks]]
name = "trust"
images = ["/Images/reasons/trust-0.png"]
"#
}

fn config(root: &Path, scheduler: SchedulerMode) -> RuntimeConfig {
    RuntimeConfig {
        scheduler,
        idle_delay: Duration::from_millis(5),
        asset_root: root.to_path_buf(),
        cdn_url: "https://cdn.example.com".to_string(),
        ..RuntimeConfig::default()
    }
}

#[tokio::test]
async fn preloads_thumbnails_and_first_wave() {
    let dir = tempfile::tempdir().unwrap();
    for file in [
        "Images/agents/scout.png",
        "Images/agents/scribe.png",
        "Images/agents/sentinel.png",
        "Images/reasons/speed-0.png",
        "Images/reasons/trust-0.png",
    ] {
        write_asset(dir.path(), file);
    }

    let manifest = Arc::new(AssetManifest::from_toml_str(manifest_toml()).unwrap());
    let summary = preload(
        config(dir.path(), SchedulerMode::Deferred),
        manifest,
        Some("scribe"),
        Duration::from_secs(10),
        "site.toml".to_string(),
    )
    .await
    .unwrap();

    assert!(summary.completed);
    assert!(summary.all_loaded(), "{summary:?}");
    assert_eq!(summary.images.len(), 5);
    assert_eq!(summary.stats.loaded, 5);

    let scribe = &summary.images[1];
    assert_eq!(scribe.id, "agent-thumbnail-scribe");
    assert_eq!(scribe.priority, ResourcePriority::Critical);
    assert_eq!(scribe.url, "https://cdn.example.com/Images/agents/scribe.png");
    assert!(scribe.size_bytes.unwrap() > 0);

    let ids: Vec<&str> = summary.images[3..].iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["reason-0-breakdown-0", "reason-1-breakdown-0"]);
}

#[tokio::test]
async fn missing_asset_is_reported_as_failed() {
    let dir = tempfile::tempdir().unwrap();
    for file in [
        "Images/agents/scout.png",
        "Images/agents/sentinel.png",
        "Images/reasons/speed-0.png",
        "Images/reasons/trust-0.png",
    ] {
        write_asset(dir.path(), file);
    }

    let manifest = Arc::new(AssetManifest::from_toml_str(manifest_toml()).unwrap());
    let summary = preload(
        config(dir.path(), SchedulerMode::Immediate),
        manifest,
        None,
        Duration::from_secs(10),
        "site.toml".to_string(),
    )
    .await
    .unwrap();

    assert!(summary.completed);
    assert!(!summary.all_loaded());
    let scribe = summary
        .images
        .iter()
        .find(|i| i.id == "agent-thumbnail-scribe")
        .unwrap();
    assert_eq!(scribe.status, ImageStatus::Failed);
    assert!(scribe.error.as_deref().unwrap().contains("scribe.png"));
    assert_eq!(summary.stats.failed, 1);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["images"][1]["status"], "failed");
    assert_eq!(json["images"][0]["priority"], "CRITICAL");
}

#[tokio::test]
async fn unknown_selection_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = Arc::new(AssetManifest::from_toml_str(manifest_toml()).unwrap());
    let result = preload(
        config(dir.path(), SchedulerMode::Immediate),
        manifest,
        Some("nobody"),
        Duration::from_secs(1),
        "site.toml".to_string(),
    )
    .await;
    assert!(result.is_err());
}

#[test]
fn manifest_loads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("site.toml");
    std::fs::write(&path, manifest_toml()).unwrap();
    let manifest = AssetManifest::load(&path).unwrap();
    assert_eq!(manifest.thumbnails.len(), 3);
    assert!(AssetManifest::load(&dir.path().join("missing.toml")).is_err());
}

//! Asset manifest: which images the landing page preloads and where they live.
//!
//! ```toml
//! cdn_url = "https://cdn.example.com"
//!
//! [[thumbnails]]
//! name = "scout"
//! url = "/Images/agents/scout.webp"
//!
//! [[tracks]]
//! name = "speed"
//! images = ["/Images/reasons/speed-0.webp", "/Images/reasons/speed-1.webp"]
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scheduler::{agent_thumbnail_id, ImageSource, ResourcePriority};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid manifest: {0}")]
    Invalid(String),

    #[error("unknown thumbnail: {0}")]
    UnknownThumbnail(String),
}

/// An agent card image shown in the hero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub name: String,
    pub url: String,
}

/// Images of one reason track, in reveal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Base prepended to root-relative urls.
    #[serde(default)]
    pub cdn_url: String,
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// A planned thumbnail load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThumbnailRequest {
    pub id: String,
    pub url: String,
    pub priority: ResourcePriority,
}

impl AssetManifest {
    /// Load and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ManifestError> {
        let manifest: Self = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Names must be non-empty and unique; urls must be non-empty.
    pub fn validate(&self) -> Result<(), ManifestError> {
        let mut names = HashSet::new();
        for thumb in &self.thumbnails {
            if thumb.name.trim().is_empty() {
                return Err(ManifestError::Invalid("thumbnail name cannot be empty".into()));
            }
            if thumb.url.trim().is_empty() {
                return Err(ManifestError::Invalid(format!(
                    "thumbnail {} has an empty url",
                    thumb.name
                )));
            }
            if !names.insert(thumb.name.as_str()) {
                return Err(ManifestError::Invalid(format!(
                    "duplicate thumbnail name: {}",
                    thumb.name
                )));
            }
        }
        for (i, track) in self.tracks.iter().enumerate() {
            if track.images.iter().any(|url| url.trim().is_empty()) {
                return Err(ManifestError::Invalid(format!(
                    "track {i} ({}) has an empty image url",
                    track.name
                )));
            }
        }
        Ok(())
    }

    /// Prefix root-relative paths with the CDN base; anything else is returned as is.
    pub fn resolve_url(&self, url: &str) -> String {
        let base = self.cdn_url.trim_end_matches('/');
        if base.is_empty() || !url.starts_with('/') {
            return url.to_string();
        }
        format!("{base}{url}")
    }

    /// Load plan for the hero thumbnails.
    ///
    /// The selected agent (first when `None`) is CRITICAL, the one after it
    /// MEDIUM, the rest LAZY.
    pub fn thumbnail_requests(
        &self,
        selected: Option<&str>,
    ) -> Result<Vec<ThumbnailRequest>, ManifestError> {
        let count = self.thumbnails.len();
        if count == 0 {
            return Ok(Vec::new());
        }
        let selected_index = match selected {
            Some(name) => self
                .thumbnails
                .iter()
                .position(|t| t.name == name)
                .ok_or_else(|| ManifestError::UnknownThumbnail(name.to_string()))?,
            None => 0,
        };
        let next_index = (selected_index + 1) % count;

        let requests = self
            .thumbnails
            .iter()
            .enumerate()
            .map(|(i, thumb)| {
                let priority = if i == selected_index {
                    ResourcePriority::Critical
                } else if i == next_index {
                    ResourcePriority::Medium
                } else {
                    ResourcePriority::Lazy
                };
                ThumbnailRequest {
                    id: agent_thumbnail_id(&thumb.name),
                    url: self.resolve_url(&thumb.url),
                    priority,
                }
            })
            .collect();
        Ok(requests)
    }

    pub fn track_lengths(&self) -> Vec<usize> {
        self.tracks.iter().map(|t| t.images.len()).collect()
    }

    /// Longest track; used as the wave grid width.
    pub fn max_track_len(&self) -> usize {
        self.tracks.iter().map(|t| t.images.len()).max().unwrap_or(0)
    }
}

impl ImageSource for AssetManifest {
    fn image_url(&self, track: usize, item: usize) -> Option<String> {
        let url = self.tracks.get(track)?.images.get(item)?;
        Some(self.resolve_url(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
cdn_url = "https://cdn.example.com/"

[[thumbnails]]
name = "scout"
url = "/Images/agents/scout.webp"

[[thumbnails]]
name = "scribe"
url = "/Images/agents/scribe.webp"

[[thumbnails]]
name = "sentinel"
url = "https://other.example.com/sentinel.webp"

[[tracks]]
name = "speed"
images = ["/Images/reasons/speed-0.webp", "/Images/reasons/speed-1.webp"]

[[tracks]]
name = "trust"
images = ["/Images/reasons/trust-0.webp"]
"#;

    #[test]
    fn parses_sample() {
        let manifest = AssetManifest::from_toml_str(SAMPLE).unwrap();
        assert_eq!(manifest.thumbnails.len(), 3);
        assert_eq!(manifest.track_lengths(), vec![2, 1]);
        assert_eq!(manifest.max_track_len(), 2);
    }

    #[test]
    fn resolves_root_relative_urls_only() {
        let manifest = AssetManifest::from_toml_str(SAMPLE).unwrap();
        assert_eq!(manifest.resolve_url("/a.png"), "https://cdn.example.com/a.png");
        assert_eq!(manifest.resolve_url("https://x.test/a.png"), "https://x.test/a.png");

        let local = AssetManifest::default();
        assert_eq!(local.resolve_url("/a.png"), "/a.png");
    }

    #[test]
    fn thumbnail_plan_priorities() {
        let manifest = AssetManifest::from_toml_str(SAMPLE).unwrap();
        let plan = manifest.thumbnail_requests(Some("scribe")).unwrap();
        let priorities: Vec<_> = plan.iter().map(|r| (r.id.as_str(), r.priority)).collect();
        assert_eq!(
            priorities,
            vec![
                ("agent-thumbnail-scout", ResourcePriority::Lazy),
                ("agent-thumbnail-scribe", ResourcePriority::Critical),
                ("agent-thumbnail-sentinel", ResourcePriority::Medium),
            ]
        );
    }

    #[test]
    fn thumbnail_plan_defaults_to_first() {
        let manifest = AssetManifest::from_toml_str(SAMPLE).unwrap();
        let plan = manifest.thumbnail_requests(None).unwrap();
        assert_eq!(plan[0].priority, ResourcePriority::Critical);
        assert_eq!(plan[1].priority, ResourcePriority::Medium);
        assert_eq!(plan[2].priority, ResourcePriority::Lazy);
    }

    #[test]
    fn unknown_selection_is_an_error() {
        let manifest = AssetManifest::from_toml_str(SAMPLE).unwrap();
        assert!(matches!(
            manifest.thumbnail_requests(Some("nobody")),
            Err(ManifestError::UnknownThumbnail(_))
        ));
    }

    #[test]
    fn image_source_resolves_grid() {
        let manifest = AssetManifest::from_toml_str(SAMPLE).unwrap();
        assert_eq!(
            manifest.image_url(0, 1).as_deref(),
            Some("https://cdn.example.com/Images/reasons/speed-1.webp")
        );
        assert_eq!(manifest.image_url(1, 1), None);
        assert_eq!(manifest.image_url(5, 0), None);
    }

    #[test]
    fn rejects_duplicate_names() {
        let toml = r#"
[[thumbnails]]
name = "a"
url = "/a.png"

[[thumbnails]]
name = "a"
url = "/b.png"
"#;
        assert!(matches!(
            AssetManifest::from_toml_str(toml),
            Err(ManifestError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_bad_toml() {
        assert!(matches!(
            AssetManifest::from_toml_str("thumbnails = 3"),
            Err(ManifestError::Parse(_))
        ));
    }
}

use serde::Serialize;

use crate::models::{Category, Video, VideoType};

/// Home-page sections derived from a single fetch of the visible catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCatalog {
    pub movies: Vec<Video>,
    pub series: Vec<Video>,
    pub featured: Vec<Video>,
    pub new_releases: Vec<Video>,
    pub categories: Vec<Category>,
}

impl ContentCatalog {
    /// Splits `videos` into sections of at most `section_size` entries,
    /// newest first. Hidden videos are dropped even if the caller passed
    /// them in.
    pub fn from_videos(mut videos: Vec<Video>, categories: Vec<Category>, section_size: usize) -> Self {
        videos.retain(|v| !v.is_hidden);
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let pick = |keep: &dyn Fn(&Video) -> bool| -> Vec<Video> {
            videos.iter().filter(|v| keep(v)).take(section_size).cloned().collect()
        };

        Self {
            movies: pick(&|v: &Video| v.kind() == Some(VideoType::Movie)),
            series: pick(&|v: &Video| v.kind() == Some(VideoType::Series)),
            featured: pick(&|v: &Video| v.is_featured),
            new_releases: pick(&|v: &Video| v.is_new),
            categories,
        }
    }
}

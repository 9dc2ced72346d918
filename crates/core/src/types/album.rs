//! Photo albums hosted on an external photo service.

use serde::{Deserialize, Serialize};

/// A photo album: a link to the externally hosted collection plus its photos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub album_url: String,
    pub title: String,
    #[serde(default)]
    pub photos: Vec<String>,
}

impl Album {
    /// First photo, used as the cover image.
    #[must_use]
    pub fn cover(&self) -> Option<&str> {
        self.photos.first().map(String::as_str)
    }

    #[must_use]
    pub fn photo_count(&self) -> usize {
        self.photos.len()
    }
}

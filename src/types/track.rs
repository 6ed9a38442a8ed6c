use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::types::{
    album::{SimplifiedAlbum, join_artists},
    artist::SimplifiedArtist,
    common::{ExternalUrls, Image},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedTrack {
    /// Absent for local files.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub uri: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub track_number: Option<u32>,
    #[serde(default)]
    pub disc_number: Option<u32>,
    #[serde(default)]
    pub explicit: bool,
    pub artists: Vec<SimplifiedArtist>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub uri: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub track_number: Option<u32>,
    #[serde(default)]
    pub explicit: bool,
    #[serde(default)]
    pub is_local: bool,
    #[serde(default)]
    pub popularity: Option<u32>,
    pub artists: Vec<SimplifiedArtist>,
    pub album: SimplifiedAlbum,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

impl Track {
    pub fn artist_names(&self) -> String {
        join_artists(&self.artists)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub publisher: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub uri: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub show: Option<ShowRef>,
}

/// Anything the player or a playlist can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlayableItem {
    Track(Track),
    Episode(Episode),
}

impl PlayableItem {
    pub fn name(&self) -> &str {
        match self {
            Self::Track(t) => &t.name,
            Self::Episode(e) => &e.name,
        }
    }

    pub fn uri(&self) -> &str {
        match self {
            Self::Track(t) => &t.uri,
            Self::Episode(e) => &e.uri,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        match self {
            Self::Track(t) => t.duration_ms,
            Self::Episode(e) => e.duration_ms,
        }
    }

    /// Artists of a track, the show of an episode.
    pub fn creators(&self) -> String {
        match self {
            Self::Track(t) => t.artist_names(),
            Self::Episode(e) => e.show.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub name: String,
    pub artists: String,
    pub album: String,
    pub duration: String,
}

impl From<&Track> for TrackTableRow {
    fn from(track: &Track) -> Self {
        Self {
            name: track.name.clone(),
            artists: track.artist_names(),
            album: track.album.name.clone(),
            duration: format_duration(track.duration_ms),
        }
    }
}

/// `m:ss`
pub fn format_duration(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}

use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::{
    paging::Page,
    types::{
        artist::SimplifiedArtist,
        common::{ExternalUrls, Image},
        track::SimplifiedTrack,
    },
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedAlbum {
    pub id: String,
    pub name: String,
    pub album_type: String,
    /// Only present on an artist's album listing.
    #[serde(default)]
    pub album_group: Option<String>,
    #[serde(default)]
    pub total_tracks: Option<u32>,
    pub release_date: String,
    pub release_date_precision: String,
    pub artists: Vec<SimplifiedArtist>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

impl SimplifiedAlbum {
    pub fn artist_names(&self) -> String {
        join_artists(&self.artists)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub album_type: String,
    #[serde(default)]
    pub total_tracks: Option<u32>,
    pub release_date: String,
    pub release_date_precision: String,
    pub artists: Vec<SimplifiedArtist>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub popularity: Option<u32>,
    pub tracks: Page<SimplifiedTrack>,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Tabled)]
pub struct ReleaseTableRow {
    pub date: String,
    pub name: String,
    pub artists: String,
    pub kind: String,
}

impl From<&SimplifiedAlbum> for ReleaseTableRow {
    fn from(album: &SimplifiedAlbum) -> Self {
        Self {
            date: album.release_date.clone(),
            name: album.name.clone(),
            artists: album.artist_names(),
            kind: album
                .album_group
                .clone()
                .unwrap_or_else(|| album.album_type.clone()),
        }
    }
}

pub(crate) fn join_artists(artists: &[SimplifiedArtist]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

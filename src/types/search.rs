use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    paging::Page,
    types::{album::SimplifiedAlbum, artist::Artist, playlist::SimplifiedPlaylist, track::Track},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum SearchType {
    Artist,
    Album,
    Track,
    Playlist,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Album => "album",
            Self::Track => "track",
            Self::Playlist => "playlist",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page per requested type. Types that were not requested stay `None`.
///
/// Playlist results may contain `null` entries for playlists that are no
/// longer available.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub artists: Option<Page<Artist>>,
    #[serde(default)]
    pub albums: Option<Page<SimplifiedAlbum>>,
    #[serde(default)]
    pub tracks: Option<Page<Track>>,
    #[serde(default)]
    pub playlists: Option<Page<Option<SimplifiedPlaylist>>>,
}

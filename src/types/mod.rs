//! Models for the JSON documents the Web API returns, plus the table rows the
//! command line prints them with.

pub mod album;
pub mod artist;
pub mod common;
pub mod player;
pub mod playlist;
pub mod search;
pub mod track;
pub mod user;

use std::fmt;

use clap::ValueEnum;

pub use album::{Album, ReleaseTableRow, SimplifiedAlbum};
pub use artist::{Artist, ArtistTableRow, SimplifiedArtist};
pub use common::{ExternalUrls, Followers, Image};
pub use player::{
    CurrentlyPlaying, Device, DeviceTableRow, PlayHistory, PlayRequest, PlaybackContext,
    PlaybackState, RepeatState,
};
pub use playlist::{
    NewPlaylist, Playlist, PlaylistDetails, PlaylistItem, PlaylistTableRow, SimplifiedPlaylist,
    SnapshotId,
};
pub use search::{SearchResults, SearchType};
pub use track::{Episode, PlayableItem, SimplifiedTrack, Track, TrackTableRow};
pub use user::{PrivateUser, PublicUser};

/// Period the personalization endpoints compute affinities over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TimeRange {
    /// About four weeks.
    ShortTerm,
    /// About six months.
    #[default]
    MediumTerm,
    /// About a year.
    LongTerm,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortTerm => "short_term",
            Self::MediumTerm => "medium_term",
            Self::LongTerm => "long_term",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_playable_item_is_tagged_by_type() {
        let item: PlayableItem = serde_json::from_value(json!({
            "type": "episode",
            "id": "ep1",
            "name": "Pilot",
            "uri": "spotify:episode:ep1",
            "duration_ms": 61000,
            "show": { "id": "s1", "name": "Some Show" }
        }))
        .unwrap();

        assert!(matches!(item, PlayableItem::Episode(_)));
        assert_eq!(item.creators(), "Some Show");
        assert_eq!(track::format_duration(item.duration_ms()), "1:01");
    }

    #[test]
    fn test_playlist_item_with_removed_track() {
        let item: PlaylistItem = serde_json::from_value(json!({
            "added_at": "2024-03-01T10:00:00Z",
            "is_local": false,
            "track": null
        }))
        .unwrap();

        assert!(item.track.is_none());
        assert!(item.added_at.is_some());
    }

    #[test]
    fn test_playback_state_defaults() {
        let state: PlaybackState = serde_json::from_value(json!({
            "is_playing": false,
            "item": null
        }))
        .unwrap();

        assert_eq!(state.repeat_state, RepeatState::Off);
        assert!(!state.shuffle_state);
        assert!(state.device.is_none());
    }

    #[test]
    fn test_new_playlist_skips_unset_fields() {
        let body = serde_json::to_value(NewPlaylist::new("Road trip")).unwrap();
        assert_eq!(body, json!({ "name": "Road trip" }));
    }

    #[test]
    fn test_time_range_wire_names() {
        assert_eq!(TimeRange::ShortTerm.as_str(), "short_term");
        assert_eq!(TimeRange::default().to_string(), "medium_term");
    }
}

use serde_json::{Value, json};

use crate::{
    action::Action,
    client::Spotify,
    http::Request,
    paging::Paginator,
    spotify::page_limit,
    types::{NewPlaylist, Playlist, PlaylistDetails, PlaylistItem, SimplifiedPlaylist, SnapshotId},
};

/// Most items a single add or remove call accepts.
pub const MAX_ITEMS_PER_CHANGE: usize = 100;

/// Playlist reads and edits.
///
/// Edits need `playlist-modify-public` or `playlist-modify-private`,
/// depending on the playlist.
pub struct Playlists<'a> {
    client: &'a Spotify,
}

impl<'a> Playlists<'a> {
    pub(crate) fn new(client: &'a Spotify) -> Self {
        Self { client }
    }

    pub fn get(&self, id: &str) -> Action<Playlist> {
        self.client.json(Request::get(format!("playlists/{id}")))
    }

    /// Retrieves the tracks and episodes of a playlist.
    ///
    /// # Arguments
    ///
    /// * `id` - Spotify ID of the playlist
    /// * `limit` - Page size, clamped to 1-50
    ///
    /// # Returns
    ///
    /// A [`Paginator`] over [`PlaylistItem`]s. Items whose track was removed
    /// from the catalogue carry no track.
    pub fn items(&self, id: &str, limit: u32) -> Action<Paginator<PlaylistItem>> {
        let request =
            Request::get(format!("playlists/{id}/tracks")).query("limit", page_limit(limit));
        self.client.paged(request, None)
    }

    /// Playlists owned or followed by `user_id`.
    pub fn user_playlists(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Action<Paginator<SimplifiedPlaylist>> {
        let request = Request::get(format!("users/{}/playlists", self.client.encode(user_id)))
            .query("limit", page_limit(limit));
        self.client.paged(request, None)
    }

    /// Creates a playlist owned by `user_id`.
    ///
    /// # Arguments
    ///
    /// * `user_id` - Must be the current user
    /// * `playlist` - Name, description and visibility of the new playlist
    ///
    /// # Errors
    ///
    /// The action fails with [`Error::Forbidden`](crate::Error::Forbidden)
    /// when `user_id` is somebody else.
    pub fn create(&self, user_id: &str, playlist: NewPlaylist) -> Action<Playlist> {
        let request = Request::post(format!("users/{}/playlists", self.client.encode(user_id)));
        self.client.json_body(request, playlist)
    }

    /// Appends `uris` (tracks or episodes), or inserts them at `position`.
    /// At most [`MAX_ITEMS_PER_CHANGE`] per call.
    pub fn add_items<S: AsRef<str>>(
        &self,
        id: &str,
        uris: &[S],
        position: Option<u32>,
    ) -> Action<SnapshotId> {
        let mut body = json!({ "uris": to_strings(uris) });
        if let Some(position) = position {
            body["position"] = json!(position);
        }
        self.client.json(Request::post(format!("playlists/{id}/tracks")).json_value(body))
    }

    /// Removes every occurrence of `uris`. With `snapshot_id` the removal
    /// applies to that playlist version.
    pub fn remove_items<S: AsRef<str>>(
        &self,
        id: &str,
        uris: &[S],
        snapshot_id: Option<&str>,
    ) -> Action<SnapshotId> {
        let tracks: Vec<Value> = uris
            .iter()
            .map(|uri| json!({ "uri": uri.as_ref() }))
            .collect();
        let mut body = json!({ "tracks": tracks });
        if let Some(snapshot_id) = snapshot_id {
            body["snapshot_id"] = json!(snapshot_id);
        }
        self.client.json(Request::delete(format!("playlists/{id}/tracks")).json_value(body))
    }

    pub fn change_details(&self, id: &str, details: PlaylistDetails) -> Action<()> {
        self.client.command_body(Request::put(format!("playlists/{id}")), details)
    }
}

fn to_strings<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values.iter().map(|v| v.as_ref().to_string()).collect()
}

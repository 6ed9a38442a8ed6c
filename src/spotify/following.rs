use serde_json::json;

use crate::{
    action::Action,
    client::Spotify,
    http::Request,
    paging::Paginator,
    spotify::page_limit,
    types::Artist,
    utils::join_ids,
};

/// Follow state of the current user. Needs `user-follow-read` for lookups and
/// `user-follow-modify` for changes.
pub struct Following<'a> {
    client: &'a Spotify,
}

impl<'a> Following<'a> {
    pub(crate) fn new(client: &'a Spotify) -> Self {
        Self { client }
    }

    /// Retrieves the artists the current user follows.
    ///
    /// The endpoint pages by cursor rather than offset, so the returned
    /// [`Paginator`] can only move forward.
    ///
    /// # Arguments
    ///
    /// * `limit` - Page size, clamped to 1-50
    ///
    /// # Errors
    ///
    /// The action fails with [`Error::Auth`](crate::Error::Auth) when the
    /// token lacks `user-follow-read` and cannot be refreshed into one that
    /// has it.
    pub fn followed_artists(&self, limit: u32) -> Action<Paginator<Artist>> {
        let request = Request::get("me/following")
            .query("type", "artist")
            .query("limit", page_limit(limit));
        self.client.paged(request, Some("artists"))
    }

    /// Follows up to 50 artists. Already followed ones are left as they are.
    pub fn follow_artists<S: AsRef<str>>(&self, ids: &[S]) -> Action<()> {
        self.client.command(artist_ids(Request::put("me/following"), ids))
    }

    pub fn unfollow_artists<S: AsRef<str>>(&self, ids: &[S]) -> Action<()> {
        self.client.command(artist_ids(Request::delete("me/following"), ids))
    }

    /// One flag per id, in request order.
    pub fn is_following_artists<S: AsRef<str>>(&self, ids: &[S]) -> Action<Vec<bool>> {
        self.client.json(artist_ids(Request::get("me/following/contains"), ids))
    }

    /// Follows a playlist.
    ///
    /// # Arguments
    ///
    /// * `id` - Spotify ID of the playlist
    /// * `public` - Whether the playlist shows up on the user's public profile
    pub fn follow_playlist(&self, id: &str, public: bool) -> Action<()> {
        let request = Request::put(format!("playlists/{id}/followers"))
            .json_value(json!({ "public": public }));
        self.client.command(request)
    }

    pub fn unfollow_playlist(&self, id: &str) -> Action<()> {
        self.client.command(Request::delete(format!("playlists/{id}/followers")))
    }
}

fn artist_ids<S: AsRef<str>>(request: Request, ids: &[S]) -> Request {
    request.query("type", "artist").query("ids", join_ids(ids))
}

use crate::{
    action::Action,
    client::Spotify,
    http::Request,
    paging::Paginator,
    spotify::page_limit,
    types::{PrivateUser, PublicUser, SimplifiedPlaylist},
};

pub struct Users<'a> {
    client: &'a Spotify,
}

impl<'a> Users<'a> {
    pub(crate) fn new(client: &'a Spotify) -> Self {
        Self { client }
    }

    /// The user the token belongs to. Not available with a client
    /// credentials token.
    pub fn me(&self) -> Action<PrivateUser> {
        self.client.json(Request::get("me"))
    }

    pub fn profile(&self, user_id: &str) -> Action<PublicUser> {
        self.client.json(Request::get(format!("users/{}", self.client.encode(user_id))))
    }

    pub fn my_playlists(&self, limit: u32) -> Action<Paginator<SimplifiedPlaylist>> {
        let request = Request::get("me/playlists").query("limit", page_limit(limit));
        self.client.paged(request, None)
    }
}

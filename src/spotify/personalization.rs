use crate::{
    action::Action,
    client::Spotify,
    http::Request,
    paging::Paginator,
    spotify::page_limit,
    types::{Artist, TimeRange, Track},
};

/// The signed-in user's top artists and tracks. Needs `user-top-read`.
pub struct Personalization<'a> {
    client: &'a Spotify,
}

impl<'a> Personalization<'a> {
    pub(crate) fn new(client: &'a Spotify) -> Self {
        Self { client }
    }

    pub fn top_artists(&self, range: TimeRange, limit: u32) -> Action<Paginator<Artist>> {
        self.client.paged(top("artists", range, limit), None)
    }

    pub fn top_tracks(&self, range: TimeRange, limit: u32) -> Action<Paginator<Track>> {
        self.client.paged(top("tracks", range, limit), None)
    }
}

fn top(kind: &str, range: TimeRange, limit: u32) -> Request {
    Request::get(format!("me/top/{kind}"))
        .query("time_range", range)
        .query("limit", page_limit(limit))
}

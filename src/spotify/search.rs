use serde::de::DeserializeOwned;

use crate::{
    action::Action,
    client::Spotify,
    http::Request,
    paging::Paginator,
    spotify::page_limit,
    types::{Artist, SearchResults, SearchType, SimplifiedAlbum, SimplifiedPlaylist, Track},
};

pub struct Search<'a> {
    client: &'a Spotify,
}

impl<'a> Search<'a> {
    pub(crate) fn new(client: &'a Spotify) -> Self {
        Self { client }
    }

    /// One call across several types. Each requested type gets its own page
    /// of at most `limit` results.
    pub fn query(
        &self,
        q: &str,
        types: &[SearchType],
        limit: u32,
        market: Option<&str>,
    ) -> Action<SearchResults> {
        let types = types
            .iter()
            .map(SearchType::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let request = Request::get("search")
            .query("q", q)
            .query("type", types)
            .query("limit", page_limit(limit))
            .query_opt("market", market);
        self.client.json(request)
    }

    pub fn artists(&self, q: &str, limit: u32) -> Action<Paginator<Artist>> {
        self.typed(q, SearchType::Artist, limit, "artists")
    }

    pub fn albums(&self, q: &str, limit: u32) -> Action<Paginator<SimplifiedAlbum>> {
        self.typed(q, SearchType::Album, limit, "albums")
    }

    pub fn tracks(&self, q: &str, limit: u32) -> Action<Paginator<Track>> {
        self.typed(q, SearchType::Track, limit, "tracks")
    }

    /// Unavailable playlists show up as `None`.
    pub fn playlists(&self, q: &str, limit: u32) -> Action<Paginator<Option<SimplifiedPlaylist>>> {
        self.typed(q, SearchType::Playlist, limit, "playlists")
    }

    fn typed<T>(
        &self,
        q: &str,
        kind: SearchType,
        limit: u32,
        envelope: &'static str,
    ) -> Action<Paginator<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let request = Request::get("search")
            .query("q", q)
            .query("type", kind)
            .query("limit", page_limit(limit));
        self.client.paged(request, Some(envelope))
    }
}

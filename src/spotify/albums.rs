use crate::{
    action::Action,
    client::Spotify,
    http::Request,
    paging::Paginator,
    spotify::{Resource, page_limit},
    types::{Album, SimplifiedAlbum, SimplifiedTrack},
};

pub struct Albums<'a> {
    client: &'a Spotify,
    resource: Resource<'a, Album>,
}

impl<'a> Albums<'a> {
    pub(crate) fn new(client: &'a Spotify) -> Self {
        Self {
            client,
            resource: Resource::new(client, "albums", "albums"),
        }
    }

    pub fn get(&self, id: &str) -> Action<Album> {
        self.resource.get(id)
    }

    pub fn get_in_market(&self, id: &str, market: &str) -> Action<Album> {
        self.resource.get_in_market(id, market)
    }

    pub fn several<S: AsRef<str>>(&self, ids: &[S]) -> Action<Vec<Option<Album>>> {
        self.resource.several(ids)
    }

    pub fn tracks(&self, id: &str, limit: u32) -> Action<Paginator<SimplifiedTrack>> {
        let request = Request::get(self.resource.sub_path(id, "tracks"))
            .query("limit", page_limit(limit));
        self.client.paged(request, None)
    }

    /// Newly released albums, optionally for one country.
    pub fn new_releases(
        &self,
        country: Option<&str>,
        limit: u32,
    ) -> Action<Paginator<SimplifiedAlbum>> {
        let request = Request::get("browse/new-releases")
            .query_opt("country", country)
            .query("limit", page_limit(limit));
        self.client.paged(request, Some("albums"))
    }
}

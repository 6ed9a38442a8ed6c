use crate::{
    action::Action,
    client::Spotify,
    http::Request,
    paging::Paginator,
    spotify::{Resource, page_limit},
    types::{Artist, SimplifiedAlbum, Track},
    utils::ReleaseKinds,
};

/// Artist lookups and discography browsing.
///
/// None of these endpoints need a user scope, so a client credentials token
/// is enough.
pub struct Artists<'a> {
    client: &'a Spotify,
    resource: Resource<'a, Artist>,
}

impl<'a> Artists<'a> {
    pub(crate) fn new(client: &'a Spotify) -> Self {
        Self {
            client,
            resource: Resource::new(client, "artists", "artists"),
        }
    }

    /// Retrieves a single artist by Spotify ID.
    ///
    /// # Arguments
    ///
    /// * `id` - Spotify ID of the artist
    ///
    /// # Errors
    ///
    /// The action fails with [`Error::BadRequest`](crate::Error::BadRequest)
    /// when the ID is malformed or unknown.
    pub fn get(&self, id: &str) -> Action<Artist> {
        self.resource.get(id)
    }

    /// Retrieves up to 50 artists in one request.
    ///
    /// # Returns
    ///
    /// One entry per requested ID, in request order. IDs the API does not
    /// know come back as `None`.
    pub fn several<S: AsRef<str>>(&self, ids: &[S]) -> Action<Vec<Option<Artist>>> {
        self.resource.several(ids)
    }

    /// Retrieves the artist's discography, filtered to `kinds`.
    ///
    /// # Arguments
    ///
    /// * `id` - Spotify ID of the artist
    /// * `kinds` - Release kinds to include (albums, singles, compilations, appearances)
    /// * `limit` - Page size, clamped to 1-50
    ///
    /// # Returns
    ///
    /// A [`Paginator`] that fetches further pages on demand.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let kinds = parse_release_kinds("album,single")?;
    /// let pages = spotify.artists().albums(artist_id, &kinds, 50).run().await?;
    /// for album in pages.all_items().await? {
    ///     println!("{} ({})", album.name, album.release_date);
    /// }
    /// ```
    pub fn albums(
        &self,
        id: &str,
        kinds: &ReleaseKinds,
        limit: u32,
    ) -> Action<Paginator<SimplifiedAlbum>> {
        let request = Request::get(self.resource.sub_path(id, "albums"))
            .query("include_groups", kinds)
            .query("limit", page_limit(limit));
        self.client.paged(request, None)
    }

    /// The artist's most popular tracks in `market` (an ISO 3166-1 alpha-2 code).
    pub fn top_tracks(&self, id: &str, market: &str) -> Action<Vec<Track>> {
        let request =
            Request::get(self.resource.sub_path(id, "top-tracks")).query("market", market);
        self.client.json_field(request, "tracks")
    }

    pub fn related(&self, id: &str) -> Action<Vec<Artist>> {
        let request = Request::get(self.resource.sub_path(id, "related-artists"));
        self.client.json_field(request, "artists")
    }
}

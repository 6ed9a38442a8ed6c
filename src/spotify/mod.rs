//! # Endpoint façades
//!
//! Each group of Web API endpoints is a small struct borrowed from a
//! [`Spotify`] client (`client.artists()`, `client.player()`, ...). Façades hold
//! nothing but the back-reference; every method builds a [`Request`] and
//! returns an [`Action`] that runs it through the client's executor.
//!
//! Catalog objects that share the `GET /{kind}/{id}` and
//! `GET /{kind}?ids=a,b` shape go through the generic [`Resource`]:
//!
//! ```text
//! artists   GET /artists/{id}    GET /artists?ids=     -> {"artists": [...]}
//! albums    GET /albums/{id}     GET /albums?ids=      -> {"albums": [...]}
//! tracks    GET /tracks/{id}     GET /tracks?ids=      -> {"tracks": [...]}
//! ```
//!
//! Listing endpoints return an [`Action`] of a [`crate::paging::Paginator`];
//! some of them nest the page under a key (`{"artists": {...}}`), which the
//! paginator unwraps for every page.
//!
//! Ids are passed through as given. Batch endpoints accept at most 20
//! (albums) or 50 (artists, tracks) ids per call.

pub mod albums;
pub mod artists;
pub mod following;
pub mod personalization;
pub mod player;
pub mod playlists;
pub mod search;
pub mod tracks;
pub mod users;

use std::marker::PhantomData;

use serde::de::DeserializeOwned;

pub use albums::Albums;
pub use artists::Artists;
pub use following::Following;
pub use personalization::Personalization;
pub use player::Player;
pub use playlists::Playlists;
pub use search::Search;
pub use tracks::Tracks;
pub use users::Users;

use crate::{action::Action, client::Spotify, http::Request, utils::join_ids};

/// Largest `limit` the listing endpoints accept.
pub const MAX_PAGE_LIMIT: u32 = 50;

pub(crate) fn page_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_PAGE_LIMIT)
}

/// A catalog object type reachable by id.
pub struct Resource<'a, M> {
    client: &'a Spotify,
    base: &'static str,
    plural: &'static str,
    _model: PhantomData<fn() -> M>,
}

impl<'a, M> Resource<'a, M>
where
    M: DeserializeOwned + Send + 'static,
{
    /// `base` is the path segment (`"artists"`), `plural` the key the batch
    /// endpoint lists results under.
    pub fn new(client: &'a Spotify, base: &'static str, plural: &'static str) -> Self {
        Self {
            client,
            base,
            plural,
            _model: PhantomData,
        }
    }

    pub fn get(&self, id: &str) -> Action<M> {
        self.client.json(Request::get(self.path(id)))
    }

    /// Like [`Resource::get`], relinked for an ISO 3166-1 country.
    pub fn get_in_market(&self, id: &str, market: &str) -> Action<M> {
        self.client.json(Request::get(self.path(id)).query("market", market))
    }

    /// Fetches several objects in one call. Unknown ids come back as `None`,
    /// in the position they were requested.
    pub fn several<S: AsRef<str>>(&self, ids: &[S]) -> Action<Vec<Option<M>>> {
        if ids.is_empty() {
            return self.client.action(|_| async { Ok(Vec::new()) });
        }
        let request = Request::get(self.base).query("ids", join_ids(ids));
        self.client.json_field(request, self.plural)
    }

    /// `{base}/{id}`
    pub fn path(&self, id: &str) -> String {
        format!("{}/{}", self.base, id)
    }

    /// `{base}/{id}/{sub}`
    pub fn sub_path(&self, id: &str, sub: &str) -> String {
        format!("{}/{}/{}", self.base, id, sub)
    }
}

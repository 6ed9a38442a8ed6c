use crate::{action::Action, client::Spotify, spotify::Resource, types::Track};

pub struct Tracks<'a> {
    resource: Resource<'a, Track>,
}

impl<'a> Tracks<'a> {
    pub(crate) fn new(client: &'a Spotify) -> Self {
        Self {
            resource: Resource::new(client, "tracks", "tracks"),
        }
    }

    pub fn get(&self, id: &str) -> Action<Track> {
        self.resource.get(id)
    }

    pub fn get_in_market(&self, id: &str, market: &str) -> Action<Track> {
        self.resource.get_in_market(id, market)
    }

    pub fn several<S: AsRef<str>>(&self, ids: &[S]) -> Action<Vec<Option<Track>>> {
        self.resource.several(ids)
    }
}

use serde_json::json;

use crate::{
    action::Action,
    client::Spotify,
    http::Request,
    paging::Paginator,
    spotify::page_limit,
    types::{CurrentlyPlaying, Device, PlayHistory, PlayRequest, PlaybackState, RepeatState},
};

/// Playback control. Needs a Premium account and the
/// `user-read-playback-state` / `user-modify-playback-state` scopes.
///
/// Commands that take a `device` target the active device when it is `None`.
pub struct Player<'a> {
    client: &'a Spotify,
}

impl<'a> Player<'a> {
    pub(crate) fn new(client: &'a Spotify) -> Self {
        Self { client }
    }

    /// `None` when nothing is playing on any device.
    pub fn playback_state(&self) -> Action<Option<PlaybackState>> {
        self.client.json_opt(Request::get("me/player"))
    }

    pub fn currently_playing(&self) -> Action<Option<CurrentlyPlaying>> {
        self.client.json_opt(Request::get("me/player/currently-playing"))
    }

    pub fn devices(&self) -> Action<Vec<Device>> {
        self.client.json_field(Request::get("me/player/devices"), "devices")
    }

    pub fn recently_played(&self, limit: u32) -> Action<Paginator<PlayHistory>> {
        let request = Request::get("me/player/recently-played").query("limit", page_limit(limit));
        self.client.paged(request, None)
    }

    /// Starts or resumes playback.
    ///
    /// # Arguments
    ///
    /// * `request` - What to play; the default request resumes the current context
    /// * `device` - Target device, or the active one
    ///
    /// # Errors
    ///
    /// The action fails with [`Error::Forbidden`](crate::Error::Forbidden)
    /// for non-Premium accounts and with
    /// [`Error::BadRequest`](crate::Error::BadRequest) when no device is active.
    pub fn play(&self, request: PlayRequest, device: Option<&str>) -> Action<()> {
        self.client.command_body(
            Request::put("me/player/play").query_opt("device_id", device),
            request,
        )
    }

    pub fn pause(&self, device: Option<&str>) -> Action<()> {
        self.client.command(Request::put("me/player/pause").query_opt("device_id", device))
    }

    pub fn skip_next(&self, device: Option<&str>) -> Action<()> {
        self.client.command(Request::post("me/player/next").query_opt("device_id", device))
    }

    pub fn skip_previous(&self, device: Option<&str>) -> Action<()> {
        self.client.command(Request::post("me/player/previous").query_opt("device_id", device))
    }

    /// Seeks within the current track. Positions past its end skip to the next one.
    pub fn seek(&self, position_ms: u64, device: Option<&str>) -> Action<()> {
        let request = Request::put("me/player/seek")
            .query("position_ms", position_ms)
            .query_opt("device_id", device);
        self.client.command(request)
    }

    /// `percent` is capped at 100.
    pub fn set_volume(&self, percent: u8, device: Option<&str>) -> Action<()> {
        let request = Request::put("me/player/volume")
            .query("volume_percent", percent.min(100))
            .query_opt("device_id", device);
        self.client.command(request)
    }

    pub fn set_repeat(&self, state: RepeatState, device: Option<&str>) -> Action<()> {
        let request = Request::put("me/player/repeat")
            .query("state", state)
            .query_opt("device_id", device);
        self.client.command(request)
    }

    pub fn shuffle(&self, enabled: bool, device: Option<&str>) -> Action<()> {
        let request = Request::put("me/player/shuffle")
            .query("state", enabled)
            .query_opt("device_id", device);
        self.client.command(request)
    }

    /// Moves playback to `device_id`; `play` starts it there right away.
    pub fn transfer(&self, device_id: &str, play: bool) -> Action<()> {
        let body = json!({ "device_ids": [device_id], "play": play });
        self.client.command(Request::put("me/player").json_value(body))
    }

    pub fn add_to_queue(&self, uri: &str, device: Option<&str>) -> Action<()> {
        let request = Request::post("me/player/queue")
            .query("uri", uri)
            .query_opt("device_id", device);
        self.client.command(request)
    }
}

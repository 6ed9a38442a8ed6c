use std::{
    cmp::Ordering,
    collections::{BTreeSet, HashSet},
    fmt,
    str::FromStr,
};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::SimplifiedAlbum;

pub fn generate_code_verifier() -> String {
    random_string(128)
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Opaque value echoed back by the authorization server.
pub fn generate_state() -> String {
    random_string(16)
}

fn random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Comma-joins ids for `?ids=` style parameters.
pub fn join_ids<S: AsRef<str>>(ids: &[S]) -> String {
    ids.iter()
        .map(|id| id.as_ref().trim())
        .collect::<Vec<_>>()
        .join(",")
}

/// Keeps the first occurrence of every album id.
pub fn remove_duplicate_albums(albums: &mut Vec<SimplifiedAlbum>) {
    let mut seen_ids = HashSet::new();
    albums.retain(|album| seen_ids.insert(album.id.clone()));
}

/// Newest first, then by the first artist's name.
pub fn sort_albums_by_release(albums: &mut [SimplifiedAlbum]) {
    albums.sort_by(|a, b| match b.release_date.cmp(&a.release_date) {
        Ordering::Equal => {
            let a_artist = a.artists.first().map(|artist| &artist.name);
            let b_artist = b.artists.first().map(|artist| &artist.name);
            a_artist.cmp(&b_artist)
        }
        other => other,
    });
}

/// Album groups an artist's discography can be filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReleaseKind {
    Album,
    Single,
    AppearsOn,
    Compilation,
}

impl ReleaseKind {
    pub const ALL: [ReleaseKind; 4] = [
        ReleaseKind::Album,
        ReleaseKind::Single,
        ReleaseKind::AppearsOn,
        ReleaseKind::Compilation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseKind::Album => "album",
            ReleaseKind::Single => "single",
            ReleaseKind::AppearsOn => "appears_on",
            ReleaseKind::Compilation => "compilation",
        }
    }
}

impl fmt::Display for ReleaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReleaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "album" => Ok(ReleaseKind::Album),
            "single" => Ok(ReleaseKind::Single),
            "appears_on" => Ok(ReleaseKind::AppearsOn),
            "compilation" => Ok(ReleaseKind::Compilation),
            _ => Err(format!(
                "invalid value '{}' (expected one of: album, single, appears_on, compilation, all)",
                s.trim()
            )),
        }
    }
}

/// A deduplicated, ordered set of [`ReleaseKind`]s. Renders as the
/// `include_groups` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseKinds(pub BTreeSet<ReleaseKind>);

impl Default for ReleaseKinds {
    fn default() -> Self {
        ReleaseKinds(BTreeSet::from([ReleaseKind::Album]))
    }
}

impl ReleaseKinds {
    pub fn all() -> Self {
        ReleaseKinds(ReleaseKind::ALL.into_iter().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = ReleaseKind> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for ReleaseKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(",");
        f.write_str(&joined)
    }
}

/// Parses `album,single`, `appears-on` or `all` (case-insensitive).
///
/// Used as a clap `value_parser`, hence the `String` error.
pub fn parse_release_kinds(input: &str) -> Result<ReleaseKinds, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("release kinds cannot be empty".to_string());
    }
    if input.eq_ignore_ascii_case("all") {
        return Ok(ReleaseKinds::all());
    }

    let mut kinds = BTreeSet::new();
    for segment in input.split(',') {
        if segment.trim().is_empty() {
            return Err(format!("empty segment in '{input}'"));
        }
        kinds.insert(segment.parse::<ReleaseKind>()?);
    }
    Ok(ReleaseKinds(kinds))
}

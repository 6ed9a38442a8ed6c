use tabled::Table;

use crate::{
    error, info, success,
    types::{ArtistTableRow, ReleaseTableRow},
    utils::{self, ReleaseKinds},
    warning,
};

pub async fn followed_artists(search: Option<String>) {
    let client = super::connect().await;

    let pb = super::spinner("Fetching followed artists...");
    let result = client
        .following()
        .followed_artists(50)
        .all_items()
        .run()
        .await;
    pb.finish_and_clear();

    let mut artists = match result {
        Ok(artists) => artists,
        Err(e) => error!("Failed to fetch artists: {}", e),
    };

    artists.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    if let Some(search) = search {
        let search_term = search.to_lowercase();
        artists.retain(|a| a.name.to_lowercase().contains(&search_term));
    }

    if artists.is_empty() {
        warning!("No artists found");
        return;
    }

    let rows: Vec<ArtistTableRow> = artists.iter().map(ArtistTableRow::from).collect();
    println!("{}", Table::new(rows));
    success!("{} artists", artists.len());
}

pub async fn show_artist(id: &str, releases: bool, kinds: &ReleaseKinds) {
    let client = super::connect().await;

    let artist = match client.artists().get(id).catch_bad_request().run().await {
        Ok(Some(artist)) => artist,
        Ok(None) => error!("No artist with id {}", id),
        Err(e) => error!("Failed to fetch artist: {}", e),
    };

    info!("{}", artist.name);
    if !artist.genres.is_empty() {
        info!("Genres:     {}", artist.genres.join(", "));
    }
    if let Some(followers) = &artist.followers {
        info!("Followers:  {}", followers.total);
    }
    if let Some(popularity) = artist.popularity {
        info!("Popularity: {}", popularity);
    }

    if !releases {
        return;
    }

    let pb = super::spinner(&format!("Fetching releases ({kinds})..."));
    let result = client.artists().albums(id, kinds, 50).all_items().run().await;
    pb.finish_and_clear();

    let mut albums = match result {
        Ok(albums) => albums,
        Err(e) => error!("Failed to fetch releases: {}", e),
    };
    utils::remove_duplicate_albums(&mut albums);
    utils::sort_albums_by_release(&mut albums);

    let rows: Vec<ReleaseTableRow> = albums.iter().map(ReleaseTableRow::from).collect();
    println!("{}", Table::new(rows));
}

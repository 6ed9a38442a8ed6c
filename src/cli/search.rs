use tabled::Table;

use crate::{
    error,
    types::{
        ArtistTableRow, PlaylistTableRow, ReleaseTableRow, SearchType, TrackTableRow,
    },
    warning,
};

pub async fn search(query: &str, kind: Option<SearchType>, limit: u32) {
    let client = super::connect().await;

    let types = match kind {
        Some(kind) => vec![kind],
        None => vec![SearchType::Artist, SearchType::Album, SearchType::Track],
    };

    let results = match client.search().query(query, &types, limit, None).run().await {
        Ok(results) => results,
        Err(e) => error!("Search failed: {}", e),
    };

    let mut printed = false;
    if let Some(page) = results.artists.filter(|p| !p.items.is_empty()) {
        let rows: Vec<ArtistTableRow> = page.items.iter().map(ArtistTableRow::from).collect();
        println!("{}", Table::new(rows));
        printed = true;
    }
    if let Some(page) = results.albums.filter(|p| !p.items.is_empty()) {
        let rows: Vec<ReleaseTableRow> = page.items.iter().map(ReleaseTableRow::from).collect();
        println!("{}", Table::new(rows));
        printed = true;
    }
    if let Some(page) = results.tracks.filter(|p| !p.items.is_empty()) {
        let rows: Vec<TrackTableRow> = page.items.iter().map(TrackTableRow::from).collect();
        println!("{}", Table::new(rows));
        printed = true;
    }
    if let Some(page) = results.playlists {
        let rows: Vec<PlaylistTableRow> = page
            .items
            .iter()
            .flatten()
            .map(PlaylistTableRow::from)
            .collect();
        if !rows.is_empty() {
            println!("{}", Table::new(rows));
            printed = true;
        }
    }

    if !printed {
        warning!("Nothing found for '{}'", query);
    }
}

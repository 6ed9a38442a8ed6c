use std::pin::pin;

use futures::StreamExt;
use tabled::Table;

use crate::{error, success, types::PlaylistTableRow, warning};

pub async fn playlists() {
    let client = super::connect().await;

    let pb = super::spinner("Fetching playlists...");
    let pager = match client.users().my_playlists(50).run().await {
        Ok(pager) => pager,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to fetch playlists: {}", e)
        }
    };

    let total = pager.total();
    let mut stream = pin!(pager.into_stream());
    let mut rows = Vec::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(playlist) => {
                rows.push(PlaylistTableRow::from(&playlist));
                match total {
                    Some(total) => {
                        pb.set_message(format!("Fetched {}/{} playlists...", rows.len(), total))
                    }
                    None => pb.set_message(format!("Fetched {} playlists...", rows.len())),
                }
            }
            Err(e) => {
                pb.finish_and_clear();
                error!("Failed to fetch playlists: {}", e)
            }
        }
    }
    pb.finish_and_clear();

    if rows.is_empty() {
        warning!("No playlists found");
        return;
    }

    let count = rows.len();
    println!("{}", Table::new(rows));
    success!("{} playlists", count);
}

use tabled::Table;

use crate::{cli::Services, error, types::ArtistTableRow, warning};

pub async fn artists(services: &Services, search: String) {
    let token = match services.tokens.get_valid_token().await {
        Ok(token) => token,
        Err(e) => error!("Cannot authenticate with Spotify: {}", e),
    };

    let artists = match services.catalog.search_artists(&token, &search).await {
        Ok(artists) => artists,
        Err(e) => error!("Artist search failed: {}", e),
    };

    if artists.is_empty() {
        warning!("No artists found for \"{}\"", search);
        return;
    }

    let rows: Vec<ArtistTableRow> = artists
        .into_iter()
        .map(|a| ArtistTableRow {
            name: a.name,
            id: a.id,
        })
        .collect();
    println!("{}", Table::new(rows));
}

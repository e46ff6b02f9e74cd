use crate::{cli::Services, error, info, warning};

pub async fn genres(services: &Services) {
    let token = match services.tokens.get_valid_token().await {
        Ok(token) => token,
        Err(e) => error!("Cannot authenticate with Spotify: {}", e),
    };

    let genres = match services.catalog.list_genres(&token).await {
        Ok(genres) => genres,
        Err(e) => error!("Cannot load genres: {}", e),
    };

    if genres.is_empty() {
        warning!("The catalog returned no genre seeds");
        return;
    }

    info!("{} genres available", genres.len());
    for genre in genres {
        println!("{}", genre);
    }
}

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    cli::Services,
    error, info,
    management::RoundProgress,
    success,
    types::TrackTableRow,
};

pub async fn playlist(
    services: &Services,
    prompt: String,
    count: usize,
    per_round: usize,
    json: bool,
) {
    info!("Resolving {} playable tracks for \"{}\"", count, prompt);

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} [{bar:30.blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .progress_chars("=> "),
    );
    pb.set_message("asking the model for songs...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = services
        .accumulator
        .resolve_playlist_with_progress(&prompt, count, per_round, |progress: RoundProgress| {
            pb.set_position(progress.percent as u64);
            pb.set_message(format!(
                "round {}: {}/{} tracks",
                progress.round, progress.collected, progress.target
            ));
        })
        .await;
    pb.finish_and_clear();

    let tracks = match result {
        Ok(tracks) => tracks,
        Err(e) => error!("Playlist resolution failed: {}", e),
    };

    if json {
        match serde_json::to_string_pretty(&tracks) {
            Ok(out) => println!("{}", out),
            Err(e) => error!("Cannot serialize tracks: {}", e),
        }
        return;
    }

    let rows: Vec<TrackTableRow> = tracks.iter().map(TrackTableRow::from).collect();
    println!("{}", Table::new(rows));
    success!("Resolved {} playable tracks", tracks.len());
}

mod common;

use std::sync::Arc;

use common::{
    CountingTokens, FakeCatalog, FakeLlm, ScriptedGenerator, candidate, playable, query_for,
    without_preview,
};
use promptlist::{
    Error, Service,
    generator::PlaylistGenerator,
    management::{ResolutionAccumulator, ResolveOptions, RoundProgress},
    types::{Candidate, ResolvedTrack},
    utils,
};

fn round(n: usize, size: usize) -> Vec<Candidate> {
    (0..size).map(|i| candidate(n, i)).collect()
}

fn track_for(candidate: &Candidate) -> ResolvedTrack {
    playable(&candidate.title, &candidate.artist)
}

/// Round 1: 20 candidates, 6 playable (indices 1, 4, 7, 10, 13, 16), some
/// matches without preview. Round 2: 20 candidates, 7 playable.
fn seventies_pop_catalog(first: &[Candidate], second: &[Candidate]) -> FakeCatalog {
    let mut catalog = FakeCatalog::new();
    for (i, c) in first.iter().enumerate() {
        if i % 3 == 1 && i <= 16 {
            catalog = catalog.with_track(c, track_for(c));
        } else if i % 3 == 2 {
            catalog = catalog.with_track(c, without_preview(&c.title, &c.artist));
        }
    }
    for (i, c) in second.iter().enumerate() {
        if i % 2 == 0 && i < 14 {
            catalog = catalog.with_track(c, track_for(c));
        }
    }
    catalog
}

#[tokio::test]
async fn test_two_rounds_fill_quota_in_candidate_order() {
    let first = round(1, 20);
    let second = round(2, 20);
    let catalog = Arc::new(seventies_pop_catalog(&first, &second));
    let generator = Arc::new(ScriptedGenerator::new(vec![
        Ok(first.clone()),
        Ok(second.clone()),
        Ok(round(3, 20)),
    ]));
    let tokens = Arc::new(CountingTokens::new());
    let accumulator =
        ResolutionAccumulator::new(tokens.clone(), generator.clone(), catalog.clone());

    let mut progress: Vec<RoundProgress> = Vec::new();
    let tracks = accumulator
        .resolve_playlist_with_progress("70s pop", 10, 20, |p| progress.push(p))
        .await
        .unwrap();

    assert_eq!(tracks.len(), 10);
    assert!(tracks.iter().all(utils::has_preview));

    let expected: Vec<ResolvedTrack> = [1, 4, 7, 10, 13, 16]
        .iter()
        .map(|&i| track_for(&first[i]))
        .chain([0, 2, 4, 6].iter().map(|&i| track_for(&second[i])))
        .collect();
    assert_eq!(tracks, expected);

    // one token and one generation per round, nothing after the quota
    assert_eq!(tokens.calls(), 2);
    let requests = generator.requests();
    assert_eq!(requests.len(), 2);
    assert!(
        requests
            .iter()
            .all(|r| r.prompt_text == "70s pop" && r.requested_count == 20)
    );

    let percents: Vec<u8> = progress.iter().map(|p| p.percent).collect();
    assert_eq!(percents, vec![60, 100]);
    assert_eq!(progress[1].round, 2);
    assert_eq!(progress[1].collected, 10);
}

#[tokio::test]
async fn test_each_round_uses_its_own_token() {
    let first = round(1, 3);
    let second = round(2, 3);
    let catalog = Arc::new(
        FakeCatalog::new()
            .with_track(&first[0], track_for(&first[0]))
            .with_track(&second[0], track_for(&second[0])),
    );
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(first), Ok(second)]));
    let tokens = Arc::new(CountingTokens::new());
    let accumulator = ResolutionAccumulator::new(tokens.clone(), generator, catalog.clone());

    let tracks = accumulator.resolve_playlist("disco", 2, 3).await.unwrap();

    assert_eq!(tracks.len(), 2);
    let used: Vec<String> = catalog.queries().into_iter().map(|(t, _)| t).collect();
    assert_eq!(
        used,
        vec!["token-1", "token-1", "token-1", "token-2"]
    );
}

#[tokio::test]
async fn test_surplus_in_crossing_round_is_discarded() {
    let first = round(1, 8);
    let mut catalog = FakeCatalog::new();
    for c in &first {
        catalog = catalog.with_track(c, track_for(c));
    }
    let catalog = Arc::new(catalog);
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(first.clone())]));
    let accumulator =
        ResolutionAccumulator::new(Arc::new(CountingTokens::new()), generator, catalog.clone());

    let tracks = accumulator.resolve_playlist("funk", 3, 8).await.unwrap();

    assert_eq!(
        tracks,
        first[..3].iter().map(track_for).collect::<Vec<_>>()
    );
    // lookups stop once the quota is met
    assert_eq!(catalog.queries().len(), 3);
}

#[tokio::test]
async fn test_searches_use_title_and_artist() {
    let first = vec![Candidate::new("Le Freak", "Chic")];
    let catalog = Arc::new(FakeCatalog::new().with_track(&first[0], track_for(&first[0])));
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(first)]));
    let accumulator =
        ResolutionAccumulator::new(Arc::new(CountingTokens::new()), generator, catalog.clone());

    accumulator.resolve_playlist("disco", 1, 1).await.unwrap();

    assert_eq!(catalog.queries()[0].1, "Le Freak Chic");
}

#[tokio::test]
async fn test_generation_parse_failure_aborts_without_partial_result() {
    let first = round(1, 4);
    let catalog = Arc::new(FakeCatalog::new().with_track(&first[0], track_for(&first[0])));
    let llm = Arc::new(FakeLlm::new(vec![
        r#"{"playlist": ["Song 1-0 - Artist 0", "Song 1-1 - Artist 1"]}"#,
        "Here is your playlist: Dancing Queen by ABBA",
    ]));
    let generator = Arc::new(PlaylistGenerator::new(llm));
    let accumulator =
        ResolutionAccumulator::new(Arc::new(CountingTokens::new()), generator, catalog.clone());

    let err = accumulator
        .resolve_playlist("70s pop", 5, 2)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::GenerationParse(_)));
    // round 1 did resolve a track before round 2 failed
    assert_eq!(catalog.queries().len(), 2);
}

#[tokio::test]
async fn test_catalog_failure_aborts_the_call() {
    let first = round(1, 3);
    let catalog = Arc::new(
        FakeCatalog::new()
            .with_track(&first[0], track_for(&first[0]))
            .failing_on(&first[1], 500),
    );
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(first.clone())]));
    let accumulator =
        ResolutionAccumulator::new(Arc::new(CountingTokens::new()), generator, catalog.clone());

    let err = accumulator
        .resolve_playlist("70s pop", 3, 3)
        .await
        .unwrap_err();

    assert_eq!(err.service(), Some(Service::Catalog));
    assert_eq!(catalog.queries().len(), 2);
}

#[tokio::test]
async fn test_auth_failure_aborts_before_generation() {
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(round(1, 3))]));
    let accumulator = ResolutionAccumulator::new(
        Arc::new(CountingTokens::failing()),
        generator.clone(),
        Arc::new(FakeCatalog::new()),
    );

    let err = accumulator
        .resolve_playlist("70s pop", 3, 3)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth(_)));
    assert!(generator.requests().is_empty());
}

#[tokio::test]
async fn test_round_cap_ends_unproductive_resolution() {
    let first = round(1, 2);
    let catalog = Arc::new(
        FakeCatalog::new()
            .with_track(&first[0], without_preview(&first[0].title, &first[0].artist)),
    );
    let generator = Arc::new(ScriptedGenerator::new(vec![
        Ok(first),
        Ok(round(2, 2)),
        Ok(round(3, 2)),
        Ok(round(4, 2)),
    ]));
    let tokens = Arc::new(CountingTokens::new());
    let accumulator = ResolutionAccumulator::new(tokens.clone(), generator.clone(), catalog)
        .with_options(ResolveOptions {
            max_rounds: Some(3),
        });

    let err = accumulator
        .resolve_playlist("70s pop", 5, 2)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::RoundsExhausted {
            rounds: 3,
            collected: 0,
            target: 5
        }
    ));
    assert_eq!(generator.requests().len(), 3);
    assert_eq!(tokens.calls(), 3);
}

#[tokio::test]
async fn test_empty_rounds_keep_going_until_quota() {
    let third = round(3, 2);
    let catalog = Arc::new(
        FakeCatalog::new()
            .with_track(&third[0], track_for(&third[0]))
            .with_track(&third[1], track_for(&third[1])),
    );
    let generator = Arc::new(ScriptedGenerator::new(vec![
        Ok(Vec::new()),
        Ok(round(2, 2)),
        Ok(third),
    ]));
    let accumulator =
        ResolutionAccumulator::new(Arc::new(CountingTokens::new()), generator.clone(), catalog);

    let mut percents = Vec::new();
    let tracks = accumulator
        .resolve_playlist_with_progress("70s pop", 2, 2, |p| percents.push(p.percent))
        .await
        .unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(percents, vec![0, 0, 100]);
    assert_eq!(generator.requests().len(), 3);
}

#[tokio::test]
async fn test_zero_candidates_per_round_is_rejected() {
    let generator = Arc::new(ScriptedGenerator::new(vec![]));
    let accumulator = ResolutionAccumulator::new(
        Arc::new(CountingTokens::new()),
        generator.clone(),
        Arc::new(FakeCatalog::new()),
    );

    let err = accumulator
        .resolve_playlist("70s pop", 5, 0)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidRequest(_)));
    assert!(generator.requests().is_empty());
}

#[tokio::test]
async fn test_zero_target_returns_empty_without_calls() {
    let tokens = Arc::new(CountingTokens::new());
    let generator = Arc::new(ScriptedGenerator::new(vec![]));
    let accumulator = ResolutionAccumulator::new(
        tokens.clone(),
        generator.clone(),
        Arc::new(FakeCatalog::new()),
    );

    let tracks = accumulator.resolve_playlist("70s pop", 0, 10).await.unwrap();

    assert!(tracks.is_empty());
    assert_eq!(tokens.calls(), 0);
    assert!(generator.requests().is_empty());
}

#[tokio::test]
async fn test_concurrent_resolutions_do_not_share_state() {
    let a = round(1, 2);
    let b = round(2, 2);
    let mut catalog = FakeCatalog::new();
    for c in a.iter().chain(b.iter()) {
        catalog = catalog.with_track(c, track_for(c));
    }
    let catalog = Arc::new(catalog);

    let first = ResolutionAccumulator::new(
        Arc::new(CountingTokens::new()),
        Arc::new(ScriptedGenerator::new(vec![Ok(a.clone())])),
        catalog.clone(),
    );
    let second = ResolutionAccumulator::new(
        Arc::new(CountingTokens::new()),
        Arc::new(ScriptedGenerator::new(vec![Ok(b.clone())])),
        catalog.clone(),
    );

    let (left, right) = tokio::join!(
        first.resolve_playlist("a", 2, 2),
        second.resolve_playlist("b", 2, 2)
    );

    assert_eq!(left.unwrap(), a.iter().map(track_for).collect::<Vec<_>>());
    assert_eq!(right.unwrap(), b.iter().map(track_for).collect::<Vec<_>>());
    assert!(catalog.queries().iter().any(|(_, q)| *q == query_for(&a[0])));
}

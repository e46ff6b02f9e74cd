use std::sync::Arc;

use crate::{
    Res,
    error::Error,
    generator::CandidateSource,
    spotify::{TokenSource, TrackSearch},
    types::{AccumulationState, GenerationRequest, ResolvedTrack},
    utils,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Give up after this many rounds. `None` keeps generating until the
    /// quota is met, however long that takes.
    pub max_rounds: Option<u32>,
}

/// Emitted after every completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundProgress {
    pub round: u32,
    pub collected: usize,
    pub target: usize,
    /// 0-100, never decreases within one resolution.
    pub percent: u8,
}

/// Turns a prompt into exactly `target_count` playable tracks.
///
/// Each round fetches a token, asks the generator for a fresh batch of
/// candidates and looks every candidate up in the catalog. Matches with a
/// preview URL are appended in candidate order; misses and preview-less
/// matches are dropped. Rounds repeat until the quota is met. A failure in
/// any round aborts the whole call without a partial result.
///
/// The accumulator holds no per-call state, so one instance can serve
/// concurrent resolutions.
pub struct ResolutionAccumulator {
    tokens: Arc<dyn TokenSource>,
    generator: Arc<dyn CandidateSource>,
    catalog: Arc<dyn TrackSearch>,
    options: ResolveOptions,
}

impl ResolutionAccumulator {
    pub fn new(
        tokens: Arc<dyn TokenSource>,
        generator: Arc<dyn CandidateSource>,
        catalog: Arc<dyn TrackSearch>,
    ) -> Self {
        Self {
            tokens,
            generator,
            catalog,
            options: ResolveOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn resolve_playlist(
        &self,
        prompt: &str,
        target_count: usize,
        candidates_per_round: usize,
    ) -> Res<Vec<ResolvedTrack>> {
        self.resolve_playlist_with_progress(prompt, target_count, candidates_per_round, |_| {})
            .await
    }

    pub async fn resolve_playlist_with_progress<F>(
        &self,
        prompt: &str,
        target_count: usize,
        candidates_per_round: usize,
        mut on_progress: F,
    ) -> Res<Vec<ResolvedTrack>>
    where
        F: FnMut(RoundProgress),
    {
        if candidates_per_round == 0 {
            return Err(Error::InvalidRequest(
                "candidates per round must be greater than zero".to_string(),
            ));
        }

        let request = GenerationRequest {
            prompt_text: prompt.to_string(),
            requested_count: candidates_per_round,
        };
        let mut state = AccumulationState::default();

        while state.collected.len() < target_count {
            if let Some(max) = self.options.max_rounds {
                if state.rounds_attempted >= max {
                    return Err(Error::RoundsExhausted {
                        rounds: state.rounds_attempted,
                        collected: state.collected.len(),
                        target: target_count,
                    });
                }
            }
            state.rounds_attempted += 1;

            let token = self.tokens.fetch_token().await?;
            let candidates = self.generator.generate_candidates(&request).await?;

            let before = state.collected.len();
            for candidate in &candidates {
                // the rest of the round would be truncated away anyway
                if state.collected.len() >= target_count {
                    break;
                }

                let query = utils::search_query(candidate);
                match self.catalog.search_best_track(&token, &query).await? {
                    Some(track) if utils::has_preview(&track) => state.collected.push(track),
                    Some(_) => tracing::debug!(query = %query, "match has no preview, skipping"),
                    None => {}
                }
            }

            tracing::debug!(
                round = state.rounds_attempted,
                candidates = candidates.len(),
                accepted = state.collected.len() - before,
                collected = state.collected.len(),
                target = target_count,
                "resolution round finished"
            );

            on_progress(RoundProgress {
                round: state.rounds_attempted,
                collected: state.collected.len().min(target_count),
                target: target_count,
                percent: utils::progress_percent(state.collected.len(), target_count),
            });
        }

        state.collected.truncate(target_count);
        Ok(state.collected)
    }
}

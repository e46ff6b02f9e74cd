use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    Res,
    config::Config,
    error::Error,
    generator::llm::{CompletionRequest, LlmClient},
    types::{Candidate, GenerationRequest},
};

/// Separator between title and artist in generated entries. Only the first
/// occurrence splits, so a title containing it keeps the remainder in the
/// artist part.
pub const CANDIDATE_SEPARATOR: &str = " - ";

/// Produces candidate songs for a prompt.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn generate_candidates(&self, request: &GenerationRequest) -> Res<Vec<Candidate>>;
}

/// Asks a generative model for `count` songs and parses its answer.
///
/// A single call, no retries: any transport, status or parse failure goes
/// straight back to the caller.
pub struct PlaylistGenerator {
    llm: Arc<dyn LlmClient>,
    temperature: f32,
    max_tokens: u32,
}

impl PlaylistGenerator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            temperature: crate::config::DEFAULT_OPENAI_TEMPERATURE,
            max_tokens: crate::config::DEFAULT_OPENAI_MAX_TOKENS,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn from_config(llm: Arc<dyn LlmClient>, config: &Config) -> Self {
        Self::new(llm)
            .with_temperature(config.openai_temperature)
            .with_max_tokens(config.openai_max_tokens)
    }
}

#[async_trait]
impl CandidateSource for PlaylistGenerator {
    async fn generate_candidates(&self, request: &GenerationRequest) -> Res<Vec<Candidate>> {
        if request.requested_count == 0 {
            return Err(Error::InvalidRequest(
                "requested candidate count must be greater than zero".to_string(),
            ));
        }

        let completion = CompletionRequest::new(build_prompt(
            &request.prompt_text,
            request.requested_count,
        ))
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens);

        let text = self.llm.complete(completion).await?;
        let candidates = parse_playlist(&text)?;

        tracing::debug!(
            model = self.llm.model(),
            requested = request.requested_count,
            received = candidates.len(),
            "generated candidates"
        );
        Ok(candidates)
    }
}

pub fn build_prompt(prompt: &str, count: usize) -> String {
    format!(
        "Generate a {count} real songs playlist based on the following input: {prompt}. \
         Answer only with a JSON object, for each item return the song and the artist \
         like this example {{\"playlist\": [\"Billie Jean - Michael Jackson\", \"One - U2\"]}}"
    )
}

/// Parses the model's answer into candidates, keeping the model's order.
///
/// The answer must be a JSON object with a `playlist` array of
/// `"Title - Artist"` strings, optionally wrapped in a Markdown code fence.
pub fn parse_playlist(text: &str) -> Res<Vec<Candidate>> {
    let json: Value = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| Error::GenerationParse(format!("response is not valid JSON: {}", e)))?;

    let entries = json
        .get("playlist")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::GenerationParse("response has no \"playlist\" array".to_string()))?;

    entries
        .iter()
        .map(|entry| {
            let entry = entry.as_str().ok_or_else(|| {
                Error::GenerationParse(format!("playlist entry is not a string: {}", entry))
            })?;
            parse_candidate(entry)
        })
        .collect()
}

pub fn parse_candidate(entry: &str) -> Res<Candidate> {
    let malformed = || {
        Error::GenerationParse(format!(
            "entry {:?} is not in \"Title{}Artist\" form",
            entry, CANDIDATE_SEPARATOR
        ))
    };

    let (title, artist) = entry.split_once(CANDIDATE_SEPARATOR).ok_or_else(malformed)?;
    let (title, artist) = (title.trim(), artist.trim());
    if title.is_empty() || artist.is_empty() {
        return Err(malformed());
    }

    Ok(Candidate::new(title, artist))
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };

    // drop the language tag line, if any
    match inner.split_once('\n') {
        Some((tag, body)) if !tag.trim_start().starts_with('{') => body.trim(),
        _ => inner.trim(),
    }
}

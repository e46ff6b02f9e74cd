#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use promptlist::{
    Res,
    error::{Error, TransportError},
    generator::{CandidateSource, CompletionRequest, LlmClient},
    http::{ApiRequest, ApiResponse, HttpTransport},
    spotify::{TokenSource, TrackSearch},
    types::{Candidate, GenerationRequest, ResolvedTrack, Token},
};

/// Replays scripted responses in order and records every request it sees.
pub struct FakeTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new(responses: Vec<ApiResponse>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    pub fn with_results(results: Vec<Result<ApiResponse, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(results.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted response left".to_string())))
    }
}

/// Hands out fresh tokens and counts how often it was asked.
pub struct CountingTokens {
    calls: AtomicUsize,
    expires_in: u64,
    fail: bool,
}

impl CountingTokens {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            expires_in: 3600,
            fail: false,
        }
    }

    pub fn expiring_immediately() -> Self {
        Self {
            expires_in: 0,
            ..Self::new()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenSource for CountingTokens {
    async fn fetch_token(&self) -> Res<Token> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            return Err(Error::Auth("token endpoint rejected the credentials (401): invalid_client".to_string()));
        }
        Ok(Token::new(format!("token-{}", n), self.expires_in))
    }
}

/// Returns one scripted batch per round; an exhausted script yields empty
/// batches.
pub struct ScriptedGenerator {
    rounds: Mutex<VecDeque<Res<Vec<Candidate>>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new(rounds: Vec<Res<Vec<Candidate>>>) -> Self {
        Self {
            rounds: Mutex::new(rounds.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CandidateSource for ScriptedGenerator {
    async fn generate_candidates(&self, request: &GenerationRequest) -> Res<Vec<Candidate>> {
        self.requests.lock().unwrap().push(request.clone());
        self.rounds
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Catalog keyed by exact query text. Unknown queries have no match.
pub struct FakeCatalog {
    tracks: HashMap<String, ResolvedTrack>,
    failing: HashMap<String, u16>,
    queries: Mutex<Vec<(String, String)>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self {
            tracks: HashMap::new(),
            failing: HashMap::new(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_track(mut self, candidate: &Candidate, track: ResolvedTrack) -> Self {
        self.tracks.insert(query_for(candidate), track);
        self
    }

    pub fn failing_on(mut self, candidate: &Candidate, status: u16) -> Self {
        self.failing.insert(query_for(candidate), status);
        self
    }

    /// (access token, query) pairs in call order.
    pub fn queries(&self) -> Vec<(String, String)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrackSearch for FakeCatalog {
    async fn search_best_track(&self, token: &Token, query: &str) -> Res<Option<ResolvedTrack>> {
        self.queries
            .lock()
            .unwrap()
            .push((token.access_token.clone(), query.to_string()));
        if let Some(status) = self.failing.get(query) {
            return Err(Error::Upstream {
                service: promptlist::Service::Catalog,
                status: *status,
                message: "boom".to_string(),
            });
        }
        Ok(self.tracks.get(query).cloned())
    }
}

/// Returns canned text and records the completion requests.
pub struct FakeLlm {
    answers: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeLlm {
    pub fn new(answers: Vec<&str>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().map(str::to_string).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    fn model(&self) -> &str {
        "fake-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Res<String> {
        self.requests.lock().unwrap().push(request);
        Ok(self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "{\"playlist\": []}".to_string()))
    }
}

pub fn query_for(candidate: &Candidate) -> String {
    format!("{} {}", candidate.title, candidate.artist)
}

pub fn candidate(round: usize, index: usize) -> Candidate {
    Candidate::new(format!("Song {}-{}", round, index), format!("Artist {}", index))
}

pub fn playable(title: &str, artist: &str) -> ResolvedTrack {
    ResolvedTrack {
        title: title.to_string(),
        artist: artist.to_string(),
        album: format!("{} (album)", title),
        release_year: Some(1975),
        artwork_url: Some(format!("https://img.example/{}.jpg", title)),
        preview_url: Some(format!("https://p.example/{}.mp3", title)),
    }
}

pub fn without_preview(title: &str, artist: &str) -> ResolvedTrack {
    ResolvedTrack {
        preview_url: None,
        ..playable(title, artist)
    }
}

pub fn search_body(name: &str, artist: &str, release_date: &str, preview: Option<&str>) -> String {
    serde_json::json!({
        "tracks": {
            "items": [{
                "name": name,
                "artists": [{ "name": artist }, { "name": "Featured Guest" }],
                "album": {
                    "name": format!("{} (album)", name),
                    "release_date": release_date,
                    "images": [
                        { "url": "https://img.example/large.jpg", "height": 640, "width": 640 },
                        { "url": "https://img.example/small.jpg", "height": 64, "width": 64 }
                    ]
                },
                "preview_url": preview
            }]
        }
    })
    .to_string()
}

//! Playlist suggestions from a generative language model.
//!
//! [`llm`] holds the model client seam ([`LlmClient`]) and the OpenAI
//! implementation; [`playlist`] turns a prompt into ordered [`Candidate`]s.
//!
//! [`Candidate`]: crate::types::Candidate

pub mod llm;
pub mod playlist;

pub use llm::{CompletionRequest, LlmClient, OpenAiClient};
pub use playlist::{CandidateSource, PlaylistGenerator, build_prompt, parse_candidate, parse_playlist};

//! Prompt-to-Playlist Library
//!
//! Turns a free-text prompt into a fixed-size list of playable Spotify tracks.
//! A generative model suggests songs, the Spotify catalog confirms them, and
//! only tracks with a preview URL are kept. Rounds are repeated until the
//! requested number of tracks has been collected.
//!
//! # Modules
//!
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration from environment variables and `.env` files
//! - `error` - Error types naming the failing dependency
//! - `generator` - Generative model client and candidate parsing
//! - `http` - HTTP transport and the rate-limit aware requester
//! - `management` - Resolution loop and token caching
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Small pure helpers
//!
//! # Example
//!
//! ```
//! use promptlist::{cli::Services, config};
//!
//! #[tokio::main]
//! async fn main() -> promptlist::Res<()> {
//!     let config = config::Config::from_env()?;
//!     let services = Services::from_config(&config);
//!     let tracks = services.accumulator.resolve_playlist("70s pop", 10, 10).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod http;
pub mod management;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::{Error, Service};

/// A convenient Result type alias used throughout the crate.
pub type Res<T> = std::result::Result<T, error::Error>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Resolving playlist for {}", prompt);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for fatal errors; the process terminates with exit code 1 right after
/// printing.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}

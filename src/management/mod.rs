mod resolver;
mod token;

pub use resolver::ResolutionAccumulator;
pub use resolver::ResolveOptions;
pub use resolver::RoundProgress;
pub use token::TokenManager;

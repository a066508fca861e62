// Voice-answer matching shared by the step-wizard and chat front-ends.
// Pure and synchronous: no state, safe to call from any handler concurrently.

pub mod handlers;
pub mod matcher;
pub mod similarity;

pub use matcher::{match_best, MatchKind, MatchResult};

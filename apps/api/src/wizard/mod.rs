// Resume wizard: question sets per profession and the session state machine
// that threads answers from profession selection through to download.

pub mod handlers;
pub mod questions;
pub mod session;

pub use questions::QuestionBank;

//! Question module - the question aggregate and its embedded answers.

mod aggregate;
mod answer;

pub use aggregate::{Question, MAX_TITLE_LENGTH};
pub use answer::Answer;

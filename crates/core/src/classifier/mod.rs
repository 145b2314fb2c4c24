//! Content warning classification.
//!
//! [`classify`] is the pure rule; [`ClassificationStage`] runs it, together
//! with its simulated CPU cost, on the blocking pool.

mod config;
mod rules;
mod stage;

pub use config::ClassifierConfig;
pub use rules::{classify, contains_token, SUBJECT_LABEL};
pub use stage::{
    simulate_model_cost, ClassificationError, ClassificationResult, ClassificationStage,
};

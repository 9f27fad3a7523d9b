//! Command interpretation and dispatch
//!
//! Raw text -> custom rule match or [`Classifier`] -> [`ParsedCommand`]
//! -> [`Router`] bands -> [`Reply`]

pub mod classifier;
pub mod custom;
pub mod handlers;
pub mod math;
pub mod parsed;
pub mod reply;
pub mod router;

pub use classifier::{Classifier, PatternClassifier};
pub use custom::{CommandAction, CustomCommandRule, CustomCommandStore, ExecutionResult};
pub use parsed::{Intent, ParsedCommand};
pub use reply::Reply;
pub use router::Router;

pub mod brand_world;
pub mod chat;
pub mod dimensions;
pub mod engine;
pub mod evaluation;
pub mod gap_fill;
pub mod prompts;

pub use crate::domain::ports::{ChatModel, Pipeline, Storage};
pub use crate::utils::error::Result;

pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{Cli, Command};
pub use config::{LocalStorage, Settings};

pub use core::brand_world::BrandWorldPipeline;
pub use core::chat::ChatClient;
pub use core::dimensions::DimensionPipeline;
pub use core::engine::AnalysisEngine;
pub use core::evaluation::EvaluationPipeline;
pub use core::gap_fill::{standard_dimensions, GapFillPipeline, Vocabulary};

pub use utils::error::{BriefError, Result};

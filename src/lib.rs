pub mod analysis;
pub mod catalog;
pub mod config;
pub mod core;
pub mod domain;
pub mod journal;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use config::toml_config::TomlConfig;
pub use core::{engine::AnalysisEngine, pipeline::AnalysisPipeline};
pub use utils::error::{AnalysisError, Result};

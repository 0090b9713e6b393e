pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod rt;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::DigestSettings;
pub use core::{etl::DigestEngine, pipeline::DigestPipeline};
pub use utils::error::{DigestError, Result};

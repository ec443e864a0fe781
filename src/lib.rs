pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliArgs, Job};

pub use adapters::storage::LocalStorage;
pub use config::AppConfig;
pub use core::{etl::EtlEngine, failure::FailureCollector};
pub use domain::model::{ItemFailure, RunReport};
pub use utils::error::{EtlError, Result};

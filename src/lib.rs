pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{HttpSource, LocalSource, SnapshotSource};
pub use config::EngineConfig;
pub use core::{engine::AtlasEngine, loader::CountryLoader, snapshot::SnapshotAggregator};
pub use domain::indicators::IndicatorCode;
pub use utils::error::{AtlasError, Result};

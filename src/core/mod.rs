pub mod distribution;
pub mod engine;
pub mod geo;
pub mod graph;
pub mod ingest;
pub mod loader;
pub mod ranking;
pub mod snapshot;

pub use crate::domain::model::{CountryRecord, GraphEdge, GraphNode, RankingEntry};
pub use crate::domain::ports::DocumentSource;
pub use crate::utils::error::Result;

// [libs/infra/graph-store/src/lib.rs]
//! Typed property graph persistence (Graph Store, §4.2).

pub mod client;
pub mod errors;
pub mod mission_store;
pub mod repository;
pub mod schema;

pub use client::GraphStoreClient;
pub use errors::GraphError;
pub use mission_store::MissionStore;
pub use repository::{BatchCounts, DeletionCounts, GraphRepository, GraphSnapshot, GraphStats};

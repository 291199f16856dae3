// src/core/mod.rs
//! Core services: configuration, time, and the document store backends

pub mod clock;
pub mod config_manager;
pub mod database;
pub mod memory_store;
pub mod paths;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config_manager::ConfigManager;
pub use database::SqliteStore;
pub use memory_store::MemoryStore;
pub use paths::JobLocations;
pub use store::{Document, DocumentStore, Fields, Filter, FilterOp};

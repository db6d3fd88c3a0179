//! Database module for deadline history storage.
//!
//! This module provides abstractions for store operations via the Repository
//! pattern, allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! The database module follows a layered architecture:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (REST API, alerting, etc.)           │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services/) - Forecasting Logic          │
//! │  - Pattern analysis                                      │
//! │  - Heuristic + seasonal prediction                       │
//! │  - Aggregation and profile re-ranking                    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Trait (repository/) - Abstract Interface    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌──────────────────────────────────────────────┐
//!     │             Local Repository                  │
//!     │               (in-memory)                     │
//!     └──────────────────────────────────────────────┘
//! ```
//!
//! The forecasting subsystem is a read path over the platform's shared
//! grant-listing store; the records here are derived views, never the
//! system of record.

#[cfg(not(feature = "local-repo"))]
compile_error!("Enable at least one repository backend feature.");

pub mod dedup;
pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use dedup::record_key;
pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::{ForecastSettings, RepositoryConfig};
#[cfg(feature = "local-repo")]
pub use repositories::LocalRepository;
pub use repository::{
    DeadlineHistoryRepository, ErrorContext, FunderGroup, RepositoryError, RepositoryResult,
};

//! # GrantRadar Forecast Engine
//!
//! Deadline-pattern forecasting engine for the GrantRadar platform.
//!
//! This crate analyzes historical funding-opportunity deadlines and predicts
//! when a funder's next cycle will open and close. It is invoked in-process
//! by the surrounding application; the HTTP layer, relational schema, and
//! alerting pipeline live elsewhere and consume the plain structs exposed
//! here.
//!
//! ## Features
//!
//! - **Pattern Analysis**: Per-funder summaries of typical deadline day,
//!   months, timing variance, and cycle length
//! - **Heuristic Prediction**: Rule-based projection of the next deadline,
//!   with federal fiscal-calendar alignment
//! - **Seasonal Model**: Optional per-funder time-series model over
//!   day-of-year values, with a cached-model service and a rule-based
//!   fallback path
//! - **Forecast Aggregation**: Ranked upcoming-opportunity lists, optionally
//!   re-ranked against a researcher's declared research areas
//! - **History Extraction**: Idempotent ingestion of raw grant listings into
//!   deduplicated deadline history records
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Consolidated public DTO surface
//! - [`models`]: Domain value types and calendar math
//! - [`db`]: Repository pattern and persistence abstractions
//! - [`services`]: Statistical analysis and forecasting logic

pub mod api;

pub mod db;
pub mod models;

pub mod services;

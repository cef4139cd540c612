// Rust guideline compliant 2026-02-06

//! Tabula Core Library
//!
//! This crate provides the listing engine behind Tabula:
//! - Data models (values, criteria, columns, review states, rows, transitions)
//! - Ports to the catalog, workflow, data manager and transition executor
//! - Query construction, search (full-text or metadata scan) and manual sort
//! - Pagination and the adapter-driven row pipeline
//! - Bulk transition resolution
//! - Listing definitions with copy-on-write mutation and engine configuration
//! - In-memory port implementations over JSONL entity files

pub mod config;
pub mod context;
pub mod definition;
pub mod error;
pub mod identity;
pub mod memory;
pub mod models;
pub mod paging;
pub mod ports;
pub mod query;
pub mod rows;
pub mod search;
pub mod sort;
pub mod transitions;

pub use config::EngineConfig;
pub use context::RequestContext;
pub use definition::{ColumnSet, ListingDefinition, Position, SharedListing};
pub use error::{Error, Result};
pub use identity::{is_uid, valid_uids};
pub use memory::{EntityRecord, MemoryCatalog, MemoryDataManager, MemoryStore, MemoryWorkflow};
pub use models::{
    ColumnSpec, Criteria, FilterState, Link, PathCriteria, ReviewState, Row, SortDirection,
    Timestamp, Transition, Value,
};
pub use paging::{window, Window};
pub use ports::{
    Catalog, DataManager, Entity, IndexRecord, TransitionExecutor, TransitionFailure, Workflow,
};
pub use query::{BuiltQuery, Query, QueryBuilder};
pub use rows::{
    AdapterRegistry, ColumnResolvers, ListingAdapter, ListingHooks, NoHooks, RowBatch,
    RowPipeline,
};
pub use search::{SearchExecutor, SearchOutcome};
pub use sort::ManualSort;
pub use transitions::TransitionResolver;

// Rust guideline compliant 2026-02-09

//! Application services for Tabula listings.
//!
//! This crate exposes the listing operations (rows, transitions, children,
//! raw queries, field writes, transition outcomes) over the core engine,
//! with structured errors and standardized response envelopes.

pub mod dispatch;
pub mod error;
pub mod listing;
pub mod requests;
pub mod response;
pub mod workflow_action;

pub use dispatch::{dispatch, OPERATIONS};
pub use error::{AppError, ErrorCode, Result};
pub use listing::ListingService;
pub use requests::{
    ChildrenPayload, ExecuteTransitionRequest, FetchChildrenRequest, FetchRowsRequest,
    FetchTransitionsRequest, QueryRowsPayload, QueryRowsRequest, RowsPayload, SaveQueue,
    SetFieldsPayload, SetFieldsRequest, TransitionOutcome, TransitionsPayload,
};
pub use response::{envelope, ErrorEnvelope, SuccessEnvelope};

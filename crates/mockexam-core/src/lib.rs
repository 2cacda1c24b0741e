//! mockexam-core: question bank, timed test sessions, and scoring.
//!
//! This crate owns every piece of mockexam state: the record store, user
//! identity, CSV question ingestion, the test-session state machine, and the
//! scoring and history logic that turns a finished session into results.

pub mod config;
pub mod error;
pub mod history;
pub mod identity;
pub mod ingest;
pub mod model;
pub mod scoring;
pub mod session;
pub mod store;
pub mod timer;

//! jobflow: job-board client core.
//!
//! [`operation::AsyncOperation`] wraps one remote call with a
//! `{data, error, loading}` lifecycle. The [`controller`] module builds the
//! screens on top of it: optimistic saved-job toggles, application status
//! changes, and mutations that refresh the list they affect.

pub mod app;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod identity;
pub mod operation;
pub mod remote;
pub mod telemetry;
pub mod ui;
pub mod validate;

pub use error::JobflowError;

//! Unit tests for the middleware crate.
//!
//! Kept apart from the source files. Tests go through the public and pub(crate) API only and never
//! touch an external service.

mod session_test;

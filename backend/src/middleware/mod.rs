//! Actix middleware for the backend.

pub mod trace;

pub use trace::{Trace, TraceId};

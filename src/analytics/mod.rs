//! Derived herd statistics and alerts.
//!
//! Everything here is a pure function over rows already loaded from the
//! store. "Now" and "today" are always parameters.

pub mod alerts;
pub mod filters;
pub mod metrics;

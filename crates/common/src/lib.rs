//! Shared types for the orrery demo.
//!
//! # Invariants
//! - `Time` readings from a `Clock` never decrease.
//! - Delta time is produced by an explicitly owned `Clock`, never by global state.

mod time;

pub use time::{Clock, MonotonicTicks, TickSource, Time};

pub fn crate_info() -> &'static str {
    "orrery-common v0.1.0"
}

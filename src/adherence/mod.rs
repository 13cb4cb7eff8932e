//! Missed-dose and adherence reconciliation.
//!
//! Pure functions over records already loaded from storage: expanding
//! recurrence schedules into concrete dose instants, indexing taken
//! logs by hour bucket, classifying scheduled doses as satisfied,
//! pending, or missed, and rolling up per-day adherence counts.
//! Callers pass `now` and the local UTC offset explicitly so results
//! are reproducible.

mod aggregator;
mod expander;
mod intake_index;
mod reconciler;

pub use aggregator::*;
pub use expander::*;
pub use intake_index::*;
pub use reconciler::*;

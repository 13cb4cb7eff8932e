//! API endpoint handlers.
//!
//! One module per resource. Handlers stay thin: parse, call the
//! repository or the reconciliation core, shape the response.

pub mod adherence;
pub mod health;
pub mod intake_logs;
pub mod medications;
pub mod notifications;
pub mod schedule;
pub mod suggestions;

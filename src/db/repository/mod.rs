//! Repository layer: entity-scoped database operations.
//!
//! Every query is owner-scoped: it filters on user_id so one user's
//! records never appear in another's responses.

mod intake_logs;
mod medications;
mod tokens;

pub use intake_logs::*;
pub use medications::*;
pub use tokens::*;

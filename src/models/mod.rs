pub mod enums;
pub mod filters;
pub mod intake_log;
pub mod medication;

pub use enums::*;
pub use filters::*;
pub use intake_log::*;
pub use medication::*;

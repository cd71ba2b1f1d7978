//! Data Models
//!
//! Contains all data structures used throughout the application.

pub mod evaluation;
pub mod records;
pub mod report;
pub mod response;
pub mod session;
pub mod settings;

pub use evaluation::*;
pub use records::*;
pub use report::*;
pub use response::*;
pub use session::*;
pub use settings::*;

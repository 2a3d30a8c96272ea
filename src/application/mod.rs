//! Application layer: command scripts and the intelligence service
//!
//! This layer drives the domain tree and writes results to an output sink.

pub mod command;
pub mod error;
pub mod error_ext;
pub mod parser;
pub mod service;

pub use command::{Command, Script};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use parser::parse_script;
pub use service::IntelligenceService;

pub mod analysis;
pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod har;

pub use config::{ConfigOverrides, ReportConfig};
pub use error::{Error, Result};

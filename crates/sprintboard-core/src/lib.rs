pub mod config;
pub mod error;
pub mod result;

pub use config::{AppConfig, ColumnConfig};
pub use error::{BoardError, ErrorKind};
pub use result::BoardResult;

pub mod config;
pub mod error;
pub mod error_utils;
pub mod matcher;
pub mod types;
pub mod window;

pub use config::*;
pub use error::*;
pub use error_utils::*;
pub use matcher::*;
pub use types::*;
pub use window::*;

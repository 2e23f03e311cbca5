pub mod config;
pub mod errors;
pub mod output;

pub use config::*;
pub use errors::*;
pub use output::*;

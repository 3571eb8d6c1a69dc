pub mod config;
pub mod errors;
pub mod format;
pub mod logging;
pub mod platform;
pub mod process;
pub mod prompt;
pub mod safety;

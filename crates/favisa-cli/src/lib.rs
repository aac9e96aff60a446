//! Library half of the `favisa` binary: configuration, the load command and
//! terminal renderings.

pub mod config;
pub mod load;
pub mod render;

pub use config::AppConfig;

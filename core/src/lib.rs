pub mod action;
pub mod config;
pub mod error;
pub mod interactive;
pub mod lang;
pub mod output;
pub mod question;
pub mod runner;
pub mod storage;
pub mod style;

pub use crate::config::DirConfig;
pub use crate::error::ConfigError;

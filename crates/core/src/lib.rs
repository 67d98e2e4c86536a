#![deny(rust_2018_idioms)]

pub mod commands;
mod config;

pub use config::{ConfigError, EngineConfig};

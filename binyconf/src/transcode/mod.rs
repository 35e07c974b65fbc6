//! Conversions between yconf nodes and other configuration formats.

pub mod toml;
pub mod yaml;

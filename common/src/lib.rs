pub mod config;
pub mod manifest;

//! HTTP inbound adapter: page handlers, session cookie glue and rendering.

pub mod error;
pub mod health;
pub mod pages;
pub mod render;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;

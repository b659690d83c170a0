//! Inbound adapters translating external requests into router calls.
//!
//! Only HTTP exists today; it lives under [`http`].

pub mod http;

//! healthd - minimal HTTP healthcheck server
//!
//! Core library for the listener, HTTP handling and configuration.

pub mod config;
pub mod greeting;
pub mod http;
pub mod server;

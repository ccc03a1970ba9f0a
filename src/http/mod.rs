//! HTTP transport layer
//!
//! Provides the API handlers and the request metadata extraction they share.

pub mod handlers;

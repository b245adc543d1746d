//! docroot - minimal HTTP/1.1 file server
//!
//! Serves, accepts uploads to, and appends to files under a fixed document
//! root, one task per accepted connection.

pub mod config;
pub mod http;
pub mod server;

//! HTTP protocol engine.
//!
//! Each accepted connection carries exactly one request:
//!
//! ```text
//!   raw bytes ──► framer ──► request ──► handler ──► writer ──► raw bytes
//!                 (complete?)  (parse +     (status +
//!                              classify)    file I/O)
//! ```
//!
//! - **`framer`**: reads until a request is complete (header terminator plus
//!   `Content-Length` body bytes)
//! - **`parser`**: byte-level request line, header and multipart parsing
//! - **`docroot`**: path resolution, classification and file access under the
//!   document root
//! - **`request`**: the classified request model
//! - **`handler`**: maps a request to its response, performing file writes
//! - **`response`**: status codes and the immutable response
//! - **`mime`**: content types by file extension
//! - **`writer`**: serialises a response onto the stream
//! - **`connection`**: per-connection state machine (read, process, write, close)
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Frame one request (skipped in maintenance mode)
//!        └──────┬──────┘
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Classify and build the response
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send the response
//!        └──────┬───────────┘
//!               ▼
//!            Closed
//! ```

pub mod connection;
pub mod docroot;
pub mod framer;
pub mod handler;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;

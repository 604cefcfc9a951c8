//! Structured logging facility for rowkeeper
//!
//! - Single initialization point via `init(profile)`
//! - Boundary macros (`log_op_start!`, `log_op_end!`) for repository and
//!   transaction operations
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use rowkeeper_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! Errors are returned to the caller, never logged here.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};

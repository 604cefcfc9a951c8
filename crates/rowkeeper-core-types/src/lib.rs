//! Core types shared across Rowkeeper facilities
//!
//! This crate provides foundational types used by both the error and
//! logging facilities:
//!
//! - **Sensitive data**: Sensitive<T> marker for credential masking
//! - **Schema constants**: Canonical field keys and event names

pub mod schema;
pub mod sensitive;

pub use sensitive::Sensitive;

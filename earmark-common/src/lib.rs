//! # Earmark Common Library
//!
//! Shared code for the Earmark review service:
//! - Error taxonomy and result alias
//! - Label-log path resolution
//! - Time parsing and timestamp utilities

pub mod config;
pub mod error;
pub mod human_time;
pub mod time;

pub use error::{Error, Result};

//! # TchaMusic Common Library
//!
//! Shared code for the TchaMusic service crates:
//! - Error type and result alias
//! - Configuration loading and root folder resolution
//! - Database initialization, schema and record models
//! - Password and session token hashing
//! - Timestamp helpers

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};

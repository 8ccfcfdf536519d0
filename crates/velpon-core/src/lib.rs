//! # velpon-core
//!
//! Core crate for Velpon. Contains the configuration schemas and the
//! unified error system shared by the resolver crate and the CLI.
//!
//! This crate has **no** internal dependencies on other Velpon crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::AppError;
pub use result::AppResult;

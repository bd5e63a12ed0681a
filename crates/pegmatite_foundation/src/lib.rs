//! Core values, locations, expectations, and errors for Pegmatite.
//!
//! This crate provides:
//! - [`Value`] - The value type produced by matching and by action code
//! - [`Position`], [`Location`], [`Cursor`] - Input position tracking
//! - [`Expectation`] - Failure descriptors and the error message format
//! - [`Error`], [`SyntaxError`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod expectation;
pub mod location;
pub mod value;

pub use error::{Error, ErrorContext, ErrorKind, SyntaxError};
pub use expectation::{ClassPart, Expectation};
pub use location::{Cursor, Location, Position};
pub use value::{Array, Object, Value};

/// Result type alias using Pegmatite's Error.
pub type Result<T> = std::result::Result<T, Error>;

//! Elga Core - Foundational types for the Elga site toolkit
//!
//! Provides the error enum and `Result` alias every other Elga crate
//! propagates with `?`.

mod error;

pub use error::{ElgaError, Result};

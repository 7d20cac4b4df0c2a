//! CLI command implementations

pub mod generate;
pub mod i18n;
pub mod providers;

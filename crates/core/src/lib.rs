//! `applysmart-core` library crate.
//!
//! Rule catalog, validation engine, correction simulator and the session
//! types for exam document uploads. Pure domain logic with no HTTP or
//! storage layer.

pub mod analysis;
pub mod catalog;
pub mod correction;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod naming;
pub mod report;
pub mod rules;
pub mod scoring;
pub mod session;
pub mod types;
pub mod validators;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use catalog::RuleCatalog;
pub use engine::{EngineConfig, ValidationEngine};
pub use error::CoreError;

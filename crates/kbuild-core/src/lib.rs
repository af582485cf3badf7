//! Core domain types and traits for the kaniko build action.
//!
//! This crate contains:
//! - Image reference normalization
//! - The build request and verbosity levels
//! - The environment provider abstraction
//! - Artifact info records and the reporting client trait

pub mod artifact;
pub mod environment;
pub mod error;
pub mod reference;
pub mod request;

pub use environment::{Environment, ProcessEnvironment, StaticEnvironment};
pub use error::{Error, Result};
pub use reference::{ParsedReference, ReferenceKind};
pub use request::{BuildRequest, Verbosity};

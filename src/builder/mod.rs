//! Descriptor construction.
//!
//! This module provides the builder that turns state behaviors and
//! transition tables into a validated [`crate::engine::Descriptor`], and the
//! macros that generate typed state and event enumerations.

pub mod descriptor;
pub mod error;
pub mod macros;

pub use descriptor::DescriptorBuilder;
pub use error::{BuildError, StructuralDefect};

//! module-bom - Node.js module bill of materials for buildpack builds
//!
//! Provisions the `cyclonedx-node-module` tool into a cached layer, runs it
//! against the application and records the result as build and launch
//! bills of materials.

pub mod bom;
pub mod build;
pub mod cli;
pub mod clock;
pub mod config;
pub mod dependency;
pub mod detect;
pub mod error;
pub mod layer;
pub mod process;

pub use error::{BomError, BomResult};

//! # moonwatch-pack
//!
//! Compiles the daemon for a target and packages the result into a bundle
//! directory or archive.
//!
//! Call [`pipeline::run`] to build and package a set of targets, or use
//! [`build()`] and [`package()`] individually.

pub mod build;
pub mod error;
pub mod identity;
pub mod packager;
pub mod pipeline;

pub use build::{build, BuildOptions};
pub use error::PackError;
pub use identity::{CargoPkgid, IdentityProvider};
pub use packager::{package, Packaged};
pub use pipeline::{PipelineOptions, TargetScope};

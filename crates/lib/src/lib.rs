//! crossbuild-lib: cross-compilation of Go programs over a target matrix
//!
//! This crate provides the building blocks of a release build:
//! - `platform`: target identifiers, the compatibility table and matrix expansion
//! - `tmpl`: the template renderer used for flags, binary names and hooks
//! - `build`: a single target build through a `Compiler`
//! - `artifact`: the run-wide registry of produced binaries
//! - `pipeline`: every build of a project across its targets

pub mod artifact;
pub mod build;
pub mod config;
pub mod consts;
pub mod context;
pub mod git;
pub mod hooks;
pub mod pipeline;
pub mod platform;
pub mod tmpl;
pub mod util;

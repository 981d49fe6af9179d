//! Building one target.
//!
//! A build validates the target, renders every flag category, checks the
//! entry point and runs the toolchain once. On success exactly one artifact is
//! recorded; on failure nothing is.
//!
//! # Submodules
//!
//! - [`compiler`] - The [`Compiler`](compiler::Compiler) seam and the process-spawning implementation
//! - [`execute`] - Invocation assembly and artifact recording
//! - [`flags`] - Flag rendering and ldflags joining
//! - [`main_check`] - Entry point inspection

pub mod compiler;
pub mod execute;
pub mod flags;
pub mod main_check;
mod types;

pub use compiler::{CompileOutput, Compiler, GoCompiler, Invocation};
pub use execute::{build, invocation_env, new_artifact, record_artifact};
pub use types::*;

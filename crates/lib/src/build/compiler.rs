//! Toolchain execution.

use std::future::Future;
use std::io;
use std::path::PathBuf;

use tokio::process::Command;
use tracing::{debug, info};

/// A fully assembled toolchain call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
  /// Applied in order, so later entries override earlier ones.
  pub env: Vec<(String, String)>,
  pub dir: PathBuf,
}

impl Invocation {
  /// Effective value of `key` after ordered application.
  pub fn env_value(&self, key: &str) -> Option<&str> {
    self.env.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
  }
}

/// Result of one toolchain run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOutput {
  pub success: bool,
  /// Human-readable exit status, e.g. `exit status: 2`.
  pub status: String,
  pub stdout: String,
  pub stderr: String,
}

/// Runs a toolchain invocation to completion.
pub trait Compiler {
  /// Run `invocation`. `Err` means the process could not be started at all.
  fn compile(&self, invocation: &Invocation) -> impl Future<Output = io::Result<CompileOutput>> + Send;
}

/// Spawns the invocation as a child process with exactly the given environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoCompiler;

impl Compiler for GoCompiler {
  async fn compile(&self, invocation: &Invocation) -> io::Result<CompileOutput> {
    info!(program = %invocation.program, args = ?invocation.args, "invoking toolchain");

    let mut command = Command::new(&invocation.program);
    command
      .args(&invocation.args)
      .current_dir(&invocation.dir)
      .env_clear();
    for (key, value) in &invocation.env {
      command.env(key, value);
    }

    debug!(working_dir = ?invocation.dir, "spawning process");
    let output = command.output().await?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "toolchain stderr");
    }

    Ok(CompileOutput {
      success: output.status.success(),
      status: output.status.to_string(),
      stdout,
      stderr,
    })
  }
}

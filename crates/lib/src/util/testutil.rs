//! Test utilities for crossbuild-lib.
//!
//! Shell and git helpers, Go source fixtures and a recording fake
//! [`Compiler`].

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::build::{CompileOutput, Compiler, Invocation};

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Writes a `main.go` with a main function into `dir`.
pub fn write_good_main(dir: &Path) {
  std::fs::write(dir.join("main.go"), "package main\nvar a = 1\nfunc main() {println(0)}").unwrap();
}

/// Writes a `main.go` that compiles as a package but has no main function.
pub fn write_main_without_main_func(dir: &Path) {
  std::fs::write(dir.join("main.go"), "package main\nconst a = 2\nfunc notMain() {println(0)}").unwrap();
}

/// Records every invocation. Succeeds and creates the `-o` file unless
/// built with [`FakeCompiler::failing`].
#[derive(Debug, Default)]
pub struct FakeCompiler {
  pub invocations: Mutex<Vec<Invocation>>,
  fail_with: Option<String>,
}

impl FakeCompiler {
  pub fn new() -> Self {
    Self::default()
  }

  /// A compiler whose every run exits non-zero with `stderr`.
  pub fn failing(stderr: &str) -> Self {
    Self {
      fail_with: Some(stderr.to_string()),
      ..Default::default()
    }
  }

  pub fn calls(&self) -> Vec<Invocation> {
    self.invocations.lock().unwrap().clone()
  }
}

impl Compiler for FakeCompiler {
  async fn compile(&self, invocation: &Invocation) -> io::Result<CompileOutput> {
    self.invocations.lock().unwrap().push(invocation.clone());

    if let Some(stderr) = &self.fail_with {
      return Ok(CompileOutput {
        success: false,
        status: "exit status: 2".to_string(),
        stdout: String::new(),
        stderr: stderr.clone(),
      });
    }

    if let Some(out) = output_path(invocation) {
      if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)?;
      }
      std::fs::write(&out, b"")?;
    }
    Ok(CompileOutput {
      success: true,
      status: "exit status: 0".to_string(),
      ..Default::default()
    })
  }
}

/// The value following `-o`, resolved against the invocation directory.
pub fn output_path(invocation: &Invocation) -> Option<PathBuf> {
  let idx = invocation.args.iter().position(|a| a == "-o")?;
  invocation.args.get(idx + 1).map(|p| invocation.dir.join(p))
}

/// A compiler that cannot be started.
#[derive(Debug, Default)]
pub struct MissingCompiler;

impl Compiler for MissingCompiler {
  async fn compile(&self, _invocation: &Invocation) -> io::Result<CompileOutput> {
    Err(io::Error::new(io::ErrorKind::NotFound, "program not found"))
  }
}

/// Runs the git CLI in `dir` with a fixed identity and no user or system
/// config, returning trimmed stdout. Panics when git fails.
pub fn git(dir: &Path, args: &[&str]) -> String {
  let output = std::process::Command::new("git")
    .args(["-c", "commit.gpgsign=false", "-c", "tag.gpgsign=false"])
    .args(args)
    .current_dir(dir)
    .env("GIT_CONFIG_NOSYSTEM", "1")
    .env("GIT_CONFIG_GLOBAL", dir.join(".gitconfig-test"))
    .env("GIT_AUTHOR_NAME", "crossbuild")
    .env("GIT_AUTHOR_EMAIL", "crossbuild@example.com")
    .env("GIT_COMMITTER_NAME", "crossbuild")
    .env("GIT_COMMITTER_EMAIL", "crossbuild@example.com")
    .output()
    .unwrap();
  assert!(
    output.status.success(),
    "git {args:?} failed: {}",
    String::from_utf8_lossy(&output.stderr)
  );
  String::from_utf8_lossy(&output.stdout).trim().to_string()
}

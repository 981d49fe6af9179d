//! Pre and post build hooks.
//!
//! A hook is a single command line, rendered as a template against the
//! target's fields and run through the platform shell.

use std::path::Path;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use crate::tmpl::{Fields, TemplateError};

#[derive(Debug, Error)]
pub enum HookError {
  #[error(transparent)]
  Template(#[from] TemplateError),

  #[error("failed to run hook '{cmd}': {source}")]
  Spawn {
    cmd: String,
    #[source]
    source: std::io::Error,
  },

  #[error("hook '{cmd}' failed with {status}: {stderr}")]
  Failed { cmd: String, status: String, stderr: String },
}

/// Render and run `hook` in `dir` with exactly `env`. Empty hooks are skipped.
///
/// Returns the command's trimmed stdout.
pub async fn run(hook: &str, fields: &Fields, dir: &Path, env: &[(String, String)]) -> Result<String, HookError> {
  if hook.trim().is_empty() {
    return Ok(String::new());
  }

  let cmd = fields.apply(hook)?;
  info!(cmd = %cmd, "running hook");

  let (shell, shell_args) = get_shell();
  let mut command = Command::new(&shell);
  command.args(&shell_args).arg(&cmd).current_dir(dir).env_clear();
  for (key, value) in env {
    command.env(key, value);
  }

  debug!(shell = %shell, working_dir = ?dir, "spawning hook");
  let output = command.output().await.map_err(|source| HookError::Spawn {
    cmd: cmd.clone(),
    source,
  })?;

  let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stdout.is_empty() {
      debug!(stdout = %stdout, "hook stdout");
    }
    return Err(HookError::Failed {
      cmd,
      status: output.status.to_string(),
      stderr,
    });
  }

  if !stdout.is_empty() {
    debug!(stdout = %stdout, "hook output");
  }
  Ok(stdout)
}

/// Shell and leading arguments for running a command line.
///
/// `/bin/sh` rather than `$SHELL`, so user profiles are not sourced.
fn get_shell() -> (String, Vec<String>) {
  #[cfg(unix)]
  {
    ("/bin/sh".to_string(), vec!["-c".to_string()])
  }

  #[cfg(windows)]
  {
    (
      "powershell.exe".to_string(),
      vec![
        "-NoProfile".to_string(),
        "-ExecutionPolicy".to_string(),
        "Bypass".to_string(),
        "-Command".to_string(),
      ],
    )
  }
}

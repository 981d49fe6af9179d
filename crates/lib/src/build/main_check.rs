//! Entry point inspection.
//!
//! Before invoking the toolchain, make sure the configured `main` names Go
//! sources that declare a top-level `func main()`.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::BuildError;
use crate::consts::DEFAULT_MAIN;

/// Check that `main` (relative to `root`) contains a main function.
pub fn check_main(root: &Path, main: &str, id: &str) -> Result<(), BuildError> {
  let main = if main.is_empty() { DEFAULT_MAIN } else { main };

  for file in resolve_sources(root, main)? {
    let source = std::fs::read_to_string(&file)
      .map_err(|e| BuildError::entry_point("open", &file.display().to_string(), &e))?;
    if has_main(&source) {
      debug!(id = %id, file = ?file, "found main function");
      return Ok(());
    }
  }

  Err(BuildError::MissingMain { id: id.to_string() })
}

/// Go files named by `main`: a glob's matches, a directory's non-test
/// sources, or the file itself.
fn resolve_sources(root: &Path, main: &str) -> Result<Vec<PathBuf>, BuildError> {
  if main.contains(['*', '?', '[']) {
    let pattern = root.join(main).to_string_lossy().to_string();
    let matches = glob::glob(&pattern).map_err(|e| BuildError::EntryPoint {
      op: "glob",
      path: main.to_string(),
      reason: e.msg.to_string(),
    })?;
    let files: Vec<PathBuf> = matches.filter_map(Result::ok).filter(|p| is_go_source(p)).collect();
    if files.is_empty() {
      return Err(BuildError::EntryPoint {
        op: "stat",
        path: main.to_string(),
        reason: "no such file or directory".to_string(),
      });
    }
    return Ok(files);
  }

  let path = root.join(main);
  let metadata = std::fs::metadata(&path).map_err(|e| BuildError::entry_point("stat", main, &e))?;
  if !metadata.is_dir() {
    return Ok(vec![path]);
  }

  let entries = std::fs::read_dir(&path).map_err(|e| BuildError::entry_point("open", main, &e))?;
  let mut files: Vec<PathBuf> = entries
    .filter_map(Result::ok)
    .map(|entry| entry.path())
    .filter(|p| is_go_source(p))
    .collect();
  files.sort();
  Ok(files)
}

fn is_go_source(path: &Path) -> bool {
  let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
  path.is_file() && name.ends_with(".go") && !name.ends_with("_test.go")
}

/// Whether `source` declares `func main()` at the top level, without a
/// receiver.
pub fn has_main(source: &str) -> bool {
  let code = strip_comments_and_literals(source);
  let mut depth = 0usize;

  for (i, c) in code.char_indices() {
    match c {
      '{' => depth += 1,
      '}' => depth = depth.saturating_sub(1),
      'f' if depth == 0 && code[i..].starts_with("func") && at_word_start(&code, i) => {
        if is_main_decl(&code[i + "func".len()..]) {
          return true;
        }
      }
      _ => {}
    }
  }
  false
}

fn at_word_start(code: &str, i: usize) -> bool {
  code[..i]
    .chars()
    .next_back()
    .is_none_or(|c| !(c.is_alphanumeric() || c == '_'))
}

/// `rest` follows a `func` keyword; match ` main ( )`.
fn is_main_decl(rest: &str) -> bool {
  let Some(rest) = rest.strip_prefix(char::is_whitespace) else {
    return false;
  };
  let Some(rest) = rest.trim_start().strip_prefix("main") else {
    return false;
  };
  let Some(rest) = rest.trim_start().strip_prefix('(') else {
    return false;
  };
  rest.trim_start().starts_with(')')
}

/// Blank out comments and the contents of string and rune literals so braces
/// and keywords inside them are not seen.
fn strip_comments_and_literals(source: &str) -> String {
  let mut out = String::with_capacity(source.len());
  let mut chars = source.chars().peekable();

  while let Some(c) = chars.next() {
    match c {
      '/' if chars.peek() == Some(&'/') => {
        while chars.peek().is_some_and(|&n| n != '\n') {
          chars.next();
        }
        out.push(' ');
      }
      '/' if chars.peek() == Some(&'*') => {
        chars.next();
        let mut prev = ' ';
        for c in chars.by_ref() {
          if prev == '*' && c == '/' {
            break;
          }
          if c == '\n' {
            out.push('\n');
          }
          prev = c;
        }
        out.push(' ');
      }
      '"' | '\'' => {
        let quote = c;
        let mut escaped = false;
        for ch in chars.by_ref() {
          if escaped {
            escaped = false;
          } else if ch == '\\' {
            escaped = true;
          } else if ch == quote || ch == '\n' {
            break;
          }
        }
        out.push(quote);
        out.push(quote);
      }
      '`' => {
        for c in chars.by_ref() {
          if c == '`' {
            break;
          }
        }
        out.push_str("``");
      }
      _ => out.push(c),
    }
  }
  out
}

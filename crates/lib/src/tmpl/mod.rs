//! Flag templates.
//!
//! Templates use `{{ }}` actions over a fixed set of [`Fields`]:
//!
//! ```text
//! -X main.version={{.Version}} -X main.date={{.Date}}
//! -X main.env={{.Env.DEPLOY_ENV}} -X main.year={{ time "2006" }}
//! ```
//!
//! Error text follows Go's `text/template`, e.g.
//! `template: tmpl:1: unexpected "}" in operand`.

mod exec;
mod fields;
mod lex;
mod parse;
mod timefmt;

use thiserror::Error;

pub use fields::{ArtifactFields, Fields};

/// Name every template is parsed under; it appears in error messages.
pub const TEMPLATE_NAME: &str = "tmpl";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
  #[error("template: {name}:{line}: {message}")]
  Parse { name: String, line: usize, message: String },

  #[error("template: {name}:{line}:{col}: executing \"{name}\" at <{node}>: {message}")]
  Exec {
    name: String,
    line: usize,
    col: usize,
    node: String,
    message: String,
  },
}

/// Render `templates` and prefix each result with `prefix`.
pub fn render_prefixed(fields: &Fields, templates: &[String], prefix: &str) -> Result<Vec<String>, TemplateError> {
  Ok(
    fields
      .apply_all(templates)?
      .into_iter()
      .map(|flag| format!("{prefix}{flag}"))
      .collect(),
  )
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;
  use std::path::PathBuf;

  use chrono::{TimeZone, Utc};

  use super::*;
  use crate::artifact::{Artifact, ArtifactType, EXTRA_BINARY, EXTRA_EXT, EXTRA_ID};
  use crate::context::{Context, GitInfo};

  fn fields() -> Fields {
    Fields {
      project_name: "proj".to_string(),
      version: "1.2.3".to_string(),
      tag: "v1.2.3".to_string(),
      commit: "123".to_string(),
      full_commit: "123abc".to_string(),
      short_commit: "12".to_string(),
      major: 1,
      minor: 2,
      patch: 3,
      date: "2024-03-09T14:05:07Z".to_string(),
      timestamp: 1709993107,
      env: BTreeMap::from([("FOO".to_string(), "123".to_string())]),
      now: Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap(),
      artifact: None,
    }
  }

  fn artifact() -> Artifact {
    Artifact {
      name: "name".to_string(),
      path: PathBuf::from("dist/foo_linux_arm_6/name"),
      goos: "linux".to_string(),
      goarch: "arm".to_string(),
      goarm: Some("6".to_string()),
      kind: ArtifactType::Binary,
      extra: BTreeMap::from([
        (EXTRA_BINARY.to_string(), "foo".to_string()),
        (EXTRA_ID.to_string(), "foo".to_string()),
        (EXTRA_EXT.to_string(), String::new()),
      ]),
    }
  }

  fn apply_err(template: &str) -> String {
    fields().apply(template).unwrap_err().to_string()
  }

  #[test]
  fn renders_plain_text_unchanged() {
    assert_eq!(fields().apply("-s -w").unwrap(), "-s -w");
  }

  #[test]
  fn renders_global_fields() {
    let out = fields()
      .apply("{{.ProjectName}} {{.Version}} {{.Tag}} {{.Commit}} {{.FullCommit}} {{.ShortCommit}}")
      .unwrap();
    assert_eq!(out, "proj 1.2.3 v1.2.3 123 123abc 12");
    assert_eq!(fields().apply("{{.Major}}.{{.Minor}}.{{.Patch}}").unwrap(), "1.2.3");
    assert_eq!(fields().apply("{{.Timestamp}}").unwrap(), "1709993107");
  }

  #[test]
  fn renders_env_and_artifact_fields() {
    let f = fields().with_artifact(&artifact());
    assert_eq!(
      f.apply("{{ .Env.FOO }}-{{.Os}}-{{.Arch}}-{{.Arm}}-{{.Binary}}-{{.ArtifactName}}").unwrap(),
      "123-linux-arm-6-foo-name"
    );
  }

  #[test]
  fn build_env_overlays_context_env() {
    let env = BTreeMap::from([("FOO".to_string(), "456".to_string()), ("BAR".to_string(), "x".to_string())]);
    let f = fields().with_env(&env);
    assert_eq!(f.apply("{{.Env.FOO}}{{.Env.BAR}}").unwrap(), "456x");
  }

  #[test]
  fn time_function_formats_go_layout() {
    assert_eq!(fields().apply(r#"{{ time "2006-01-02" }}"#).unwrap(), "2024-03-09");
    assert_eq!(fields().apply(r#"{{ "2006" | time }}"#).unwrap(), "2024");
    assert_eq!(fields().apply("{{ time `01/02` }}").unwrap(), "03/09");
  }

  #[test]
  fn comments_and_trim_markers() {
    assert_eq!(fields().apply("a {{/* skipped */}}b").unwrap(), "a b");
    assert_eq!(fields().apply("a {{- .Version -}} b").unwrap(), "a1.2.3b");
  }

  #[test]
  fn missing_env_key_names_the_key() {
    assert_eq!(
      apply_err("{{.Env.NOPE}}"),
      r#"template: tmpl:1:6: executing "tmpl" at <.Env.NOPE>: map has no entry for key "NOPE""#
    );
    assert_eq!(
      apply_err("-X main.foo={{ .Env.NOPE }}"),
      r#"template: tmpl:1:19: executing "tmpl" at <.Env.NOPE>: map has no entry for key "NOPE""#
    );
  }

  #[test]
  fn unknown_field_is_an_error() {
    assert_eq!(
      apply_err("{{.Nope}}"),
      r#"template: tmpl:1:2: executing "tmpl" at <.Nope>: map has no entry for key "Nope""#
    );
  }

  #[test]
  fn artifact_fields_need_an_artifact() {
    assert_eq!(
      apply_err("{{.Os}}"),
      r#"template: tmpl:1:2: executing "tmpl" at <.Os>: map has no entry for key "Os""#
    );
  }

  #[test]
  fn field_on_string_is_an_error() {
    assert_eq!(
      apply_err("{{.Version.Foo}}"),
      r#"template: tmpl:1:10: executing "tmpl" at <.Version.Foo>: can't evaluate field Foo in type string"#
    );
  }

  #[test]
  fn exec_errors_on_later_lines_count_from_line_start() {
    assert_eq!(
      apply_err("a\n  {{.Nope}}"),
      r#"template: tmpl:2:4: executing "tmpl" at <.Nope>: map has no entry for key "Nope""#
    );
  }

  #[test]
  fn parse_errors_match_go_wording() {
    assert_eq!(apply_err("{{.Version}"), r#"template: tmpl:1: unexpected "}" in operand"#);
    assert_eq!(apply_err("{{ .Nope }"), r#"template: tmpl:1: unexpected "}" in operand"#);
    assert_eq!(apply_err("{{ .Version"), "template: tmpl:1: unclosed action");
    assert_eq!(apply_err("{{}}"), "template: tmpl:1: missing value for command");
    assert_eq!(apply_err("{{ nope }}"), r#"template: tmpl:1: function "nope" not defined"#);
    assert_eq!(apply_err(r#"{{ time "2006 }}"#), "template: tmpl:1: unterminated quoted string");
  }

  #[test]
  fn time_arity_is_checked() {
    assert_eq!(
      apply_err("{{ time }}"),
      r#"template: tmpl:1:3: executing "tmpl" at <time>: wrong number of args for time: want 1 got 0"#
    );
    assert_eq!(
      apply_err(r#"{{ time "a" "b" }}"#),
      r#"template: tmpl:1:3: executing "tmpl" at <time>: wrong number of args for time: want 1 got 2"#
    );
  }

  #[test]
  fn prefixes_each_flag() {
    let templates = vec!["-D{{.Version}}".to_string(), "-S".to_string()];
    assert_eq!(
      render_prefixed(&fields(), &templates, "-gcflags=").unwrap(),
      vec!["-gcflags=-D1.2.3", "-gcflags=-S"]
    );
    assert!(render_prefixed(&fields(), &[], "-asmflags=").unwrap().is_empty());
  }

  #[test]
  fn first_failure_aborts_the_batch() {
    let templates = vec!["ok".to_string(), "{{.Env.NOPE}}".to_string(), "{{.Version}".to_string()];
    let err = render_prefixed(&fields(), &templates, "").unwrap_err();
    assert!(matches!(err, TemplateError::Exec { .. }));
  }

  #[test]
  fn fields_from_context_fall_back_to_default_tag() {
    let ctx = Context {
      project_name: "proj".to_string(),
      version: "1.0.0".to_string(),
      date: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
      ..Default::default()
    };
    let f = Fields::new(&ctx);
    assert_eq!(f.tag, "v0.0.0");
    assert_eq!((f.major, f.minor, f.patch), (0, 0, 0));
    assert_eq!(f.date, "2024-01-02T03:04:05Z");
    assert_eq!(f.timestamp, 1704164645);
  }

  #[test]
  fn fields_from_context_parse_semver_tag() {
    let ctx = Context {
      git: GitInfo {
        current_tag: "v2.10.4".to_string(),
        ..Default::default()
      },
      ..Default::default()
    };
    let f = Fields::new(&ctx);
    assert_eq!((f.major, f.minor, f.patch), (2, 10, 4));
  }
}

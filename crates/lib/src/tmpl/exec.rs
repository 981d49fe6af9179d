//! Template execution against [`Fields`].

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use super::fields::Fields;
use super::lex::line_at;
use super::parse::{Arg, Command, Node, Pipeline};
use super::{TEMPLATE_NAME, TemplateError, timefmt};

/// Functions callable from templates.
pub const FUNCTIONS: &[&str] = &["time"];

pub enum Value<'a> {
  Str(Cow<'a, str>),
  Map(&'a BTreeMap<String, String>),
  /// The root value (`.`).
  Data(&'a Fields),
}

impl Value<'_> {
  fn type_name(&self) -> &'static str {
    match self {
      Value::Str(_) => "string",
      Value::Map(_) => "map[string]string",
      Value::Data(_) => "map[string]interface {}",
    }
  }
}

impl fmt::Display for Value<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Str(s) => write!(f, "{s}"),
      Value::Map(map) => {
        write!(f, "map[")?;
        for (i, (k, v)) in map.iter().enumerate() {
          if i > 0 {
            write!(f, " ")?;
          }
          write!(f, "{k}:{v}")?;
        }
        write!(f, "]")
      }
      Value::Data(fields) => {
        write!(f, "map[")?;
        for (i, (name, value)) in fields.entries().into_iter().enumerate() {
          if i > 0 {
            write!(f, " ")?;
          }
          write!(f, "{name}:{value}")?;
        }
        write!(f, "]")
      }
    }
  }
}

/// Failure while executing, tied to the node being evaluated.
struct ExecError {
  pos: usize,
  node: String,
  message: String,
}

impl ExecError {
  fn at(arg: &Arg, message: String) -> Self {
    Self {
      pos: arg.pos(),
      node: arg.to_string(),
      message,
    }
  }

  fn into_template_error(self, input: &str) -> TemplateError {
    let line_start = input[..self.pos].rfind('\n').map_or(0, |i| i + 1);
    TemplateError::Exec {
      name: TEMPLATE_NAME.to_string(),
      line: line_at(input, self.pos),
      col: self.pos - line_start,
      node: self.node,
      message: self.message,
    }
  }
}

type Result<T> = std::result::Result<T, ExecError>;

/// Render parsed `nodes`; `input` is the template source, used for error positions.
pub fn execute(nodes: &[Node], fields: &Fields, input: &str) -> std::result::Result<String, TemplateError> {
  let mut out = String::new();
  for node in nodes {
    match node {
      Node::Text(text) => out.push_str(text),
      Node::Action(pipeline) => {
        let value = eval_pipeline(pipeline, fields).map_err(|e| e.into_template_error(input))?;
        out.push_str(&value.to_string());
      }
    }
  }
  Ok(out)
}

fn eval_pipeline<'a>(pipeline: &'a Pipeline, fields: &'a Fields) -> Result<Value<'a>> {
  let mut last = None;
  for command in &pipeline.commands {
    last = Some(eval_command(command, fields, last)?);
  }
  Ok(last.unwrap_or(Value::Str(Cow::Borrowed(""))))
}

fn eval_command<'a>(command: &'a Command, fields: &'a Fields, piped: Option<Value<'a>>) -> Result<Value<'a>> {
  let Some(first) = command.args.first() else {
    return Ok(Value::Str(Cow::Borrowed("")));
  };
  let has_args = command.args.len() > 1 || piped.is_some();

  match first {
    Arg::Field { idents, .. } => {
      if has_args {
        let last = idents.last().map_or("", String::as_str);
        return Err(ExecError::at(first, format!("{last} is not a method but has arguments")));
      }
      eval_field(first, idents, fields)
    }
    Arg::Function { name, .. } => eval_call(first, name, &command.args[1..], piped, fields),
    _ if has_args => Err(ExecError::at(first, format!("can't give argument to non-function {first}"))),
    Arg::Dot { .. } => Ok(Value::Data(fields)),
    Arg::Str { value, .. } => Ok(Value::Str(Cow::Borrowed(value))),
    Arg::Number { text, .. } => Ok(Value::Str(Cow::Borrowed(text))),
    Arg::Bool { value, .. } => Ok(Value::Str(Cow::Borrowed(if *value { "true" } else { "false" }))),
  }
}

fn eval_field<'a>(node: &Arg, idents: &[String], fields: &'a Fields) -> Result<Value<'a>> {
  let mut current = Value::Data(fields);
  for ident in idents {
    let missing = || ExecError::at(node, format!("map has no entry for key {ident:?}"));
    current = match current {
      Value::Data(fields) => fields.get(ident).ok_or_else(missing)?,
      Value::Map(map) => map
        .get(ident)
        .map(|v| Value::Str(Cow::Borrowed(v.as_str())))
        .ok_or_else(missing)?,
      Value::Str(_) => {
        return Err(ExecError::at(node, format!("can't evaluate field {ident} in type string")));
      }
    };
  }
  Ok(current)
}

fn eval_call<'a>(
  node: &Arg,
  name: &str,
  args: &'a [Arg],
  piped: Option<Value<'a>>,
  fields: &'a Fields,
) -> Result<Value<'a>> {
  match name {
    "time" => {
      let got = args.len() + usize::from(piped.is_some());
      if got != 1 {
        return Err(ExecError::at(
          node,
          format!("wrong number of args for {name}: want 1 got {got}"),
        ));
      }
      let layout = match (args.first(), piped) {
        (Some(arg), _) => eval_string_arg(arg, fields)?,
        (None, Some(value)) => expect_string(node, value)?,
        (None, None) => String::new(),
      };
      Ok(Value::Str(Cow::Owned(timefmt::format(&fields.now, &layout))))
    }
    _ => Err(ExecError::at(node, format!("function {name:?} not defined"))),
  }
}

fn eval_string_arg(arg: &Arg, fields: &Fields) -> Result<String> {
  match arg {
    Arg::Str { value, .. } => Ok(value.clone()),
    Arg::Field { idents, .. } => {
      let value = eval_field(arg, idents, fields)?;
      expect_string(arg, value)
    }
    Arg::Dot { .. } => expect_string(arg, Value::Data(fields)),
    Arg::Function { name, .. } => {
      let value = eval_call(arg, name, &[], None, fields)?;
      expect_string(arg, value)
    }
    Arg::Number { .. } | Arg::Bool { .. } => Err(ExecError::at(arg, format!("expected string; found {arg}"))),
  }
}

fn expect_string(node: &Arg, value: Value<'_>) -> Result<String> {
  match value {
    Value::Str(s) => Ok(s.into_owned()),
    other => Err(ExecError::at(
      node,
      format!("wrong type for value; expected string; got {}", other.type_name()),
    )),
  }
}

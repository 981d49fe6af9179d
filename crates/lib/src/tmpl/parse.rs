//! Template parser.
//!
//! Builds a flat list of text and action nodes from lexer items. Control
//! structures (`if`, `range`, ...) and variables are not part of the language.

use std::fmt;

use super::exec::FUNCTIONS;
use super::lex::{Item, ItemKind, lex};

/// A parse failure, reported with the line it occurred on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
  pub line: usize,
  pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
  Text(String),
  Action(Pipeline),
}

/// Commands separated by `|`; each command's result is passed as the last
/// argument of the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
  pub commands: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
  pub args: Vec<Arg>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
  /// `.A.B`; `pos` is the offset of the last chained segment.
  Field { pos: usize, idents: Vec<String> },
  Dot { pos: usize },
  Function { pos: usize, name: String },
  Str { pos: usize, quoted: String, value: String },
  Number { pos: usize, text: String },
  Bool { pos: usize, value: bool },
}

impl Arg {
  pub fn pos(&self) -> usize {
    match self {
      Arg::Field { pos, .. }
      | Arg::Dot { pos }
      | Arg::Function { pos, .. }
      | Arg::Str { pos, .. }
      | Arg::Number { pos, .. }
      | Arg::Bool { pos, .. } => *pos,
    }
  }

  /// Whether the argument can start a pipeline stage other than the first.
  fn is_executable(&self) -> bool {
    matches!(self, Arg::Field { .. } | Arg::Function { .. })
  }
}

impl fmt::Display for Arg {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Arg::Field { idents, .. } => {
        for ident in idents {
          write!(f, ".{ident}")?;
        }
        Ok(())
      }
      Arg::Dot { .. } => write!(f, "."),
      Arg::Function { name, .. } => write!(f, "{name}"),
      Arg::Str { quoted, .. } => write!(f, "{quoted}"),
      Arg::Number { text, .. } => write!(f, "{text}"),
      Arg::Bool { value, .. } => write!(f, "{value}"),
    }
  }
}

struct Parser {
  items: Vec<Item>,
  idx: usize,
}

/// Parse a template into nodes.
pub fn parse(input: &str) -> Result<Vec<Node>, ParseError> {
  let mut parser = Parser { items: lex(input), idx: 0 };
  let mut nodes = Vec::new();

  loop {
    let item = parser.next();
    match item.kind {
      ItemKind::Eof => break,
      ItemKind::Text => nodes.push(Node::Text(item.val)),
      ItemKind::LeftDelim => nodes.push(Node::Action(parser.pipeline("command")?)),
      _ => return Err(parser.unexpected(&item, "input")),
    }
  }

  Ok(nodes)
}

impl Parser {
  fn next(&mut self) -> Item {
    match self.items.get(self.idx) {
      Some(item) => {
        self.idx += 1;
        item.clone()
      }
      // The lexer always ends with Eof or Error, so this only repeats the last item.
      None => self.items.last().cloned().unwrap_or(Item {
        kind: ItemKind::Eof,
        val: String::new(),
        pos: 0,
        line: 1,
      }),
    }
  }

  fn backup(&mut self) {
    self.idx = self.idx.saturating_sub(1);
  }

  fn next_non_space(&mut self) -> Item {
    loop {
      let item = self.next();
      if item.kind != ItemKind::Space {
        return item;
      }
    }
  }

  fn peek_non_space(&mut self) -> Item {
    let item = self.next_non_space();
    self.backup();
    item
  }

  fn error(&self, item: &Item, message: String) -> ParseError {
    ParseError { line: item.line, message }
  }

  fn unexpected(&self, item: &Item, context: &str) -> ParseError {
    if item.kind == ItemKind::Error {
      return self.error(item, item.val.clone());
    }
    self.error(item, format!("unexpected {item} in {context}"))
  }

  fn pipeline(&mut self, context: &str) -> Result<Pipeline, ParseError> {
    let mut commands = Vec::new();
    loop {
      let item = self.next_non_space();
      match item.kind {
        ItemKind::RightDelim => {
          check_pipeline(&commands, context).map_err(|message| self.error(&item, message))?;
          return Ok(Pipeline { commands });
        }
        ItemKind::Bool
        | ItemKind::Dot
        | ItemKind::Field
        | ItemKind::Identifier
        | ItemKind::Number
        | ItemKind::String
        | ItemKind::RawString => {
          self.backup();
          commands.push(self.command()?);
        }
        _ => return Err(self.unexpected(&item, context)),
      }
    }
  }

  fn command(&mut self) -> Result<Command, ParseError> {
    let mut args = Vec::new();
    loop {
      self.peek_non_space();
      if let Some(arg) = self.operand()? {
        args.push(arg);
      }
      let item = self.next();
      match item.kind {
        ItemKind::Space => continue,
        ItemKind::RightDelim => self.backup(),
        ItemKind::Pipe => {}
        _ => return Err(self.unexpected(&item, "operand")),
      }
      if args.is_empty() {
        return Err(self.error(&item, "empty command".to_string()));
      }
      return Ok(Command { args });
    }
  }

  fn operand(&mut self) -> Result<Option<Arg>, ParseError> {
    let Some(term) = self.term()? else {
      return Ok(None);
    };
    if self.items.get(self.idx).map(|i| i.kind) != Some(ItemKind::Field) {
      return Ok(Some(term));
    }

    let mut idents = match term {
      Arg::Field { idents, .. } => idents,
      other => {
        let item = self.next();
        return Err(self.error(&item, format!("unexpected . after term {:?}", other.to_string())));
      }
    };
    let mut pos = 0;
    while self.items.get(self.idx).map(|i| i.kind) == Some(ItemKind::Field) {
      let item = self.next();
      if pos == 0 {
        pos = item.pos;
      }
      idents.extend(split_field(&item.val));
    }
    Ok(Some(Arg::Field { pos, idents }))
  }

  fn term(&mut self) -> Result<Option<Arg>, ParseError> {
    let item = self.next_non_space();
    let arg = match item.kind {
      ItemKind::Identifier => {
        if !FUNCTIONS.contains(&item.val.as_str()) {
          return Err(self.error(&item, format!("function {:?} not defined", item.val)));
        }
        Arg::Function {
          pos: item.pos,
          name: item.val,
        }
      }
      ItemKind::Dot => Arg::Dot { pos: item.pos },
      ItemKind::Field => Arg::Field {
        pos: item.pos,
        idents: split_field(&item.val),
      },
      ItemKind::Bool => Arg::Bool {
        pos: item.pos,
        value: item.val == "true",
      },
      ItemKind::Number => Arg::Number {
        pos: item.pos,
        text: item.val,
      },
      ItemKind::String | ItemKind::RawString => {
        let value = unquote(&item.val).ok_or_else(|| self.error(&item, "invalid syntax".to_string()))?;
        Arg::Str {
          pos: item.pos,
          quoted: item.val,
          value,
        }
      }
      _ => {
        self.backup();
        return Ok(None);
      }
    };
    Ok(Some(arg))
  }
}

fn check_pipeline(commands: &[Command], context: &str) -> Result<(), String> {
  if commands.is_empty() {
    return Err(format!("missing value for {context}"));
  }
  for (i, command) in commands.iter().enumerate().skip(1) {
    if command.args.first().is_some_and(|arg| !arg.is_executable()) {
      return Err(format!("non executable command in pipeline stage {}", i + 1));
    }
  }
  Ok(())
}

fn split_field(val: &str) -> Vec<String> {
  val.split('.').filter(|s| !s.is_empty()).map(str::to_string).collect()
}

/// Decode an interpreted (`"..."`) or raw (`` `...` ``) string literal.
fn unquote(quoted: &str) -> Option<String> {
  if let Some(raw) = quoted.strip_prefix('`') {
    return raw.strip_suffix('`').map(str::to_string);
  }

  let inner = quoted.strip_prefix('"')?.strip_suffix('"')?;
  let mut out = String::with_capacity(inner.len());
  let mut chars = inner.chars();
  while let Some(c) = chars.next() {
    if c != '\\' {
      out.push(c);
      continue;
    }
    let decoded = match chars.next()? {
      'n' => '\n',
      't' => '\t',
      'r' => '\r',
      'a' => '\x07',
      'b' => '\x08',
      'f' => '\x0c',
      'v' => '\x0b',
      '\\' => '\\',
      '"' => '"',
      '\'' => '\'',
      'x' => hex_escape(&mut chars, 2)?,
      'u' => hex_escape(&mut chars, 4)?,
      'U' => hex_escape(&mut chars, 8)?,
      _ => return None,
    };
    out.push(decoded);
  }
  Some(out)
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<char> {
  let hex: String = chars.by_ref().take(digits).collect();
  if hex.len() != digits {
    return None;
  }
  char::from_u32(u32::from_str_radix(&hex, 16).ok()?)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn err(input: &str) -> String {
    let e = parse(input).unwrap_err();
    format!("{}: {}", e.line, e.message)
  }

  #[test]
  fn text_only() {
    assert_eq!(parse("-s -w").unwrap(), vec![Node::Text("-s -w".to_string())]);
  }

  #[test]
  fn field_chain_is_one_operand() {
    let nodes = parse("{{ .Env.FOO }}").unwrap();
    let Node::Action(pipeline) = &nodes[0] else {
      panic!("expected action");
    };
    assert_eq!(
      pipeline.commands[0].args,
      vec![Arg::Field {
        pos: 7,
        idents: vec!["Env".to_string(), "FOO".to_string()],
      }]
    );
  }

  #[test]
  fn function_with_string_argument() {
    let nodes = parse(r#"{{ time "2006" }}"#).unwrap();
    let Node::Action(pipeline) = &nodes[0] else {
      panic!("expected action");
    };
    let args = &pipeline.commands[0].args;
    assert_eq!(args.len(), 2);
    assert_eq!(args[0].to_string(), "time");
    assert_eq!(args[1].to_string(), "\"2006\"");
  }

  #[test]
  fn single_brace_is_unexpected() {
    assert_eq!(err("{{.Version}"), "1: unexpected \"}\" in operand");
    assert_eq!(err("{{ .Nope }"), "1: unexpected \"}\" in operand");
  }

  #[test]
  fn unclosed_action() {
    assert_eq!(err("{{ .Version "), "1: unclosed action");
  }

  #[test]
  fn empty_action_is_missing_value() {
    assert_eq!(err("{{ }}"), "1: missing value for command");
  }

  #[test]
  fn unknown_function() {
    assert_eq!(err("{{ upper .Version }}"), "1: function \"upper\" not defined");
  }

  #[test]
  fn errors_report_their_line() {
    assert_eq!(err("a\nb\n{{ .X }"), "3: unexpected \"}\" in operand");
  }

  #[test]
  fn literal_cannot_follow_pipe() {
    assert_eq!(
      err(r#"{{ .Version | "x" }}"#),
      "1: non executable command in pipeline stage 2"
    );
  }

  #[test]
  fn decodes_escapes() {
    assert_eq!(unquote(r#""a\tbé""#).as_deref(), Some("a\tbé"));
    assert_eq!(unquote("`raw\\n`").as_deref(), Some("raw\\n"));
    assert_eq!(unquote(r#""\q""#), None);
  }
}

//! Template lexer.
//!
//! Splits a template into text and action items. Lexing stops at the first
//! error, which is emitted as an [`ItemKind::Error`] item so the parser reports
//! errors in source order.

use std::fmt;

const LEFT_DELIM: &str = "{{";
const RIGHT_DELIM: &str = "}}";
const LEFT_COMMENT: &str = "/*";
const RIGHT_COMMENT: &str = "*/";
const TRIM_MARKER: char = '-';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
  Text,
  LeftDelim,
  RightDelim,
  Space,
  Field,
  Dot,
  Identifier,
  Bool,
  Number,
  String,
  RawString,
  Pipe,
  /// Any other printable character inside an action.
  Char,
  Error,
  Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
  pub kind: ItemKind,
  pub val: String,
  /// Byte offset of the item in the template.
  pub pos: usize,
  pub line: usize,
}

impl fmt::Display for Item {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.kind {
      ItemKind::Eof => write!(f, "EOF"),
      ItemKind::Error => write!(f, "{}", self.val),
      ItemKind::Dot => write!(f, "<{}>", self.val),
      _ if self.val.chars().count() > 10 => {
        let head: String = self.val.chars().take(10).collect();
        write!(f, "{:?}...", head)
      }
      _ => write!(f, "{:?}", self.val),
    }
  }
}

enum State {
  Text,
  Action,
  Done,
}

struct Lexer<'a> {
  input: &'a str,
  start: usize,
  pos: usize,
  items: Vec<Item>,
}

/// Lex `input` into items. The last item is always `Eof` or `Error`.
pub fn lex(input: &str) -> Vec<Item> {
  let mut lexer = Lexer {
    input,
    start: 0,
    pos: 0,
    items: Vec::new(),
  };

  let mut state = State::Text;
  loop {
    state = match state {
      State::Text => lexer.lex_text(),
      State::Action => lexer.lex_inside_action(),
      State::Done => break,
    };
  }
  lexer.items
}

/// 1-based line number of a byte offset.
pub fn line_at(input: &str, pos: usize) -> usize {
  1 + input[..pos.min(input.len())].matches('\n').count()
}

fn is_space(c: char) -> bool {
  matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn is_alphanumeric(c: char) -> bool {
  c == '_' || c.is_alphanumeric()
}

impl Lexer<'_> {
  fn rest(&self) -> &str {
    &self.input[self.pos..]
  }

  fn peek(&self) -> Option<char> {
    self.rest().chars().next()
  }

  fn next(&mut self) -> Option<char> {
    let c = self.peek()?;
    self.pos += c.len_utf8();
    Some(c)
  }

  fn backup(&mut self, c: char) {
    self.pos -= c.len_utf8();
  }

  fn emit(&mut self, kind: ItemKind) {
    self.items.push(Item {
      kind,
      val: self.input[self.start..self.pos].to_string(),
      pos: self.start,
      line: line_at(self.input, self.start),
    });
    self.start = self.pos;
  }

  fn ignore(&mut self) {
    self.start = self.pos;
  }

  fn error(&mut self, message: String) -> State {
    self.items.push(Item {
      kind: ItemKind::Error,
      val: message,
      pos: self.start,
      line: line_at(self.input, self.start),
    });
    State::Done
  }

  fn skip_whitespace(&mut self) {
    let trimmed = self.rest().trim_start_matches(is_space).len();
    self.pos = self.input.len() - trimmed;
    self.ignore();
  }

  fn lex_text(&mut self) -> State {
    let Some(offset) = self.rest().find(LEFT_DELIM) else {
      self.pos = self.input.len();
      if self.pos > self.start {
        self.emit(ItemKind::Text);
      }
      self.emit(ItemKind::Eof);
      return State::Done;
    };

    let delim = self.pos + offset;
    let trim = has_left_trim_marker(&self.input[delim + LEFT_DELIM.len()..]);
    let text_end = if trim {
      self.start + self.input[self.start..delim].trim_end_matches(is_space).len()
    } else {
      delim
    };

    self.pos = text_end;
    if self.pos > self.start {
      self.emit(ItemKind::Text);
    }
    self.pos = delim;
    self.ignore();
    self.lex_left_delim(trim)
  }

  fn lex_left_delim(&mut self, trim: bool) -> State {
    self.pos += LEFT_DELIM.len();
    let after_marker = if trim { 2 } else { 0 };

    if self.rest()[after_marker..].starts_with(LEFT_COMMENT) {
      self.pos += after_marker;
      self.ignore();
      return self.lex_comment();
    }

    self.emit(ItemKind::LeftDelim);
    self.pos += after_marker;
    self.ignore();
    State::Action
  }

  fn lex_comment(&mut self) -> State {
    self.pos += LEFT_COMMENT.len();
    let Some(end) = self.rest().find(RIGHT_COMMENT) else {
      return self.error("unclosed comment".to_string());
    };
    self.pos += end + RIGHT_COMMENT.len();

    let (at_delim, trim) = self.at_right_delim();
    if !at_delim {
      return self.error("comment ends before closing delimiter".to_string());
    }
    if trim {
      self.pos += 2;
    }
    self.pos += RIGHT_DELIM.len();
    self.ignore();
    if trim {
      self.skip_whitespace();
    }
    State::Text
  }

  /// Reports whether the input is at a closing delimiter, and whether that
  /// delimiter carries a trim marker (` -}}`).
  fn at_right_delim(&self) -> (bool, bool) {
    let rest = self.rest();
    if has_right_trim_marker(rest) && rest[2..].starts_with(RIGHT_DELIM) {
      return (true, true);
    }
    (rest.starts_with(RIGHT_DELIM), false)
  }

  fn lex_right_delim(&mut self, trim: bool) -> State {
    if trim {
      self.pos += 2;
      self.ignore();
    }
    self.pos += RIGHT_DELIM.len();
    self.emit(ItemKind::RightDelim);
    if trim {
      self.skip_whitespace();
    }
    State::Text
  }

  fn lex_inside_action(&mut self) -> State {
    let (at_delim, trim) = self.at_right_delim();
    if at_delim {
      return self.lex_right_delim(trim);
    }

    match self.next() {
      None => self.error("unclosed action".to_string()),
      Some(c) if is_space(c) => {
        self.backup(c);
        self.lex_space()
      }
      Some('"') => self.lex_quote(),
      Some('`') => self.lex_raw_quote(),
      Some('.') => match self.peek() {
        Some(c) if c.is_ascii_digit() => {
          self.backup('.');
          self.lex_number()
        }
        _ => self.lex_field(),
      },
      Some('|') => {
        self.emit(ItemKind::Pipe);
        State::Action
      }
      Some(c) if c == '+' || c == '-' || c.is_ascii_digit() => {
        self.backup(c);
        self.lex_number()
      }
      Some(c) if is_alphanumeric(c) => {
        self.backup(c);
        self.lex_identifier()
      }
      Some(c) if c.is_ascii() && !c.is_ascii_control() => {
        self.emit(ItemKind::Char);
        State::Action
      }
      Some(c) => self.error(format!("unrecognized character in action: {}", describe_char(c))),
    }
  }

  fn lex_space(&mut self) -> State {
    let mut count = 0;
    while let Some(c) = self.peek() {
      if !is_space(c) {
        break;
      }
      self.next();
      count += 1;
    }

    // A space followed by "-}}" belongs to the trim-marked delimiter.
    let before = self.pos - 1;
    if has_right_trim_marker(&self.input[before..]) && self.input[before + 2..].starts_with(RIGHT_DELIM) {
      self.pos = before;
      if count == 1 {
        return State::Action;
      }
    }
    self.emit(ItemKind::Space);
    State::Action
  }

  fn lex_field(&mut self) -> State {
    if self.at_terminator() {
      self.emit(ItemKind::Dot);
      return State::Action;
    }
    if let Some(c) = self.scan_alphanumeric() {
      if !self.at_terminator() {
        return self.error(format!("bad character {}", describe_char(c)));
      }
    }
    self.emit(ItemKind::Field);
    State::Action
  }

  fn lex_identifier(&mut self) -> State {
    if let Some(c) = self.scan_alphanumeric() {
      if !self.at_terminator() {
        return self.error(format!("bad character {}", describe_char(c)));
      }
    }
    let kind = match &self.input[self.start..self.pos] {
      "true" | "false" => ItemKind::Bool,
      _ => ItemKind::Identifier,
    };
    self.emit(kind);
    State::Action
  }

  /// Consume alphanumerics and return the character that stopped the scan.
  fn scan_alphanumeric(&mut self) -> Option<char> {
    while let Some(c) = self.peek() {
      if !is_alphanumeric(c) {
        return Some(c);
      }
      self.next();
    }
    None
  }

  fn at_terminator(&self) -> bool {
    match self.peek() {
      None => true,
      Some(c) => is_space(c) || matches!(c, '.' | ',' | '|' | ':' | ')' | '(') || RIGHT_DELIM.starts_with(c),
    }
  }

  fn lex_number(&mut self) -> State {
    if matches!(self.peek(), Some('+' | '-')) {
      self.next();
    }
    while let Some(c) = self.peek() {
      if !(c.is_ascii_alphanumeric() || c == '.' || c == '_') {
        break;
      }
      self.next();
    }
    let text = &self.input[self.start..self.pos];
    let digits = text.trim_start_matches(['+', '-']).replace('_', "");
    let valid = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
      Some(hex) => i64::from_str_radix(hex, 16).is_ok(),
      None => digits.parse::<f64>().is_ok(),
    };
    if !valid {
      return self.error(format!("bad number syntax: {:?}", text));
    }
    self.emit(ItemKind::Number);
    State::Action
  }

  fn lex_quote(&mut self) -> State {
    loop {
      match self.next() {
        Some('\\') => match self.next() {
          None | Some('\n') => return self.error("unterminated quoted string".to_string()),
          Some(_) => {}
        },
        None | Some('\n') => return self.error("unterminated quoted string".to_string()),
        Some('"') => break,
        Some(_) => {}
      }
    }
    self.emit(ItemKind::String);
    State::Action
  }

  fn lex_raw_quote(&mut self) -> State {
    let Some(end) = self.rest().find('`') else {
      return self.error("unterminated raw quoted string".to_string());
    };
    self.pos += end + 1;
    self.emit(ItemKind::RawString);
    State::Action
  }
}

fn has_left_trim_marker(s: &str) -> bool {
  let mut chars = s.chars();
  chars.next() == Some(TRIM_MARKER) && chars.next().is_some_and(is_space)
}

fn has_right_trim_marker(s: &str) -> bool {
  let mut chars = s.chars();
  chars.next().is_some_and(|c| c == ' ' || c == '\t' || c == '\r' || c == '\n') && chars.next() == Some(TRIM_MARKER)
}

/// `U+007D '}'`
fn describe_char(c: char) -> String {
  format!("U+{:04X} '{}'", c as u32, c)
}

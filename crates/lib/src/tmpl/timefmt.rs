//! Formatting with Go reference layouts (`2006-01-02T15:04:05Z07:00`).
//!
//! Times are always UTC, so zone tokens render as fixed strings.

use chrono::{DateTime, Datelike, Timelike, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chunk {
  LongMonth,
  Month,
  NumMonth,
  ZeroMonth,
  LongWeekDay,
  WeekDay,
  Day,
  UnderDay,
  ZeroDay,
  UnderYearDay,
  ZeroYearDay,
  Hour,
  Hour12,
  ZeroHour12,
  Minute,
  ZeroMinute,
  Second,
  ZeroSecond,
  LongYear,
  Year,
  UpperPm,
  LowerPm,
  Zone(&'static str),
  Fraction { sep: char, digits: usize, trim: bool },
}

/// Format `now` using a Go layout string.
pub fn format(now: &DateTime<Utc>, layout: &str) -> String {
  let mut out = String::with_capacity(layout.len() + 8);
  let mut rest = layout;

  while let Some(c) = rest.chars().next() {
    match next_chunk(rest) {
      Some((chunk, len)) => {
        write_chunk(&mut out, now, chunk);
        rest = &rest[len..];
      }
      None => {
        out.push(c);
        rest = &rest[c.len_utf8()..];
      }
    }
  }
  out
}

fn lower_at(s: &str, i: usize) -> bool {
  s.as_bytes().get(i).is_some_and(u8::is_ascii_lowercase)
}

/// The layout token at the start of `s`, with its byte length.
fn next_chunk(s: &str) -> Option<(Chunk, usize)> {
  let b = s.as_bytes();
  let at = |p: &str| s.starts_with(p);

  let chunk = match b[0] {
    b'J' if at("January") => (Chunk::LongMonth, 7),
    b'J' if at("Jan") && !lower_at(s, 3) => (Chunk::Month, 3),
    b'M' if at("Monday") => (Chunk::LongWeekDay, 6),
    b'M' if at("Mon") && !lower_at(s, 3) => (Chunk::WeekDay, 3),
    b'M' if at("MST") => (Chunk::Zone("UTC"), 3),
    b'0' if at("002") => (Chunk::ZeroYearDay, 3),
    b'0' => match b.get(1) {
      Some(b'1') => (Chunk::ZeroMonth, 2),
      Some(b'2') => (Chunk::ZeroDay, 2),
      Some(b'3') => (Chunk::ZeroHour12, 2),
      Some(b'4') => (Chunk::ZeroMinute, 2),
      Some(b'5') => (Chunk::ZeroSecond, 2),
      Some(b'6') => (Chunk::Year, 2),
      _ => return None,
    },
    b'1' if at("15") => (Chunk::Hour, 2),
    b'1' => (Chunk::NumMonth, 1),
    b'2' if at("2006") => (Chunk::LongYear, 4),
    b'2' => (Chunk::Day, 1),
    b'_' if at("__2") => (Chunk::UnderYearDay, 3),
    b'_' if at("_2") && !at("_2006") => (Chunk::UnderDay, 2),
    b'3' => (Chunk::Hour12, 1),
    b'4' => (Chunk::Minute, 1),
    b'5' => (Chunk::Second, 1),
    b'P' if at("PM") => (Chunk::UpperPm, 2),
    b'p' if at("pm") => (Chunk::LowerPm, 2),
    b'-' if at("-07:00:00") => (Chunk::Zone("+00:00:00"), 9),
    b'-' if at("-070000") => (Chunk::Zone("+000000"), 7),
    b'-' if at("-07:00") => (Chunk::Zone("+00:00"), 6),
    b'-' if at("-0700") => (Chunk::Zone("+0000"), 5),
    b'-' if at("-07") => (Chunk::Zone("+00"), 3),
    b'Z' if at("Z07:00:00") => (Chunk::Zone("Z"), 9),
    b'Z' if at("Z070000") => (Chunk::Zone("Z"), 7),
    b'Z' if at("Z07:00") => (Chunk::Zone("Z"), 6),
    b'Z' if at("Z0700") => (Chunk::Zone("Z"), 5),
    b'Z' if at("Z07") => (Chunk::Zone("Z"), 3),
    b'.' | b',' if matches!(b.get(1), Some(b'0' | b'9')) => {
      let digit = b[1];
      let end = b[1..].iter().position(|&c| c != digit).map_or(b.len(), |p| p + 1);
      if b.get(end).is_some_and(u8::is_ascii_digit) {
        return None;
      }
      let chunk = Chunk::Fraction {
        sep: b[0] as char,
        digits: end - 1,
        trim: digit == b'9',
      };
      (chunk, end)
    }
    _ => return None,
  };
  Some(chunk)
}

fn write_chunk(out: &mut String, now: &DateTime<Utc>, chunk: Chunk) {
  let hour12 = match now.hour() % 12 {
    0 => 12,
    h => h,
  };
  let text = match chunk {
    Chunk::LongMonth => now.format("%B").to_string(),
    Chunk::Month => now.format("%b").to_string(),
    Chunk::NumMonth => now.month().to_string(),
    Chunk::ZeroMonth => format!("{:02}", now.month()),
    Chunk::LongWeekDay => now.format("%A").to_string(),
    Chunk::WeekDay => now.format("%a").to_string(),
    Chunk::Day => now.day().to_string(),
    Chunk::UnderDay => format!("{:>2}", now.day()),
    Chunk::ZeroDay => format!("{:02}", now.day()),
    Chunk::UnderYearDay => format!("{:>3}", now.ordinal()),
    Chunk::ZeroYearDay => format!("{:03}", now.ordinal()),
    Chunk::Hour => format!("{:02}", now.hour()),
    Chunk::Hour12 => hour12.to_string(),
    Chunk::ZeroHour12 => format!("{hour12:02}"),
    Chunk::Minute => now.minute().to_string(),
    Chunk::ZeroMinute => format!("{:02}", now.minute()),
    Chunk::Second => now.second().to_string(),
    Chunk::ZeroSecond => format!("{:02}", now.second()),
    Chunk::LongYear => format!("{:04}", now.year()),
    Chunk::Year => format!("{:02}", now.year().rem_euclid(100)),
    Chunk::UpperPm => (if now.hour() >= 12 { "PM" } else { "AM" }).to_string(),
    Chunk::LowerPm => (if now.hour() >= 12 { "pm" } else { "am" }).to_string(),
    Chunk::Zone(zone) => zone.to_string(),
    Chunk::Fraction { sep, digits, trim } => fraction(now.nanosecond() % 1_000_000_000, sep, digits, trim),
  };
  out.push_str(&text);
}

fn fraction(nanos: u32, sep: char, digits: usize, trim: bool) -> String {
  let all = format!("{nanos:09}");
  let mut kept = &all[..digits.min(9)];
  if trim {
    kept = kept.trim_end_matches('0');
    if kept.is_empty() {
      return String::new();
    }
  }
  format!("{sep}{kept}")
}

use std::fmt;
use std::str::FromStr;

/// Target operating systems, named the way the Go toolchain names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Os {
  Aix,
  Android,
  Darwin,
  Dragonfly,
  Freebsd,
  Illumos,
  Js,
  Linux,
  Netbsd,
  Openbsd,
  Plan9,
  Solaris,
  Windows,
}

impl Os {
  /// Detect the host operating system.
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "macos" => Some(Self::Darwin),
      other => other.parse().ok(),
    }
  }

  /// Returns the `GOOS` identifier for this OS
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Aix => "aix",
      Self::Android => "android",
      Self::Darwin => "darwin",
      Self::Dragonfly => "dragonfly",
      Self::Freebsd => "freebsd",
      Self::Illumos => "illumos",
      Self::Js => "js",
      Self::Linux => "linux",
      Self::Netbsd => "netbsd",
      Self::Openbsd => "openbsd",
      Self::Plan9 => "plan9",
      Self::Solaris => "solaris",
      Self::Windows => "windows",
    }
  }
}

impl FromStr for Os {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(match s {
      "aix" => Self::Aix,
      "android" => Self::Android,
      "darwin" => Self::Darwin,
      "dragonfly" => Self::Dragonfly,
      "freebsd" => Self::Freebsd,
      "illumos" => Self::Illumos,
      "js" => Self::Js,
      "linux" => Self::Linux,
      "netbsd" => Self::Netbsd,
      "openbsd" => Self::Openbsd,
      "plan9" => Self::Plan9,
      "solaris" => Self::Solaris,
      "windows" => Self::Windows,
      _ => return Err(()),
    })
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

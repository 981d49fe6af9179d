/// Project file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = ".crossbuild.yml";

pub const DEFAULT_DIST: &str = "dist";
pub const DEFAULT_MAIN: &str = ".";
pub const DEFAULT_GO_BINARY: &str = "go";

pub const DEFAULT_LDFLAGS: &str =
  "-s -w -X main.version={{.Version}} -X main.commit={{.Commit}} -X main.date={{.Date}} -X main.builtBy=crossbuild";

/// Tag exposed to templates when the repository has none.
pub const FALLBACK_TAG: &str = "v0.0.0";

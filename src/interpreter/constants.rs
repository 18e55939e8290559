// Constants for the command-language interpreter

/// Value of the predefined `version` variable:
/// `MAJOR * 10000 + MINOR * 100 + PATCH` of the crate version.
pub const VERSION: i64 = 100;

/// Default maximum nesting depth for recursive evaluation (`[...]`
/// substitution, `eval`, procedure bodies).
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Default maximum number of words in one command.
pub const DEFAULT_MAX_ARGS: usize = 128;

/// Default advisory maximum result-string length, reported by
/// `info limits string`.
pub const DEFAULT_MAX_STRING: usize = 1024 * 1024;

/// Upper bound on variable link chains followed during resolution. Links are
/// collapsed to the concrete cell on creation, so a longer chain indicates a
/// corrupted environment.
pub const LINK_CHAIN_LIMIT: usize = 64;

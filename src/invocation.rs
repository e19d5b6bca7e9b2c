//! Run options and the invocation triple handed between the rewriter and the
//! process launch boundary.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

/// Bit-set of independent run flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RunOptions(u32);

impl RunOptions {
	pub const NONE: Self = Self(0);
	pub const ALLOW_SPEW: Self = Self(1 << 0);
	pub const APP_MUST_EXIST: Self = Self(1 << 1);
	pub const NO_WAIT_FOR_EXIT: Self = Self(1 << 2);
	pub const NO_STDOUT_REDIRECT: Self = Self(1 << 3);
	pub const NO_LOGGING_OF_RUN_COMMAND: Self = Self(1 << 4);
	pub const UTF8_OUTPUT: Self = Self(1 << 5);
	pub const SPEW_IS_VERBOSE: Self = Self(1 << 6);
	pub const NO_LOGGING_OF_RUN_DURATION: Self = Self(1 << 7);
	pub const ALLOW_MISSING_STDIN: Self = Self(1 << 8);

	pub const DEFAULT: Self = Self(Self::ALLOW_SPEW.0 | Self::APP_MUST_EXIST.0);

	/// Every named flag, in bit order.
	const NAMED: [(&'static str, RunOptions); 9] = [
		("allow-spew", Self::ALLOW_SPEW),
		("app-must-exist", Self::APP_MUST_EXIST),
		("no-wait-for-exit", Self::NO_WAIT_FOR_EXIT),
		("no-stdout-redirect", Self::NO_STDOUT_REDIRECT),
		("no-logging-of-run-command", Self::NO_LOGGING_OF_RUN_COMMAND),
		("utf8-output", Self::UTF8_OUTPUT),
		("spew-is-verbose", Self::SPEW_IS_VERBOSE),
		("no-logging-of-run-duration", Self::NO_LOGGING_OF_RUN_DURATION),
		("allow-missing-stdin", Self::ALLOW_MISSING_STDIN),
	];

	pub const fn is_empty(self) -> bool {
		self.0 == 0
	}

	pub const fn contains(self, other: Self) -> bool {
		self.0 & other.0 == other.0
	}

	pub fn remove(&mut self, other: Self) {
		self.0 &= !other.0;
	}

	/// Names of the flags set, in bit order.
	pub fn names(self) -> impl Iterator<Item = &'static str> {
		Self::NAMED
			.into_iter()
			.filter(move |(_, flag)| self.contains(*flag))
			.map(|(name, _)| name)
	}
}

impl BitOr for RunOptions {
	type Output = Self;

	fn bitor(self, rhs: Self) -> Self {
		Self(self.0 | rhs.0)
	}
}

impl fmt::Display for RunOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_empty() {
			return f.write_str("none");
		}
		let names: Vec<_> = self.names().collect();
		f.write_str(&names.join("|"))
	}
}

impl FromStr for RunOptions {
	type Err = String;

	/// Parse a single flag name such as `app-must-exist`, or `none`/`default`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let name = s.trim().to_ascii_lowercase().replace('_', "-");
		match name.as_str() {
			"none" => return Ok(Self::NONE),
			"default" => return Ok(Self::DEFAULT),
			_ => {}
		}
		Self::NAMED
			.iter()
			.find(|(flag_name, _)| *flag_name == name)
			.map(|(_, flag)| *flag)
			.ok_or_else(|| format!("unknown run option: {s}"))
	}
}

/// A command to run: executable, raw argument string and run options.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Invocation {
	/// Executable name or path, as requested by the caller.
	pub executable: String,

	/// Raw command-line argument string. May be empty.
	pub arguments: String,

	/// Run options for this invocation.
	pub options: RunOptions,
}

impl Invocation {
	pub fn new(
		executable: impl Into<String>,
		arguments: impl Into<String>,
		options: RunOptions,
	) -> Self {
		Self {
			executable: executable.into(),
			arguments: arguments.into(),
			options,
		}
	}

	/// Append `extra` to the argument string, separated by a single space.
	pub(crate) fn append_arguments(&mut self, extra: &str) {
		if extra.is_empty() {
			return;
		}
		if !self.arguments.is_empty() {
			self.arguments.push(' ');
		}
		self.arguments.push_str(extra);
	}
}

impl fmt::Display for Invocation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.arguments.is_empty() {
			f.write_str(&self.executable)
		} else {
			write!(f, "{} {}", self.executable, self.arguments)
		}
	}
}

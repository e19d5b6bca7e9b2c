use crate::error::{HostrunError, Result};
use std::fmt;
use std::str::FromStr;

/// The operating-system host the automation tool is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostKind {
	Windows,
	MacOS,
	Linux,
}

impl HostKind {
	/// Every supported host kind.
	pub const ALL: [HostKind; 3] = [HostKind::Windows, HostKind::MacOS, HostKind::Linux];

	/// Canonical lowercase name, as accepted by `--host` and the `host` config key.
	pub fn as_str(&self) -> &'static str {
		match self {
			HostKind::Windows => "windows",
			HostKind::MacOS => "macos",
			HostKind::Linux => "linux",
		}
	}

	/// Map an operating-system identifier (the values of `std::env::consts::OS`)
	/// to a host kind.
	///
	/// The identifier is supplied by the caller; nothing here inspects the
	/// running environment.
	pub fn from_os(os: &str) -> Result<HostKind> {
		match os {
			"windows" => Ok(HostKind::Windows),
			"macos" => Ok(HostKind::MacOS),
			"linux" => Ok(HostKind::Linux),
			other => Err(HostrunError::UnrecognizedOs {
				os: other.to_string(),
			}),
		}
	}
}

impl fmt::Display for HostKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for HostKind {
	type Err = HostrunError;

	fn from_str(s: &str) -> Result<Self> {
		match s.trim().to_ascii_lowercase().as_str() {
			"windows" | "win64" | "win" => Ok(HostKind::Windows),
			"macos" | "mac" | "darwin" => Ok(HostKind::MacOS),
			"linux" => Ok(HostKind::Linux),
			_ => Err(HostrunError::UnknownHostKind {
				name: s.to_string(),
			}),
		}
	}
}

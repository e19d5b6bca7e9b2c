use std::path::PathBuf;

use crate::host::HostKind;

/// Library-level structured errors for hostrun.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum HostrunError {
	#[error("No host descriptor registered for host kind: {kind}")]
	UnsupportedHost { kind: HostKind },

	#[error("Unknown host kind: {name}")]
	UnknownHostKind { name: String },

	#[error("Unable to identify host from operating system: {os}")]
	UnrecognizedOs { os: String },

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}")]
	ConfigParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Invalid regex pattern in rule: {pattern}")]
	InvalidRegex {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("Invalid substitution '{input}': {reason}")]
	InvalidSubstitution { input: String, reason: String },

	#[error("Rule #{index} in {path} has no rewrite action")]
	RuleWithoutAction { path: PathBuf, index: usize },

	#[error("Malformed argument string: {arguments}")]
	MalformedArguments { arguments: String },

	#[error("Command execution failed: {command}")]
	CommandFailed {
		command: String,
		#[source]
		source: std::io::Error,
	},

	#[error("Command not found: {command}")]
	CommandNotFound { command: String },

	#[error("Failed to register interrupt handler")]
	CtrlHandlerFailed {
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,
}

/// Result type alias using HostrunError.
pub type Result<T> = std::result::Result<T, HostrunError>;

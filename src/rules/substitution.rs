use crate::error::{HostrunError, Result};
use regex::Regex;

/// Parsed substitution command (sed-like syntax).
#[derive(Debug, Clone)]
pub struct Substitution {
	/// The pattern to match.
	pub pattern: Regex,

	/// The replacement string.
	pub replacement: String,

	/// Whether to replace all occurrences (global flag).
	pub global: bool,
}

impl Substitution {
	/// Parse a substitution string in sed-like format: "s/pattern/replacement/" or "s/pattern/replacement/g"
	pub fn parse(input: &str) -> Result<Self> {
		let invalid = |reason: &str| HostrunError::InvalidSubstitution {
			input: input.to_string(),
			reason: reason.to_string(),
		};

		let mut chars = input.chars();
		if chars.next() != Some('s') {
			return Err(invalid("substitution must start with 's'"));
		}
		let delimiter = chars.next().ok_or_else(|| invalid("substitution too short"))?;

		let parts = split_by_delimiter(chars.as_str(), delimiter);
		if parts.len() < 2 {
			return Err(invalid("substitution must have pattern and replacement"));
		}

		let pattern_str = &parts[0];
		let replacement = parts[1].clone();
		let flags = parts.get(2).map(String::as_str).unwrap_or("");
		if let Some(flag) = flags.chars().find(|c| *c != 'g') {
			return Err(invalid(&format!("unsupported flag '{flag}'")));
		}

		let pattern = Regex::new(pattern_str).map_err(|source| HostrunError::InvalidRegex {
			pattern: pattern_str.to_string(),
			source,
		})?;

		Ok(Substitution {
			pattern,
			replacement,
			global: flags.contains('g'),
		})
	}

	/// Apply this substitution to a string.
	pub fn apply(&self, input: &str) -> String {
		if self.global {
			self.pattern
				.replace_all(input, &self.replacement)
				.to_string()
		} else {
			self.pattern.replace(input, &self.replacement).to_string()
		}
	}
}

/// Split a string by a delimiter, respecting backslash escapes of the delimiter.
fn split_by_delimiter(input: &str, delimiter: char) -> Vec<String> {
	let mut parts = Vec::new();
	let mut current = String::new();
	let mut chars = input.chars().peekable();

	while let Some(c) = chars.next() {
		if c == '\\' && chars.peek() == Some(&delimiter) {
			current.push(delimiter);
			chars.next();
		} else if c == delimiter {
			parts.push(std::mem::take(&mut current));
		} else {
			current.push(c);
		}
	}

	// Trailing text after the last delimiter holds the flags
	parts.push(current);
	parts
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_simple_substitution() {
		let sub = Substitution::parse("s/foo/bar/").unwrap();
		assert_eq!(sub.replacement, "bar");
		assert!(!sub.global);
	}

	#[test]
	fn test_parse_global_substitution() {
		let sub = Substitution::parse("s/foo/bar/g").unwrap();
		assert!(sub.global);
	}

	#[test]
	fn test_parse_different_delimiter() {
		let sub = Substitution::parse("s#/Binaries/Win64/#/Binaries/Linux/#").unwrap();
		assert_eq!(
			sub.apply("/ue/Engine/Binaries/Win64/Tool"),
			"/ue/Engine/Binaries/Linux/Tool"
		);
	}

	#[test]
	fn test_parse_escaped_delimiter() {
		let sub = Substitution::parse(r"s/foo\/bar/baz/").unwrap();
		assert_eq!(sub.apply("foo/bar"), "baz");
	}

	#[test]
	fn test_apply_non_global_substitution() {
		let sub = Substitution::parse("s/foo/bar/").unwrap();
		assert_eq!(sub.apply("foo foo foo"), "bar foo foo");
	}

	#[test]
	fn test_apply_global_with_capture_groups() {
		let sub = Substitution::parse(r"s/-(\w+)/--$1/g").unwrap();
		assert_eq!(sub.apply("-run -nop4"), "--run --nop4");
	}

	#[test]
	fn test_invalid_substitution_no_s() {
		assert!(matches!(
			Substitution::parse("foo/bar/"),
			Err(HostrunError::InvalidSubstitution { .. })
		));
	}

	#[test]
	fn test_invalid_substitution_too_short() {
		assert!(Substitution::parse("s").is_err());
		assert!(Substitution::parse("s/foo").is_err());
	}

	#[test]
	fn test_invalid_flag() {
		assert!(Substitution::parse("s/foo/bar/x").is_err());
	}

	#[test]
	fn test_invalid_regex() {
		assert!(matches!(
			Substitution::parse("s/[oops/bar/"),
			Err(HostrunError::InvalidRegex { .. })
		));
	}
}

use crate::config::types::Config;
use crate::error::{HostrunError, Result};
use std::path::Path;

/// Parse a config file from the given path.
pub fn parse_config_file(path: &Path) -> Result<Config> {
	let content = std::fs::read_to_string(path).map_err(|source| HostrunError::ConfigReadError {
		path: path.to_path_buf(),
		source,
	})?;

	parse_config_str(&content, path)
}

/// Parse a config from a string (useful for testing).
pub fn parse_config_str(content: &str, path: &Path) -> Result<Config> {
	let config: Config =
		toml::from_str(content).map_err(|source| HostrunError::ConfigParseError {
			path: path.to_path_buf(),
			source,
		})?;

	config.validate(path)?;

	Ok(config)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::host::HostKind;
	use std::path::PathBuf;

	#[test]
	fn test_parse_empty_config() {
		let path = PathBuf::from("test.toml");
		let config = parse_config_str("", &path).unwrap();

		assert!(!config.root);
		assert!(config.root_config_lookup_disable_env_var.is_none());
		assert!(config.host.is_none());
		assert!(config.local_root.is_none());
		assert!(config.protected_processes.is_empty());
		assert!(config.rules.is_empty());
	}

	#[test]
	fn test_parse_basic_config() {
		let content = r#"
root = true
root-config-lookup-disable-env-var = "CI"
host = "Linux"
local-root = "../UnrealEngine"
protected-processes = ["buildkite-agent", "sccache"]
"#;
		let path = PathBuf::from("test.toml");
		let config = parse_config_str(content, &path).unwrap();

		assert!(config.root);
		assert_eq!(
			config.root_config_lookup_disable_env_var,
			Some("CI".to_string())
		);
		assert_eq!(config.host_kind().unwrap(), Some(HostKind::Linux));
		assert_eq!(config.local_root, Some(PathBuf::from("../UnrealEngine")));
		assert_eq!(config.protected_processes, vec!["buildkite-agent", "sccache"]);
	}

	#[test]
	fn test_parse_rules_array_of_tables() {
		let content = r#"
[[rules]]
host = "linux"
executable_pattern = "^p4$"
executable_rewrite = "s#^p4$#/opt/perforce/bin/p4#"

[[rules]]
executable_pattern = "^python3?$"
relax_must_exist = true
"#;
		let path = PathBuf::from("test.toml");
		let config = parse_config_str(content, &path).unwrap();

		assert_eq!(config.rules.len(), 2);

		let rule1 = &config.rules[0];
		assert_eq!(rule1.host, Some("linux".to_string()));
		assert_eq!(rule1.executable_pattern, Some("^p4$".to_string()));
		assert!(!rule1.relax_must_exist);

		let rule2 = &config.rules[1];
		assert!(rule2.host.is_none());
		assert!(rule2.relax_must_exist);
	}

	#[test]
	fn test_parse_rules_inline_tables() {
		let content = r#"
rules = [
    { executable_pattern = "^git$", arg_rewrite = "s/^/--no-pager /" },
    { executable_pattern = "^hg$", relax_must_exist = true },
]
"#;
		let path = PathBuf::from("test.toml");
		let config = parse_config_str(content, &path).unwrap();

		assert_eq!(config.rules.len(), 2);
	}

	#[test]
	fn test_rule_without_action_rejected() {
		let content = r#"
[[rules]]
executable_pattern = "^git$"
"#;
		let path = PathBuf::from("test.toml");
		match parse_config_str(content, &path).unwrap_err() {
			HostrunError::RuleWithoutAction { path, index } => {
				assert_eq!(path, PathBuf::from("test.toml"));
				assert_eq!(index, 1);
			}
			other => panic!("Expected RuleWithoutAction error, got {other:?}"),
		}
	}

	#[test]
	fn test_unknown_host_rejected() {
		let path = PathBuf::from("test.toml");
		let result = parse_config_str("host = \"plan9\"", &path);
		assert!(matches!(result, Err(HostrunError::UnknownHostKind { .. })));
	}

	#[test]
	fn test_malformed_toml_rejected() {
		let path = PathBuf::from("test.toml");
		let result = parse_config_str("root = ", &path);
		assert!(matches!(result, Err(HostrunError::ConfigParseError { .. })));
	}
}

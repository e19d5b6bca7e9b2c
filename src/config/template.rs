/// Starter `.hostrun.toml` written by `hostrun --init`.
pub fn init_template() -> &'static str {
	r#"# hostrun configuration
# Files are discovered from the working directory upwards, then ~/.hostrun.toml.

# Stop the directory cascade here (the user config is still read).
root = true

# Skip ~/.hostrun.toml when this environment variable is truthy.
# root-config-lookup-disable-env-var = "CI"

# Act as this host instead of the running one: windows, macos or linux.
# host = "linux"

# Installation root; relative paths resolve against this file's directory.
local-root = "."

# Extra process names cleanup must never terminate.
protected-processes = []

# Configured rules run after the built-in host rules. First match wins.
[[rules]]
host = "linux"
executable_pattern = "^p4$"
executable_rewrite = "s#^p4$#/usr/bin/p4#"
relax_must_exist = true
"#
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::parser::parse_config_str;
	use std::path::PathBuf;

	#[test]
	fn test_template_parses() {
		let config = parse_config_str(init_template(), &PathBuf::from(".hostrun.toml")).unwrap();
		assert!(config.root);
		assert_eq!(config.local_root, Some(PathBuf::from(".")));
		assert_eq!(config.rules.len(), 1);
	}
}

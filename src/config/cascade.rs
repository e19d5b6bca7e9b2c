use crate::config::parser::parse_config_file;
use crate::config::types::{LoadedConfig, MergedConfig, RuleWithSource};
use crate::error::{HostrunError, Result};
use crate::host::UserFolders;
use log::debug;
use std::path::{Path, PathBuf};

/// File name looked up in every directory of the cascade.
pub const CONFIG_FILE_NAME: &str = ".hostrun.toml";

/// Discover and load all config files in the cascade.
///
/// The cascade order is:
/// 1. Start from `start_dir` and look for `.hostrun.toml`
/// 2. If found and `root = true`, skip to user config only
/// 3. Otherwise, continue up the directory tree
/// 4. Finally, check ~/.hostrun.toml (unless disabled)
///
/// Returns configs in cascade order (most specific first).
pub fn discover_configs(start_dir: &Path) -> Result<Vec<LoadedConfig>> {
	let mut configs = Vec::new();
	let mut current_dir = start_dir.to_path_buf();

	loop {
		let config_path = current_dir.join(CONFIG_FILE_NAME);

		if config_path.is_file() {
			debug!("Loading config {}", config_path.display());
			let config = parse_config_file(&config_path)?;
			let is_root = config.root;

			configs.push(LoadedConfig {
				config,
				path: config_path,
			});

			if is_root {
				break;
			}
		}

		match current_dir.parent() {
			Some(parent) => current_dir = parent.to_path_buf(),
			None => break,
		}
	}

	if let Some(user_config) = load_user_config(&configs)? {
		configs.push(user_config);
	}

	Ok(configs)
}

/// Load the user's ~/.hostrun.toml if it exists and isn't disabled.
fn load_user_config(existing_configs: &[LoadedConfig]) -> Result<Option<LoadedConfig>> {
	for loaded in existing_configs {
		if let Some(ref env_var) = loaded.config.root_config_lookup_disable_env_var
			&& is_env_truthy(env_var)
		{
			debug!("User config lookup disabled by {env_var}");
			return Ok(None);
		}
	}

	let user_config_path = user_config_path()?;

	// Already loaded when the cascade walked through the home directory
	if existing_configs.iter().any(|c| c.path == user_config_path) {
		return Ok(None);
	}

	if user_config_path.is_file() {
		let config = parse_config_file(&user_config_path)?;
		Ok(Some(LoadedConfig {
			config,
			path: user_config_path,
		}))
	} else {
		Ok(None)
	}
}

/// Check if an environment variable is set to a truthy value.
fn is_env_truthy(var_name: &str) -> bool {
	match std::env::var(var_name) {
		Ok(value) => {
			let lower = value.to_lowercase();
			!value.is_empty() && lower != "0" && lower != "false" && lower != "no"
		}
		Err(_) => false,
	}
}

/// Merge multiple configs into a single effective config.
///
/// Scalars come from the most specific config that sets them; lists are
/// concatenated in cascade order.
pub fn merge_configs(configs: &[LoadedConfig]) -> Result<MergedConfig> {
	let mut merged = MergedConfig::default();

	for loaded in configs {
		if merged.host.is_none() {
			merged.host = loaded.config.host_kind()?;
		}

		if merged.local_root.is_none()
			&& let Some(ref root) = loaded.config.local_root
		{
			let base = loaded.path.parent().unwrap_or(Path::new(""));
			merged.local_root = Some(base.join(root));
		}

		merged
			.protected_processes
			.extend(loaded.config.protected_processes.iter().cloned());

		for rule in &loaded.config.rules {
			merged.rules.push(RuleWithSource {
				rule: rule.clone(),
				source: loaded.path.clone(),
			});
		}
	}

	Ok(merged)
}

/// Convenience function to discover, load, and merge configs from a directory.
pub fn load_merged_config(start_dir: &Path) -> Result<MergedConfig> {
	let configs = discover_configs(start_dir)?;
	merge_configs(&configs)
}

/// Get the path to the user's config file.
pub fn user_config_path() -> Result<PathBuf> {
	let home_dir = dirs::home_dir().ok_or(HostrunError::HomeDirectoryNotFound)?;
	Ok(home_dir.join(CONFIG_FILE_NAME))
}

/// Resolve the current user's home and documents folders.
///
/// The documents folder falls back to the home folder where the platform
/// has no separate one.
pub fn detect_user_folders() -> Result<UserFolders> {
	let home = dirs::home_dir().ok_or(HostrunError::HomeDirectoryNotFound)?;
	let documents = dirs::document_dir().unwrap_or_else(|| home.clone());
	Ok(UserFolders::new(home, documents))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::parser::parse_config_str;
	use crate::host::HostKind;

	fn loaded(content: &str, path: &str) -> LoadedConfig {
		let path = PathBuf::from(path);
		LoadedConfig {
			config: parse_config_str(content, &path).unwrap(),
			path,
		}
	}

	#[test]
	fn test_is_env_truthy() {
		// SAFETY: These env var operations are safe in single-threaded test context
		unsafe {
			std::env::remove_var("TEST_HOSTRUN_ENV_1");
			assert!(!is_env_truthy("TEST_HOSTRUN_ENV_1"));

			std::env::set_var("TEST_HOSTRUN_ENV_2", "");
			assert!(!is_env_truthy("TEST_HOSTRUN_ENV_2"));

			std::env::set_var("TEST_HOSTRUN_ENV_3", "FALSE");
			assert!(!is_env_truthy("TEST_HOSTRUN_ENV_3"));

			std::env::set_var("TEST_HOSTRUN_ENV_4", "no");
			assert!(!is_env_truthy("TEST_HOSTRUN_ENV_4"));

			std::env::set_var("TEST_HOSTRUN_ENV_5", "1");
			assert!(is_env_truthy("TEST_HOSTRUN_ENV_5"));

			std::env::set_var("TEST_HOSTRUN_ENV_6", "yes");
			assert!(is_env_truthy("TEST_HOSTRUN_ENV_6"));

			for i in 1..=6 {
				std::env::remove_var(format!("TEST_HOSTRUN_ENV_{i}"));
			}
		}
	}

	#[test]
	fn test_merge_most_specific_scalar_wins() {
		let configs = vec![
			loaded("host = \"linux\"", "/work/project/.hostrun.toml"),
			loaded(
				"host = \"windows\"\nlocal-root = \"engine\"",
				"/work/.hostrun.toml",
			),
		];
		let merged = merge_configs(&configs).unwrap();

		assert_eq!(merged.host, Some(HostKind::Linux));
		assert_eq!(merged.local_root, Some(PathBuf::from("/work/engine")));
	}

	#[test]
	fn test_merge_absolute_local_root_kept() {
		let configs = vec![loaded(
			"local-root = \"/opt/ue\"",
			"/work/project/.hostrun.toml",
		)];
		let merged = merge_configs(&configs).unwrap();
		assert_eq!(merged.local_root, Some(PathBuf::from("/opt/ue")));
	}

	#[test]
	fn test_merge_concatenates_lists_in_cascade_order() {
		let configs = vec![
			loaded(
				"protected-processes = [\"a\"]\n[[rules]]\nrelax_must_exist = true",
				"/work/project/.hostrun.toml",
			),
			loaded(
				"protected-processes = [\"b\"]\n[[rules]]\nrelax_must_exist = true",
				"/work/.hostrun.toml",
			),
		];
		let merged = merge_configs(&configs).unwrap();

		assert_eq!(merged.protected_processes, vec!["a", "b"]);
		assert_eq!(merged.rules.len(), 2);
		assert_eq!(
			merged.rules[0].source,
			PathBuf::from("/work/project/.hostrun.toml")
		);
		assert_eq!(merged.rules[1].source, PathBuf::from("/work/.hostrun.toml"));
	}

	#[test]
	fn test_user_config_path() {
		let path = user_config_path().unwrap();
		assert!(path.ends_with(".hostrun.toml"));
	}
}

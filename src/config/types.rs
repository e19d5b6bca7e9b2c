use crate::error::{HostrunError, Result};
use crate::host::HostKind;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration from a `.hostrun.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
	/// If true, stop directory cascade and jump directly to ~/.hostrun.toml.
	#[serde(default)]
	pub root: bool,

	/// Environment variable name that, if truthy, skips ~/.hostrun.toml lookup.
	/// Useful for CI environments.
	#[serde(default)]
	pub root_config_lookup_disable_env_var: Option<String>,

	/// Host kind override (e.g. "linux"). Takes the place of the compile-time
	/// host when set.
	#[serde(default)]
	pub host: Option<String>,

	/// Installation root. Relative paths resolve against the config file's directory.
	#[serde(default)]
	pub local_root: Option<PathBuf>,

	/// Extra process names cleanup must never terminate.
	#[serde(default)]
	pub protected_processes: Vec<String>,

	/// Configured rewrite rules, applied after the built-in host rules.
	/// First matching rule wins.
	#[serde(default)]
	pub rules: Vec<Rule>,
}

/// A configured rewrite rule.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Rule {
	/// Host kind this rule is limited to. Applies to every host when unset.
	pub host: Option<String>,

	/// Regex pattern to match the executable.
	pub executable_pattern: Option<String>,

	/// Regex pattern to match the raw argument string.
	pub arguments_pattern: Option<String>,

	/// Regex substitution for the executable.
	/// Format: "s/pattern/replacement/" or "s/pattern/replacement/g" for global.
	pub executable_rewrite: Option<String>,

	/// Regex substitution for the argument string.
	pub arg_rewrite: Option<String>,

	/// Clear the "app must exist" run option when the rule fires.
	#[serde(default)]
	pub relax_must_exist: bool,
}

/// A loaded configuration with its source path for debugging/display.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	/// The parsed configuration.
	pub config: Config,

	/// The path this config was loaded from.
	pub path: PathBuf,
}

/// Merged configuration from multiple config files in the cascade.
#[derive(Debug, Clone, Default)]
pub struct MergedConfig {
	/// Host override from the most specific config that sets one.
	pub host: Option<HostKind>,

	/// Installation root from the most specific config that sets one,
	/// already resolved to an absolute path.
	pub local_root: Option<PathBuf>,

	/// Extra protected process names from every config, in cascade order.
	pub protected_processes: Vec<String>,

	/// All rules from all configs, in cascade order (first match wins).
	pub rules: Vec<RuleWithSource>,
}

/// A rule with its source config path for debugging/display.
#[derive(Debug, Clone)]
pub struct RuleWithSource {
	/// The rule itself.
	pub rule: Rule,

	/// The config file this rule came from.
	pub source: PathBuf,
}

impl Rule {
	/// Whether the rule changes anything when it fires.
	pub fn has_action(&self) -> bool {
		self.executable_rewrite.is_some() || self.arg_rewrite.is_some() || self.relax_must_exist
	}
}

impl Config {
	/// Validate host names and rules in this config.
	///
	/// Regex and substitution syntax is checked when the rules are compiled.
	pub fn validate(&self, path: &Path) -> Result<()> {
		if let Some(ref host) = self.host {
			host.parse::<HostKind>()?;
		}
		for (index, rule) in self.rules.iter().enumerate() {
			if let Some(ref host) = rule.host {
				host.parse::<HostKind>()?;
			}
			if !rule.has_action() {
				return Err(HostrunError::RuleWithoutAction {
					path: path.to_path_buf(),
					index: index + 1,
				});
			}
		}
		Ok(())
	}

	/// Parsed host override, if any.
	pub fn host_kind(&self) -> Result<Option<HostKind>> {
		self.host.as_deref().map(str::parse::<HostKind>).transpose()
	}
}

//! Configuration loading and parsing for hostrun.
//!
//! This module handles:
//! - TOML config file parsing
//! - Directory cascade discovery
//! - Config merging
//! - Resolving the user folders host descriptors are built from

pub mod cascade;
pub mod parser;
pub mod template;
pub mod types;

pub use cascade::{
	CONFIG_FILE_NAME, detect_user_folders, discover_configs, load_merged_config, merge_configs,
	user_config_path,
};
pub use parser::{parse_config_file, parse_config_str};
pub use template::init_template;
pub use types::{Config, LoadedConfig, MergedConfig, Rule, RuleWithSource};

use crate::config::types::{MergedConfig, RuleWithSource};
use crate::error::{HostrunError, Result};
use crate::host::HostKind;
use crate::invocation::{Invocation, RunOptions};
use crate::rules::substitution::Substitution;
use regex::Regex;
use std::path::PathBuf;

/// A configured rule compiled and ready for matching.
#[derive(Debug, Clone)]
pub struct CompiledRule {
	/// Host this rule is limited to, if any.
	pub host: Option<HostKind>,

	/// Compiled executable pattern regex.
	pub executable_regex: Option<Regex>,

	/// Compiled argument-string pattern regex.
	pub arguments_regex: Option<Regex>,

	/// Substitution applied to the executable.
	pub executable_rewrite: Option<Substitution>,

	/// Substitution applied to the argument string.
	pub arg_rewrite: Option<Substitution>,

	/// Clear `APP_MUST_EXIST` when the rule fires.
	pub relax_must_exist: bool,

	/// Source config path (for debugging).
	pub source: PathBuf,
}

impl CompiledRule {
	/// Compile a rule from a RuleWithSource.
	pub fn from_rule_with_source(rws: &RuleWithSource) -> Result<Self> {
		let rule = &rws.rule;

		let host = rule
			.host
			.as_deref()
			.map(str::parse::<HostKind>)
			.transpose()?;
		let executable_regex = rule
			.executable_pattern
			.as_deref()
			.map(compile_regex)
			.transpose()?;
		let arguments_regex = rule
			.arguments_pattern
			.as_deref()
			.map(compile_regex)
			.transpose()?;
		let executable_rewrite = rule
			.executable_rewrite
			.as_deref()
			.map(Substitution::parse)
			.transpose()?;
		let arg_rewrite = rule
			.arg_rewrite
			.as_deref()
			.map(Substitution::parse)
			.transpose()?;

		Ok(CompiledRule {
			host,
			executable_regex,
			arguments_regex,
			executable_rewrite,
			arg_rewrite,
			relax_must_exist: rule.relax_must_exist,
			source: rws.source.clone(),
		})
	}

	/// Whether this rule is active on `kind`.
	pub fn applies_to(&self, kind: HostKind) -> bool {
		self.host.is_none_or(|host| host == kind)
	}

	/// Check if this rule matches the given invocation.
	pub fn matches(&self, invocation: &Invocation) -> bool {
		if let Some(ref regex) = self.executable_regex
			&& !regex.is_match(&invocation.executable)
		{
			return false;
		}

		if let Some(ref regex) = self.arguments_regex
			&& !regex.is_match(&invocation.arguments)
		{
			return false;
		}

		true
	}

	/// Apply this rule's actions.
	pub fn apply(&self, mut invocation: Invocation) -> Invocation {
		if let Some(ref sub) = self.executable_rewrite {
			invocation.executable = sub.apply(&invocation.executable);
		}
		if let Some(ref sub) = self.arg_rewrite {
			invocation.arguments = sub.apply(&invocation.arguments);
		}
		if self.relax_must_exist {
			invocation.options.remove(RunOptions::APP_MUST_EXIST);
		}
		invocation
	}
}

/// Compile a regex pattern string.
fn compile_regex(pattern: &str) -> Result<Regex> {
	Regex::new(pattern).map_err(|source| HostrunError::InvalidRegex {
		pattern: pattern.to_string(),
		source,
	})
}

/// Compile all rules in a merged config.
pub fn compile_rules(config: &MergedConfig) -> Result<Vec<CompiledRule>> {
	config
		.rules
		.iter()
		.map(CompiledRule::from_rule_with_source)
		.collect()
}

/// Find the first matching rule for a given invocation.
pub fn find_matching_rule<'a>(
	rules: &'a [CompiledRule],
	invocation: &Invocation,
) -> Option<&'a CompiledRule> {
	rules.iter().find(|rule| rule.matches(invocation))
}

use crate::invocation::Invocation;
use crate::rules::host_rules::{RewriteProfile, RewriteRule};
use crate::rules::matcher::{CompiledRule, find_matching_rule};
use log::debug;

/// Result of a traced rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
	/// The invocation to launch.
	pub invocation: Invocation,

	/// Names of the rules that fired, in evaluation order. Configured rules
	/// are reported as `configured:<source path>`.
	pub applied: Vec<String>,
}

/// Rewrites invocations into ones valid for a single host.
///
/// Holds no mutable state; `rewrite` can be called from any thread.
#[derive(Debug, Clone)]
pub struct CommandRewriter {
	profile: &'static RewriteProfile,
	configured: Vec<CompiledRule>,
}

impl CommandRewriter {
	pub fn new(profile: &'static RewriteProfile) -> Self {
		Self {
			profile,
			configured: Vec::new(),
		}
	}

	/// Configured rules evaluated after the built-in ones. First match wins.
	pub fn with_rules(mut self, rules: Vec<CompiledRule>) -> Self {
		self.configured = rules;
		self
	}

	pub fn profile(&self) -> &RewriteProfile {
		self.profile
	}

	pub fn configured_rules(&self) -> &[CompiledRule] {
		&self.configured
	}

	/// Rewrite `invocation`. Unmatched invocations pass through unchanged.
	pub fn rewrite(&self, invocation: Invocation) -> Invocation {
		self.rewrite_traced(invocation).invocation
	}

	/// Rewrite `invocation`, recording every rule that fired.
	pub fn rewrite_traced(&self, invocation: Invocation) -> RewriteOutcome {
		let mut current = invocation;
		let mut applied = Vec::new();

		for rule in RewriteRule::ORDERED {
			if rule.matches(&current, self.profile) {
				current = rule.apply(current, self.profile);
				debug!("Rule {} fired: {current}", rule.name());
				applied.push(rule.name().to_string());
			}
		}

		if let Some(rule) = find_matching_rule(&self.configured, &current) {
			current = rule.apply(current);
			debug!(
				"Configured rule from {} fired: {current}",
				rule.source.display()
			);
			applied.push(format!("configured:{}", rule.source.display()));
		}

		RewriteOutcome {
			invocation: current,
			applied,
		}
	}
}

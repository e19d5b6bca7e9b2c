use crate::error::{HostrunError, Result};
use crate::host::descriptor::{HostDescriptor, UserFolders};
use crate::host::kind::HostKind;
use crate::invocation::Invocation;
use crate::rules::{CommandRewriter, CompiledRule, RewriteOutcome};
use log::debug;
use std::sync::Arc;

/// Descriptors available for activation, keyed by host kind.
#[derive(Debug, Clone, Default)]
pub struct HostRegistry {
	descriptors: Vec<HostDescriptor>,
}

impl HostRegistry {
	/// An empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// A registry holding the built-in descriptor for every supported host.
	pub fn builtin(folders: &UserFolders) -> Self {
		let mut registry = Self::new();
		for kind in HostKind::ALL {
			registry.register(HostDescriptor::builtin(kind, folders));
		}
		registry
	}

	/// Add `descriptor`, replacing any descriptor already registered for its kind.
	pub fn register(&mut self, descriptor: HostDescriptor) {
		self.descriptors.retain(|d| d.kind() != descriptor.kind());
		self.descriptors.push(descriptor);
	}

	pub fn get(&self, kind: HostKind) -> Option<&HostDescriptor> {
		self.descriptors.iter().find(|d| d.kind() == kind)
	}

	/// Kinds with a registered descriptor, in registration order.
	pub fn kinds(&self) -> impl Iterator<Item = HostKind> + '_ {
		self.descriptors.iter().map(HostDescriptor::kind)
	}

	/// Select the host platform for this run.
	pub fn activate(self, kind: HostKind) -> Result<HostPlatform> {
		self.activate_with_rules(kind, Vec::new())
	}

	/// Select the host platform for this run, with configured rules applied
	/// after the built-in ones. Rules scoped to another host are dropped.
	pub fn activate_with_rules(
		mut self,
		kind: HostKind,
		rules: Vec<CompiledRule>,
	) -> Result<HostPlatform> {
		let index = self
			.descriptors
			.iter()
			.position(|d| d.kind() == kind)
			.ok_or(HostrunError::UnsupportedHost { kind })?;
		let descriptor = self.descriptors.swap_remove(index);

		let rules: Vec<_> = rules
			.into_iter()
			.filter(|rule| rule.applies_to(kind))
			.collect();
		debug!(
			"Activating host platform {kind} with {} configured rule(s)",
			rules.len()
		);

		let rewriter = CommandRewriter::new(descriptor.rewrite_profile()).with_rules(rules);
		Ok(HostPlatform {
			inner: Arc::new(PlatformInner {
				descriptor,
				rewriter,
			}),
		})
	}
}

#[derive(Debug)]
struct PlatformInner {
	descriptor: HostDescriptor,
	rewriter: CommandRewriter,
}

/// The active host: one descriptor plus its command rewriter.
///
/// Cloning is cheap and every clone refers to the same descriptor.
#[derive(Debug, Clone)]
pub struct HostPlatform {
	inner: Arc<PlatformInner>,
}

impl HostPlatform {
	pub fn kind(&self) -> HostKind {
		self.inner.descriptor.kind()
	}

	pub fn descriptor(&self) -> &HostDescriptor {
		&self.inner.descriptor
	}

	pub fn rewriter(&self) -> &CommandRewriter {
		&self.inner.rewriter
	}

	/// Rewrite `invocation` into one valid on this host.
	pub fn rewrite(&self, invocation: Invocation) -> Invocation {
		self.inner.rewriter.rewrite(invocation)
	}

	/// Like [`HostPlatform::rewrite`], also reporting which rules fired.
	pub fn rewrite_traced(&self, invocation: Invocation) -> RewriteOutcome {
		self.inner.rewriter.rewrite_traced(invocation)
	}

	/// Whether `other` is a handle to the same activated platform.
	pub fn same_platform(&self, other: &HostPlatform) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::invocation::RunOptions;

	fn folders() -> UserFolders {
		UserFolders::from_home("/home/builder")
	}

	#[test]
	fn test_builtin_registers_all_hosts() {
		let registry = HostRegistry::builtin(&folders());
		let kinds: Vec<_> = registry.kinds().collect();
		assert_eq!(kinds, HostKind::ALL.to_vec());
	}

	#[test]
	fn test_activate_unregistered_host_fails() {
		let mut registry = HostRegistry::new();
		registry.register(HostDescriptor::builtin(HostKind::Linux, &folders()));

		match registry.activate(HostKind::Windows).unwrap_err() {
			HostrunError::UnsupportedHost { kind } => assert_eq!(kind, HostKind::Windows),
			other => panic!("Expected UnsupportedHost error, got {other:?}"),
		}
	}

	#[test]
	fn test_register_replaces_same_kind() {
		let mut registry = HostRegistry::builtin(&folders());
		registry.register(
			HostDescriptor::builtin(HostKind::Linux, &folders()).with_protected_processes(["ci-agent"]),
		);
		assert_eq!(registry.kinds().count(), 3);
		assert!(
			registry
				.get(HostKind::Linux)
				.unwrap()
				.is_protected_process("ci-agent")
		);
	}

	#[test]
	fn test_descriptor_is_referentially_stable() {
		let platform = HostRegistry::builtin(&folders())
			.activate(HostKind::Linux)
			.unwrap();
		let first = platform.descriptor() as *const HostDescriptor;
		let second = platform.descriptor() as *const HostDescriptor;
		assert_eq!(first, second);

		let clone = platform.clone();
		assert!(std::ptr::eq(platform.descriptor(), clone.descriptor()));
		assert!(platform.same_platform(&clone));
	}

	#[test]
	fn test_separate_activations_are_distinct() {
		let a = HostRegistry::builtin(&folders())
			.activate(HostKind::Linux)
			.unwrap();
		let b = HostRegistry::builtin(&folders())
			.activate(HostKind::Linux)
			.unwrap();
		assert!(!a.same_platform(&b));
	}

	#[test]
	fn test_platform_is_shareable_across_threads() {
		let platform = HostRegistry::builtin(&folders())
			.activate(HostKind::Linux)
			.unwrap();

		let handles: Vec<_> = (0..4)
			.map(|_| {
				let platform = platform.clone();
				std::thread::spawn(move || {
					platform.rewrite(Invocation::new("sh", "build.sh", RunOptions::DEFAULT))
				})
			})
			.collect();

		for handle in handles {
			let out = handle.join().unwrap();
			assert_eq!(out.options, RunOptions::ALLOW_SPEW);
		}
	}
}

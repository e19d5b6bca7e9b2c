use crate::host::builtin::{LogRoot, table};
use crate::host::kind::HostKind;
use crate::rules::RewriteProfile;
use std::path::{Path, PathBuf};

/// User folders the caller resolved for the current user.
///
/// Descriptors compose their absolute log folder from these; resolving them
/// is the caller's job (see `config::detect_user_folders`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFolders {
	/// The user's home ("personal") folder.
	pub home: PathBuf,

	/// The user's documents folder.
	pub documents: PathBuf,
}

impl UserFolders {
	pub fn new(home: impl Into<PathBuf>, documents: impl Into<PathBuf>) -> Self {
		Self {
			home: home.into(),
			documents: documents.into(),
		}
	}

	/// Use `home` for both folders.
	pub fn from_home(home: impl Into<PathBuf>) -> Self {
		let home = home.into();
		Self {
			documents: home.clone(),
			home,
		}
	}
}

/// Whether the host lets the launch boundary install an interrupt handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlHandlerSupport {
	Native,
	/// Registration requests are accepted and ignored.
	Unsupported,
}

/// Immutable bundle of host-specific facts.
#[derive(Debug, Clone)]
pub struct HostDescriptor {
	kind: HostKind,
	binaries_folder: &'static str,
	debug_symbol_extension: &'static str,
	local_build_log_folder: PathBuf,
	version_control_client_path: PathBuf,
	build_tool_project: &'static str,
	build_driver_executable: &'static str,
	ide_executable: Option<&'static str>,
	protected_process_names: Vec<String>,
	editor_host_kind: HostKind,
	ctrl_handler: CtrlHandlerSupport,
	interpreter_environment: &'static [(&'static str, &'static str)],
	rewrite_profile: &'static RewriteProfile,
}

impl HostDescriptor {
	/// Construct the built-in descriptor for `kind`.
	pub fn builtin(kind: HostKind, folders: &UserFolders) -> Self {
		let t = table(kind);
		let log_root = match t.log_root {
			LogRoot::Home => &folders.home,
			LogRoot::Documents => &folders.documents,
		};

		Self {
			kind: t.kind,
			binaries_folder: t.binaries_folder,
			debug_symbol_extension: t.debug_symbol_extension,
			local_build_log_folder: log_root.join(t.log_folder),
			version_control_client_path: PathBuf::from(t.version_control_client),
			build_tool_project: t.build_tool_project,
			build_driver_executable: t.build_driver_executable,
			ide_executable: t.ide_executable,
			protected_process_names: t
				.protected_process_names
				.iter()
				.map(|name| name.to_string())
				.collect(),
			editor_host_kind: t.editor_host_kind,
			ctrl_handler: t.ctrl_handler,
			interpreter_environment: t.interpreter_environment,
			rewrite_profile: &t.rewrite_profile,
		}
	}

	/// Append extra protected process names. Names already present
	/// (ignoring ASCII case) are skipped.
	pub fn with_protected_processes<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		for name in names {
			let name = name.into();
			if !self.is_protected_process(&name) {
				self.protected_process_names.push(name);
			}
		}
		self
	}

	pub fn kind(&self) -> HostKind {
		self.kind
	}

	/// Folder, relative to the installation root, holding host-native binaries.
	pub fn binaries_folder(&self) -> &str {
		self.binaries_folder
	}

	/// Absolute path of the build-tool executable `name` under `local_root`.
	pub fn build_tool_executable_path(&self, local_root: &Path, name: &str) -> PathBuf {
		local_root.join(self.binaries_folder).join(name)
	}

	pub fn local_build_log_folder(&self) -> &Path {
		&self.local_build_log_folder
	}

	pub fn version_control_client_path(&self) -> &Path {
		&self.version_control_client_path
	}

	pub fn debug_symbol_extension(&self) -> &str {
		self.debug_symbol_extension
	}

	pub fn build_tool_project(&self) -> &str {
		self.build_tool_project
	}

	pub fn build_driver_executable(&self) -> &str {
		self.build_driver_executable
	}

	/// IDE command-line executable, if the host has one.
	pub fn ide_executable(&self) -> Option<&str> {
		self.ide_executable
	}

	pub fn protected_process_names(&self) -> &[String] {
		&self.protected_process_names
	}

	pub fn editor_host_kind(&self) -> HostKind {
		self.editor_host_kind
	}

	pub fn ctrl_handler(&self) -> CtrlHandlerSupport {
		self.ctrl_handler
	}

	pub fn rewrite_profile(&self) -> &'static RewriteProfile {
		self.rewrite_profile
	}

	/// Whether cleanup must never terminate a process named `name`.
	pub fn is_protected_process(&self, name: &str) -> bool {
		self.protected_process_names
			.iter()
			.any(|protected| protected.eq_ignore_ascii_case(name))
	}

	/// Filter `candidates` down to the names cleanup may terminate.
	/// Order is preserved.
	pub fn processes_eligible_for_termination<'a, I>(&self, candidates: I) -> Vec<&'a str>
	where
		I: IntoIterator<Item = &'a str>,
	{
		candidates
			.into_iter()
			.filter(|name| !self.is_protected_process(name))
			.collect()
	}

	/// Environment variables the launch boundary must set when starting
	/// `executable` on this host.
	pub fn launch_environment(&self, executable: &str) -> Vec<(String, String)> {
		match self.rewrite_profile.interpreter {
			Some(interpreter) if interpreter == executable => self
				.interpreter_environment
				.iter()
				.map(|(key, value)| (key.to_string(), value.to_string()))
				.collect(),
			_ => Vec::new(),
		}
	}
}

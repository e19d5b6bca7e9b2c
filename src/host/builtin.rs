//! Per-host fact tables for the built-in hosts.

use crate::host::descriptor::CtrlHandlerSupport;
use crate::host::kind::HostKind;
use crate::rules::{DriverFlags, RewriteProfile};

/// Which user folder a host writes its local build logs under.
#[derive(Debug, Clone, Copy)]
pub(crate) enum LogRoot {
	Home,
	Documents,
}

#[derive(Debug)]
pub(crate) struct HostTable {
	pub kind: HostKind,
	pub binaries_folder: &'static str,
	pub debug_symbol_extension: &'static str,
	pub log_root: LogRoot,
	pub log_folder: &'static str,
	pub version_control_client: &'static str,
	pub build_tool_project: &'static str,
	pub build_driver_executable: &'static str,
	pub ide_executable: Option<&'static str>,
	pub protected_process_names: &'static [&'static str],
	pub editor_host_kind: HostKind,
	pub ctrl_handler: CtrlHandlerSupport,
	pub interpreter_environment: &'static [(&'static str, &'static str)],
	pub rewrite_profile: RewriteProfile,
}

/// xbuild flags needed off Windows. Some automation projects pin
/// ToolsVersion 11.0 and TargetFrameworkProfile=Client, neither of which
/// exists for xbuild.
const XBUILD_FLAGS: DriverFlags = DriverFlags {
	executable: "xbuild",
	flags: &[
		"/verbosity:quiet",
		"/nologo",
		"/tv:4.0",
		"/p:TargetFrameworkProfile=",
	],
};

const MONO_ENVIRONMENT: &[(&str, &str)] = &[("MONO_IOMAP", "case")];

static WINDOWS: HostTable = HostTable {
	kind: HostKind::Windows,
	binaries_folder: "Engine/Binaries/Win64/",
	debug_symbol_extension: ".pdb",
	log_root: LogRoot::Documents,
	log_folder: "Unreal Engine/LocalBuildLogs",
	version_control_client: r"C:\Program Files\Perforce\p4.exe",
	build_tool_project: "UnrealBuildTool",
	build_driver_executable: "MSBuild.exe",
	ide_executable: Some("devenv.com"),
	protected_process_names: &[
		"System", "smss", "csrss", "wininit", "winlogon", "services", "lsass", "svchost",
		"dwm", "explorer", "conhost",
	],
	editor_host_kind: HostKind::Windows,
	ctrl_handler: CtrlHandlerSupport::Native,
	interpreter_environment: &[],
	rewrite_profile: RewriteProfile {
		relaxed_executables: &[],
		build_driver: None,
		native_binaries_marker: "/Binaries/Win64/",
		foreign_binaries_markers: &[],
		stripped_suffixes: &[],
		executable_suffix: ".exe",
		interpreter: None,
	},
};

static MACOS: HostTable = HostTable {
	kind: HostKind::MacOS,
	binaries_folder: "Engine/Binaries/Mac/",
	debug_symbol_extension: ".exe.mdb",
	log_root: LogRoot::Home,
	log_folder: "Library/Logs/Unreal Engine/LocalBuildLogs",
	version_control_client: "/usr/bin/p4",
	build_tool_project: "UnrealBuildTool_Mono",
	build_driver_executable: "xbuild",
	ide_executable: None,
	protected_process_names: &[
		"launchd",
		"kernel_task",
		"WindowServer",
		"loginwindow",
		"Finder",
		"Dock",
		"SystemUIServer",
	],
	editor_host_kind: HostKind::MacOS,
	ctrl_handler: CtrlHandlerSupport::Unsupported,
	interpreter_environment: MONO_ENVIRONMENT,
	rewrite_profile: RewriteProfile {
		relaxed_executables: &["sh", "xbuild", "codesign"],
		build_driver: Some(XBUILD_FLAGS),
		native_binaries_marker: "/Binaries/Mac/",
		foreign_binaries_markers: &["/Binaries/Win64/"],
		stripped_suffixes: &["-cmd.exe", "-Cmd.exe", ".exe"],
		executable_suffix: ".exe",
		interpreter: Some("mono"),
	},
};

static LINUX: HostTable = HostTable {
	kind: HostKind::Linux,
	binaries_folder: "Engine/Binaries/Linux/",
	debug_symbol_extension: ".exe.mdb",
	log_root: LogRoot::Home,
	log_folder: "Library/Logs/Unreal Engine/LocalBuildLogs",
	version_control_client: "/usr/bin/p4",
	build_tool_project: "UnrealBuildTool_Mono",
	build_driver_executable: "xbuild",
	ide_executable: None,
	protected_process_names: &["init", "systemd", "sshd", "dbus-daemon"],
	editor_host_kind: HostKind::Linux,
	ctrl_handler: CtrlHandlerSupport::Unsupported,
	interpreter_environment: MONO_ENVIRONMENT,
	rewrite_profile: RewriteProfile {
		relaxed_executables: &["sh", "xbuild", "codesign"],
		build_driver: Some(XBUILD_FLAGS),
		native_binaries_marker: "/Binaries/Linux/",
		foreign_binaries_markers: &["/Binaries/Win64/"],
		stripped_suffixes: &["-cmd.exe", "-Cmd.exe", ".exe"],
		executable_suffix: ".exe",
		interpreter: Some("mono"),
	},
};

/// Fact table for `kind`. Adding a `HostKind` variant fails to compile
/// until a table exists for it.
pub(crate) fn table(kind: HostKind) -> &'static HostTable {
	match kind {
		HostKind::Windows => &WINDOWS,
		HostKind::MacOS => &MACOS,
		HostKind::Linux => &LINUX,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_table_kind_matches_lookup() {
		for kind in HostKind::ALL {
			assert_eq!(table(kind).kind, kind);
		}
	}

	#[test]
	fn test_native_marker_is_inside_binaries_folder() {
		for kind in HostKind::ALL {
			let t = table(kind);
			let folder = format!("/{}", t.binaries_folder);
			assert!(folder.ends_with(t.rewrite_profile.native_binaries_marker));
		}
	}

	#[test]
	fn test_foreign_markers_never_include_native() {
		for kind in HostKind::ALL {
			let profile = &table(kind).rewrite_profile;
			assert!(
				!profile
					.foreign_binaries_markers
					.contains(&profile.native_binaries_marker)
			);
		}
	}
}
